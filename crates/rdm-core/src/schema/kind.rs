use serde::{Deserialize, Serialize};

/// Closed set of element kinds known to the dictionary
///
/// Abstract kinds (`DesignElement`, `ReportItem`, `Listing`, ...) exist only
/// so that slot content-type sets and definition inheritance can name a whole
/// family; elements can only be created for concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    // Abstract families
    DesignElement,
    ReportItem,
    Listing,
    Group,
    MasterPage,
    DataSource,
    DataSet,
    Parameter,

    // Module roots
    ReportDesign,
    Library,

    // Styling
    Style,
    Theme,

    // Pages
    SimpleMasterPage,

    // Data
    OdaDataSource,
    ScriptDataSource,
    OdaDataSet,
    ScriptDataSet,
    ScalarParameter,
    TabularCube,
    TabularDimension,
    TabularHierarchy,

    // Report items and their parts
    Table,
    List,
    TableGroup,
    ListGroup,
    Grid,
    Row,
    Column,
    Cell,
    Label,
    Text,
    Data,
    Image,
}

impl ElementKind {
    /// Name used in schema documents, scripts and log lines
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::DesignElement => "design-element",
            ElementKind::ReportItem => "report-item",
            ElementKind::Listing => "listing",
            ElementKind::Group => "group",
            ElementKind::MasterPage => "master-page",
            ElementKind::DataSource => "data-source",
            ElementKind::DataSet => "data-set",
            ElementKind::Parameter => "parameter",
            ElementKind::ReportDesign => "report-design",
            ElementKind::Library => "library",
            ElementKind::Style => "style",
            ElementKind::Theme => "theme",
            ElementKind::SimpleMasterPage => "simple-master-page",
            ElementKind::OdaDataSource => "oda-data-source",
            ElementKind::ScriptDataSource => "script-data-source",
            ElementKind::OdaDataSet => "oda-data-set",
            ElementKind::ScriptDataSet => "script-data-set",
            ElementKind::ScalarParameter => "scalar-parameter",
            ElementKind::TabularCube => "tabular-cube",
            ElementKind::TabularDimension => "tabular-dimension",
            ElementKind::TabularHierarchy => "tabular-hierarchy",
            ElementKind::Table => "table",
            ElementKind::List => "list",
            ElementKind::TableGroup => "table-group",
            ElementKind::ListGroup => "list-group",
            ElementKind::Grid => "grid",
            ElementKind::Row => "row",
            ElementKind::Column => "column",
            ElementKind::Cell => "cell",
            ElementKind::Label => "label",
            ElementKind::Text => "text",
            ElementKind::Data => "data",
            ElementKind::Image => "image",
        }
    }

    /// Prefix used when generating unique names
    pub fn name_prefix(self) -> &'static str {
        match self {
            ElementKind::Style => "NewStyle",
            ElementKind::Theme => "NewTheme",
            ElementKind::SimpleMasterPage => "NewSimpleMasterPage",
            ElementKind::OdaDataSource | ElementKind::ScriptDataSource => "Data Source",
            ElementKind::OdaDataSet | ElementKind::ScriptDataSet => "Data Set",
            ElementKind::ScalarParameter => "NewParameter",
            ElementKind::TabularCube => "Data Cube",
            ElementKind::TabularDimension => "Group",
            other => other.name(),
        }
    }

    /// Module root kinds
    pub fn is_module(self) -> bool {
        matches!(self, ElementKind::ReportDesign | ElementKind::Library)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name spaces a module maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameSpaceKind {
    Style,
    Theme,
    DataSource,
    DataSet,
    Parameter,
    MasterPage,
    Element,
    Cube,
    Dimension,
}

impl NameSpaceKind {
    pub const ALL: [NameSpaceKind; 9] = [
        NameSpaceKind::Style,
        NameSpaceKind::Theme,
        NameSpaceKind::DataSource,
        NameSpaceKind::DataSet,
        NameSpaceKind::Parameter,
        NameSpaceKind::MasterPage,
        NameSpaceKind::Element,
        NameSpaceKind::Cube,
        NameSpaceKind::Dimension,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NameSpaceKind::Style => "style",
            NameSpaceKind::Theme => "theme",
            NameSpaceKind::DataSource => "data-source",
            NameSpaceKind::DataSet => "data-set",
            NameSpaceKind::Parameter => "parameter",
            NameSpaceKind::MasterPage => "master-page",
            NameSpaceKind::Element => "element",
            NameSpaceKind::Cube => "cube",
            NameSpaceKind::Dimension => "dimension",
        }
    }
}

impl std::fmt::Display for NameSpaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_name_matches_serde() {
        let json = serde_json::to_string(&ElementKind::SimpleMasterPage).unwrap();
        assert_eq!(json, format!("\"{}\"", ElementKind::SimpleMasterPage.name()));
        let back: ElementKind = serde_json::from_str("\"oda-data-set\"").unwrap();
        assert_eq!(back, ElementKind::OdaDataSet);
    }

    #[test]
    fn test_module_kinds() {
        assert!(ElementKind::ReportDesign.is_module());
        assert!(ElementKind::Library.is_module());
        assert!(!ElementKind::Table.is_module());
    }
}
