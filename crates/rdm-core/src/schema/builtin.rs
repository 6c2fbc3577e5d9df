//! Built-in report-design dictionary

use super::defn::{
    slots, Cardinality, ContextRule, ElementDefn, NameOption, PropertyDefn, PropertyKind,
    SemanticTrigger, SlotDefn,
};
use super::kind::{ElementKind as K, NameSpaceKind as Ns};
use super::Schema;
use crate::model::PropertyValue;
use crate::validation::names as v;

fn string(name: &str) -> PropertyDefn {
    PropertyDefn::new(name, PropertyKind::String)
}

fn expression(name: &str) -> PropertyDefn {
    PropertyDefn::new(name, PropertyKind::Expression)
}

fn integer(name: &str) -> PropertyDefn {
    PropertyDefn::new(name, PropertyKind::Integer)
}

fn choice(name: &str, choices: &[&str]) -> PropertyDefn {
    PropertyDefn::new(
        name,
        PropertyKind::Choice {
            choices: choices.iter().map(|c| c.to_string()).collect(),
        },
    )
}

fn element_ref(name: &str, target: K) -> PropertyDefn {
    PropertyDefn::new(name, PropertyKind::ElementRef { target })
}

fn content_list(name: &str, cardinality: Cardinality, types: &[K]) -> PropertyDefn {
    PropertyDefn::new(
        name,
        PropertyKind::ContentList {
            cardinality,
            content_types: types.to_vec(),
        },
    )
    .not_inheritable()
}

fn style_properties(defn: ElementDefn, as_style: bool) -> ElementDefn {
    let mark = |p: PropertyDefn| if as_style { p.style() } else { p };
    defn.property(mark(string("color")))
        .property(mark(string("backgroundColor")))
        .property(mark(string("fontSize")))
        .property(mark(choice("textAlign", &["left", "center", "right", "justify"])))
}

/// Element definitions of the report-design dictionary
pub fn report_design_defns() -> Vec<ElementDefn> {
    let base = vec![
        ElementDefn::new(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Optional, None)
            .extendable(false)
            .property(string("comments").not_inheritable())
            .trigger(SemanticTrigger::focus(v::ELEMENT_NAME))
            .trigger(SemanticTrigger::focus(v::ELEMENT_REFERENCE))
            .trigger(SemanticTrigger::focus(v::REQUIRED_PROPERTY)),
        style_properties(
            ElementDefn::new(K::ReportItem)
                .parent(K::DesignElement)
                .abstract_kind()
                .names(NameOption::Optional, Some(Ns::Element))
                .extendable(true)
                .property(element_ref("style", K::Style))
                .property(element_ref("dataSet", K::DataSet))
                .property(string("width"))
                .property(string("height")),
            true,
        ),
        ElementDefn::new(K::Listing)
            .parent(K::ReportItem)
            .abstract_kind()
            .property(integer("pageBreakInterval")),
        ElementDefn::new(K::Group)
            .parent(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Forbidden, None)
            .property(
                string("groupName").trigger(SemanticTrigger::container(v::GROUP_NAME)),
            )
            .property(expression("keyExpr"))
            .property(choice("interval", &["none", "prefix", "interval"])),
        ElementDefn::new(K::MasterPage)
            .parent(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Required, Some(Ns::MasterPage))
            .property(
                choice("type", &["us-letter", "us-legal", "a4", "a5", "custom"])
                    .with_default(PropertyValue::string("us-letter")),
            )
            .property(integer("width"))
            .property(integer("height"))
            .property(choice("orientation", &["auto", "portrait", "landscape"]))
            .trigger(SemanticTrigger::focus(v::MASTER_PAGE_SIZE)),
        ElementDefn::new(K::DataSource)
            .parent(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Required, Some(Ns::DataSource))
            .notify_on_attach(),
        ElementDefn::new(K::DataSet)
            .parent(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Required, Some(Ns::DataSet))
            .notify_on_attach()
            .property(element_ref("dataSource", K::DataSource).required()),
        ElementDefn::new(K::Parameter)
            .parent(K::DesignElement)
            .abstract_kind()
            .names(NameOption::Required, Some(Ns::Parameter))
            .property(string("promptText")),
    ];

    let modules = vec![
        ElementDefn::new(K::ReportDesign)
            .parent(K::DesignElement)
            .droppable(false)
            .slot(SlotDefn::multiple(slots::STYLES, "styles", &[K::Style]))
            .slot(SlotDefn::multiple(slots::COMPONENTS, "components", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::DATA_SOURCES, "dataSources", &[K::DataSource]))
            .slot(SlotDefn::multiple(slots::DATA_SETS, "dataSets", &[K::DataSet]))
            .slot(SlotDefn::multiple(slots::PARAMETERS, "parameters", &[K::Parameter]))
            .slot(
                SlotDefn::multiple(slots::PAGES, "pages", &[K::MasterPage])
                    .trigger(SemanticTrigger::focus(v::MASTER_PAGE_REQUIRED)),
            )
            .slot(SlotDefn::multiple(slots::BODY, "body", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::CUBES, "cubes", &[K::TabularCube]))
            .property(
                PropertyDefn::new("includedStyleSheets", PropertyKind::StringList)
                    .trigger(SemanticTrigger::focus(v::STYLE_SHEET)),
            )
            .property(string("author"))
            .trigger(SemanticTrigger::focus(v::MASTER_PAGE_REQUIRED)),
        ElementDefn::new(K::Library)
            .parent(K::DesignElement)
            .droppable(false)
            .slot(SlotDefn::multiple(slots::THEMES, "themes", &[K::Theme]))
            .slot(SlotDefn::multiple(slots::COMPONENTS, "components", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::DATA_SOURCES, "dataSources", &[K::DataSource]))
            .slot(SlotDefn::multiple(slots::DATA_SETS, "dataSets", &[K::DataSet]))
            .slot(SlotDefn::multiple(slots::PARAMETERS, "parameters", &[K::Parameter]))
            .slot(SlotDefn::multiple(slots::PAGES, "pages", &[K::MasterPage]))
            .slot(SlotDefn::multiple(slots::CUBES, "cubes", &[K::TabularCube]))
            .property(
                PropertyDefn::new("includedStyleSheets", PropertyKind::StringList)
                    .trigger(SemanticTrigger::focus(v::STYLE_SHEET)),
            )
            .property(element_ref("theme", K::Theme)),
    ];

    let styling = vec![
        style_properties(
            ElementDefn::new(K::Style)
                .parent(K::DesignElement)
                .names(NameOption::Required, Some(Ns::Style))
                .notify_on_attach(),
            false,
        ),
        ElementDefn::new(K::Theme)
            .parent(K::DesignElement)
            .names(NameOption::Required, Some(Ns::Theme))
            .notify_on_attach()
            .slot(SlotDefn::multiple(slots::STYLES, "styles", &[K::Style])),
        ElementDefn::new(K::SimpleMasterPage)
            .parent(K::MasterPage)
            .slot(SlotDefn::multiple(slots::PAGE_HEADER, "pageHeader", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::PAGE_FOOTER, "pageFooter", &[K::ReportItem])),
    ];

    let data = vec![
        ElementDefn::new(K::OdaDataSource)
            .parent(K::DataSource)
            .property(string("extensionId").required()),
        ElementDefn::new(K::ScriptDataSource)
            .parent(K::DataSource)
            .property(expression("open")),
        ElementDefn::new(K::OdaDataSet)
            .parent(K::DataSet)
            .property(string("queryText")),
        ElementDefn::new(K::ScriptDataSet)
            .parent(K::DataSet)
            .property(expression("fetch")),
        ElementDefn::new(K::ScalarParameter)
            .parent(K::Parameter)
            .property(
                choice("valueType", &["static", "dynamic"])
                    .with_default(PropertyValue::string("static")),
            )
            .property(
                choice("dataType", &["string", "integer", "boolean", "date"])
                    .with_default(PropertyValue::string("string")),
            )
            .property(string("dataSetName"))
            .property(expression("labelExpr"))
            .property(expression("valueExpr"))
            .companion("dataSetName", &["labelExpr", "valueExpr"]),
        ElementDefn::new(K::TabularCube)
            .parent(K::DesignElement)
            .names(NameOption::Required, Some(Ns::Cube))
            .property(element_ref("dataSet", K::DataSet))
            .property(content_list(
                "dimensions",
                Cardinality::Multiple,
                &[K::TabularDimension],
            )),
        ElementDefn::new(K::TabularDimension)
            .parent(K::DesignElement)
            .names(NameOption::Required, Some(Ns::Dimension))
            .property(content_list(
                "hierarchy",
                Cardinality::Single,
                &[K::TabularHierarchy],
            )),
        ElementDefn::new(K::TabularHierarchy).parent(K::DesignElement),
    ];

    let items = vec![
        ElementDefn::new(K::Table)
            .parent(K::Listing)
            .slot(SlotDefn::multiple(slots::HEADER, "header", &[K::Row]))
            .slot(SlotDefn::multiple(slots::DETAIL, "detail", &[K::Row]))
            .slot(SlotDefn::multiple(slots::FOOTER, "footer", &[K::Row]))
            .slot(
                SlotDefn::multiple(slots::GROUPS, "groups", &[K::TableGroup])
                    .trigger(SemanticTrigger::focus(v::GROUP_NAME)),
            )
            .slot(SlotDefn::multiple(slots::COLUMNS, "columns", &[K::Column])),
        ElementDefn::new(K::List)
            .parent(K::Listing)
            .slot(SlotDefn::multiple(slots::HEADER, "header", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::DETAIL, "detail", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::FOOTER, "footer", &[K::ReportItem]))
            .slot(
                SlotDefn::multiple(slots::GROUPS, "groups", &[K::ListGroup])
                    .trigger(SemanticTrigger::focus(v::GROUP_NAME)),
            ),
        ElementDefn::new(K::TableGroup)
            .parent(K::Group)
            .slot(SlotDefn::multiple(slots::GROUP_HEADER, "header", &[K::Row]))
            .slot(SlotDefn::multiple(slots::GROUP_FOOTER, "footer", &[K::Row])),
        ElementDefn::new(K::ListGroup)
            .parent(K::Group)
            .slot(SlotDefn::multiple(slots::GROUP_HEADER, "header", &[K::ReportItem]))
            .slot(SlotDefn::multiple(slots::GROUP_FOOTER, "footer", &[K::ReportItem])),
        ElementDefn::new(K::Grid)
            .parent(K::ReportItem)
            .slot(SlotDefn::multiple(slots::COLUMNS, "columns", &[K::Column]))
            .slot(SlotDefn::multiple(slots::ROWS, "rows", &[K::Row])),
        ElementDefn::new(K::Row)
            .parent(K::DesignElement)
            .property(string("height"))
            .slot(SlotDefn::multiple(slots::CELLS, "cells", &[K::Cell])),
        ElementDefn::new(K::Column)
            .parent(K::DesignElement)
            .property(string("width")),
        ElementDefn::new(K::Cell)
            .parent(K::DesignElement)
            .property(integer("colSpan").with_default(PropertyValue::Integer(1)))
            .slot(SlotDefn::multiple(slots::CONTENT, "content", &[K::ReportItem])),
        ElementDefn::new(K::Label)
            .parent(K::ReportItem)
            .property(string("text")),
        ElementDefn::new(K::Text)
            .parent(K::ReportItem)
            .property(string("content"))
            .property(choice("contentType", &["auto", "plain", "html"])),
        ElementDefn::new(K::Data)
            .parent(K::ReportItem)
            .property(string("resultSetColumn")),
        ElementDefn::new(K::Image)
            .parent(K::ReportItem)
            .property(expression("uri"))
            .property(choice("source", &["url", "embed", "file"])),
    ];

    base.into_iter()
        .chain(modules)
        .chain(styling)
        .chain(data)
        .chain(items)
        .collect()
}

/// Containment rules of the report-design dictionary
pub fn report_design_context_rules() -> Vec<ContextRule> {
    vec![ContextRule::ForbiddenUnder {
        content: K::Listing,
        ancestor: K::MasterPage,
    }]
}

impl Schema {
    /// The built-in report-design dictionary
    pub fn report_design() -> Self {
        Self {
            defns: report_design_defns()
                .into_iter()
                .map(|d| (d.kind, d))
                .collect(),
            context_rules: report_design_context_rules(),
        }
    }
}
