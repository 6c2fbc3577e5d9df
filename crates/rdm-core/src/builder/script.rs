//! JSON design scripts
//!
//! A script describes a whole design as a tree:
//!
//! ```json
//! {
//!   "kind": "report-design",
//!   "styleSheets": ["corporate.css"],
//!   "contents": {
//!     "styles": [{ "kind": "style", "name": "title", "properties": { "color": "navy" } }],
//!     "pages": [{ "kind": "simple-master-page", "name": "default" }],
//!     "body": [{ "kind": "label", "properties": { "text": "Hello", "style": "title" } }]
//!   }
//! }
//! ```
//!
//! Property values are plain JSON; the property's type decides how a string
//! is read (text, expression, choice or a reference by name). Slots are
//! loaded in schema order, so styles and components exist before the body
//! refers to them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DesignBuilder;
use crate::config::DesignConfig;
use crate::errors::{DesignError, Result};
use crate::model::{ContentLocation, ElementId, PropertyValue, UserPropertyDefn};
use crate::module::Module;
use crate::schema::{ElementKind, PropertyKind, Schema};
use crate::validation::ValidatorRegistry;

/// Property value as written in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl ScriptValue {
    /// Read the value as a property of `kind`
    pub fn to_property_value(&self, kind: &PropertyKind) -> PropertyValue {
        match (self, kind) {
            (ScriptValue::Text(s), PropertyKind::ElementRef { .. }) => PropertyValue::element_name(s),
            (ScriptValue::Text(s), PropertyKind::Expression) => PropertyValue::expression(s),
            (ScriptValue::Text(s), _) => PropertyValue::string(s),
            (ScriptValue::Integer(n), _) => PropertyValue::Integer(*n),
            (ScriptValue::Boolean(b), _) => PropertyValue::Boolean(*b),
            (ScriptValue::List(items), _) => PropertyValue::List(items.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptElement {
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parent by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_properties: Vec<UserPropertyDefn>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ScriptValue>,
    /// Slot or content-property name → contents in order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contents: BTreeMap<String, Vec<ScriptElement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DesignScript {
    #[serde(default = "default_kind")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_sheets: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ScriptValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contents: BTreeMap<String, Vec<ScriptElement>>,
}

fn default_kind() -> ElementKind {
    ElementKind::ReportDesign
}

impl DesignScript {
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the script into a module built on the built-in dictionary
    ///
    /// # Errors
    ///
    /// The first structural or property error met while loading. Semantic
    /// problems do not fail the load; they are stored on the module.
    pub fn load(&self, config: DesignConfig) -> Result<Module> {
        let schema = Arc::new(Schema::report_design());
        let validators = Arc::new(ValidatorRegistry::builtin());
        self.load_with(schema, validators, config)
    }

    /// # Errors
    ///
    /// See [`DesignScript::load`].
    pub fn load_with(
        &self,
        schema: Arc<Schema>,
        validators: Arc<ValidatorRegistry>,
        config: DesignConfig,
    ) -> Result<Module> {
        let mut builder = DesignBuilder::new(Module::new(self.kind, schema, validators, config)?);
        for sheet in &self.style_sheets {
            builder.load_style_sheet(sheet.clone());
        }
        let root = builder.root();
        set_properties(&mut builder, root, &self.properties)?;
        add_contents(&mut builder, root, &self.contents)?;
        builder.finish()
    }
}

fn set_properties(
    builder: &mut DesignBuilder,
    element: ElementId,
    properties: &BTreeMap<String, ScriptValue>,
) -> Result<()> {
    for (name, value) in properties {
        let kind = builder.module().property_kind(element, name)?;
        builder.set_property(element, name, value.to_property_value(&kind))?;
    }
    Ok(())
}

fn add_contents(
    builder: &mut DesignBuilder,
    container: ElementId,
    contents: &BTreeMap<String, Vec<ScriptElement>>,
) -> Result<()> {
    let kind = builder.module().element(container)?.kind();
    let mut located: Vec<(ContentLocation, &Vec<ScriptElement>)> = Vec::new();
    for (slot, items) in contents {
        let location = builder
            .module()
            .schema()
            .location_by_name(kind, slot)
            .ok_or_else(|| DesignError::SlotNotFound {
                element: container,
                location: ContentLocation::property(slot.as_str()),
            })?;
        located.push((location, items));
    }
    located.sort_by(|a, b| a.0.cmp(&b.0));

    for (location, items) in located {
        for item in items {
            let id = build_element(builder, item)?;
            builder.add(container, id, location.clone())?;
        }
    }
    Ok(())
}

/// Build one detached subtree
fn build_element(builder: &mut DesignBuilder, item: &ScriptElement) -> Result<ElementId> {
    let id = builder.create(item.kind, item.name.as_deref())?;
    for defn in &item.user_properties {
        builder.add_user_property(id, defn.clone())?;
    }
    if let Some(parent) = &item.extends {
        builder.set_extends_name(id, parent)?;
    }
    set_properties(builder, id, &item.properties)?;
    add_contents(builder, id, &item.contents)?;
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::STYLE_PROP;
    use crate::validation::SemanticErrorKind;

    const SCRIPT: &str = r#"{
        "kind": "report-design",
        "contents": {
            "body": [
                { "kind": "label", "name": "greeting",
                  "properties": { "text": "Hello", "style": "title" } }
            ],
            "styles": [
                { "kind": "style", "name": "title", "properties": { "color": "navy" } }
            ],
            "pages": [{ "kind": "simple-master-page", "name": "default" }]
        }
    }"#;

    #[test]
    fn test_script_loads_in_schema_order() {
        let module = DesignScript::from_json_str(SCRIPT)
            .unwrap()
            .load(DesignConfig::default())
            .unwrap();
        let style = module.find_style("title").unwrap();
        let label = module
            .find(crate::schema::NameSpaceKind::Element, "greeting")
            .unwrap();
        assert_eq!(
            module.element(label).unwrap().local_property(STYLE_PROP),
            Some(&PropertyValue::element(style))
        );
        assert_eq!(
            module.property(label, "color").unwrap(),
            Some(PropertyValue::string("navy"))
        );
        assert!(module.all_errors().is_empty());
    }

    #[test]
    fn test_unknown_style_is_reported_not_fatal() {
        let json = r#"{
            "contents": {
                "pages": [{ "kind": "simple-master-page", "name": "default" }],
                "body": [{ "kind": "label", "properties": { "style": "missing" } }]
            }
        }"#;
        let module = DesignScript::from_json_str(json)
            .unwrap()
            .load(DesignConfig::default())
            .unwrap();
        let errors = module.all_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, SemanticErrorKind::UnresolvedReference);
        assert_eq!(errors[0].property.as_deref(), Some(STYLE_PROP));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = DesignScript::from_json_str(r#"{ "kind": "report-design", "colour": 1 }"#)
            .unwrap_err();
        assert!(matches!(err, DesignError::Serialization { .. }));
    }

    #[test]
    fn test_unknown_slot_fails_the_load() {
        let json = r#"{ "contents": { "sidebar": [{ "kind": "label" }] } }"#;
        let err = DesignScript::from_json_str(json)
            .unwrap()
            .load(DesignConfig::default())
            .unwrap_err();
        assert!(matches!(err, DesignError::SlotNotFound { .. }));
    }
}
