//! Component catalog
//!
//! Closed set of components a user can add, the props each one takes, and
//! the inspector form fields used to fill those props in.

use crate::error::{AdaptError, Result};
use adapt_form::{Choice, FieldConfig, FieldMap, FormEngine, FormError, Submission};
use adapt_tree::UserSelected;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Name of the component select field in the inspector form
pub const COMPONENT_FIELD: &str = "component";

/// One addable component
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    /// Props copied from a submission into `userSelected.props`
    pub props: Vec<String>,
    /// Inspector fields for those props
    pub fields: FieldMap,
}

impl CatalogEntry {
    /// Entry with no props
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            fields: FieldMap::new(),
        }
    }

    /// Add a prop and its inspector field
    #[must_use]
    pub fn with_prop(mut self, name: impl Into<String>, field: FieldConfig) -> Self {
        let name = name.into();
        self.props.push(name.clone());
        self.fields.insert(name, field);
        self
    }
}

/// Component name to entry map
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentCatalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl ComponentCatalog {
    /// Catalog with no components
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The built-in `Box` and `Table` components
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_entry(
                CatalogEntry::new("Box").with_prop("sx", FieldConfig::json().with_label("Sx")),
            )
            .with_entry(
                CatalogEntry::new("Table").with_prop(
                    "backgroundColor",
                    FieldConfig::text()
                        .with_label("Background Color")
                        .required()
                        .with_initial_value("red"),
                ),
            )
    }

    /// Register an entry, replacing one with the same name
    #[must_use]
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.insert(entry.name.clone(), entry);
        self
    }

    /// Entry for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Component names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Prop fields of `name`; empty for unknown components
    #[must_use]
    pub fn default_fields_for(&self, name: &str) -> FieldMap {
        self.get(name).map(|entry| entry.fields.clone()).unwrap_or_default()
    }

    /// Inspector form fields with `selected` chosen
    ///
    /// A required `component` select over every catalog entry, followed by
    /// the selected component's prop fields.
    ///
    /// # Errors
    /// Returns [`AdaptError::UnknownComponent`] if `selected` is not
    /// registered.
    pub fn component_form_fields(&self, selected: &str) -> Result<FieldMap> {
        let entry = self
            .get(selected)
            .ok_or_else(|| AdaptError::UnknownComponent(selected.to_owned()))?;

        let choices = self.names().map(|name| Choice::labelled(name, name)).collect();
        let mut fields = FieldMap::new();
        fields.insert(
            COMPONENT_FIELD.to_owned(),
            FieldConfig::select(choices)
                .with_label("Component")
                .required()
                .with_initial_value(Choice::labelled(selected, selected).to_value()),
        );
        fields.extend(entry.fields.clone());
        Ok(fields)
    }

    /// Swap the prop fields of `form` when its selected component changed
    ///
    /// Returns whether the form was reset.
    ///
    /// # Errors
    /// Returns [`AdaptError::UnknownComponent`] if the selection is not
    /// registered.
    pub fn refresh_form(&self, form: &mut FormEngine) -> Result<bool> {
        let selected = form
            .value(COMPONENT_FIELD)
            .and_then(|value| value.get("value"))
            .and_then(Value::as_str)
            .ok_or_else(|| FormError::UnknownField(COMPONENT_FIELD.to_owned()))?
            .to_owned();
        let fields = self.component_form_fields(&selected)?;
        let reset = form.reset_if_changed(&fields);
        if reset {
            debug!(component = %selected, "inspector form switched component");
        }
        Ok(reset)
    }

    /// Selected component built from an inspector submission
    ///
    /// # Errors
    /// Returns [`AdaptError::UnknownComponent`] if the submitted component
    /// is missing or not registered.
    pub fn new_component(&self, submission: &Submission) -> Result<UserSelected> {
        let name = submission.str(COMPONENT_FIELD).unwrap_or_default();
        let entry = self
            .get(name)
            .ok_or_else(|| AdaptError::UnknownComponent(name.to_owned()))?;

        let props: Map<String, Value> = entry
            .props
            .iter()
            .map(|prop| (prop.clone(), submission.get(prop).cloned().unwrap_or(Value::Null)))
            .collect();
        Ok(UserSelected {
            component: entry.name.clone(),
            props,
        })
    }
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapt_form::{ChangeEvent, FieldType, FormOptions};
    use serde_json::json;

    #[test]
    fn standard_props() {
        let catalog = ComponentCatalog::standard();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Box", "Table"]);
        assert_eq!(catalog.get("Box").unwrap().props, vec!["sx"]);
        assert_eq!(catalog.get("Table").unwrap().props, vec!["backgroundColor"]);
    }

    #[test]
    fn default_fields() {
        let catalog = ComponentCatalog::standard();
        let box_fields = catalog.default_fields_for("Box");
        let sx = &box_fields["sx"];
        assert_eq!(sx.field_type, FieldType::JsonField);
        assert_eq!(sx.initial_value, json!([]));

        let table_fields = catalog.default_fields_for("Table");
        let bg = &table_fields["backgroundColor"];
        assert!(bg.required);
        assert_eq!(bg.initial_value, json!("red"));

        assert!(catalog.default_fields_for("Grid").is_empty());
    }

    #[test]
    fn form_fields_lead_with_component_select() {
        let fields = ComponentCatalog::standard().component_form_fields("Table").unwrap();
        let names: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["component", "backgroundColor"]);
        assert_eq!(fields["component"].initial_value, json!({"label": "Table", "value": "Table"}));
    }

    #[test]
    fn unknown_component_form() {
        let err = ComponentCatalog::standard().component_form_fields("Grid").unwrap_err();
        assert!(matches!(err, AdaptError::UnknownComponent(name) if name == "Grid"));
    }

    #[test]
    fn refresh_swaps_prop_fields() {
        let catalog = ComponentCatalog::standard();
        let fields = catalog.component_form_fields("Box").unwrap();
        let mut form = FormEngine::new(fields, FormOptions::new());
        assert!(!catalog.refresh_form(&mut form).unwrap());

        form.change(COMPONENT_FIELD, ChangeEvent::Choose("Table".into())).unwrap();
        assert!(catalog.refresh_form(&mut form).unwrap());
        assert_eq!(form.value("backgroundColor"), Some(&json!("red")));
        assert_eq!(form.value(COMPONENT_FIELD), Some(&json!({"label": "Table", "value": "Table"})));
        assert!(form.value("sx").is_none());
    }

    #[tokio::test]
    async fn new_component_copies_declared_props() {
        let catalog = ComponentCatalog::standard();
        let fields = catalog.component_form_fields("Table").unwrap();
        let mut form = FormEngine::new(fields, FormOptions::new());
        form.set_field_value("backgroundColor", "blue").unwrap();
        let submission = form.submit(|s, _| s).await.unwrap().unwrap();

        let selected = catalog.new_component(&submission).unwrap();
        assert_eq!(selected.component, "Table");
        assert_eq!(Value::Object(selected.props), json!({"backgroundColor": "blue"}));
    }
}
