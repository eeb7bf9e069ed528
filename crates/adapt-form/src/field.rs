//! Field configuration
//!
//! A form is described by an ordered map of field name to [`FieldConfig`].

use crate::schema::Rule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};

/// Ordered field name to config map
pub type FieldMap = IndexMap<String, FieldConfig>;

/// Declared input type of a field
///
/// Unrecognised type strings are kept in [`FieldType::Unknown`] rather than
/// rejected, so one bad field does not break the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Checkbox,
    Radio,
    Select,
    Textarea,
    JsonField,
    Unknown(String),
}

impl FieldType {
    /// Wire name of the type
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::JsonField => "jsonField",
            Self::Unknown(name) => name,
        }
    }

    /// Whether values of this type are a [`Choice`] (or a list of them)
    #[inline]
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Select)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => Self::Text,
            "number" => Self::Number,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "select" => Self::Select,
            "textarea" => Self::Textarea,
            "jsonField" => Self::JsonField,
            _ => Self::Unknown(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_owned()
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

impl Choice {
    /// Choice with a value and no label
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }

    /// Choice with a label
    #[must_use]
    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            value: value.into(),
        }
    }

    /// JSON object form, as stored in form values
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        if let Some(label) = &self.label {
            object.insert("label".into(), Value::String(label.clone()));
        }
        object.insert("value".into(), Value::String(self.value.clone()));
        Value::Object(object)
    }
}

/// Declarative description of one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub initial_value: Value,
    #[serde(default)]
    pub required: bool,
    /// Checkbox only: value is a list of choices
    #[serde(default)]
    pub multi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// Overrides the rule derived from the other settings
    #[serde(skip)]
    pub validation: Option<Rule>,
}

impl FieldConfig {
    /// Field of `field_type` with an empty-string initial value
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            label: None,
            initial_value: Value::String(String::new()),
            required: false,
            multi: false,
            choices: None,
            validation: None,
        }
    }

    /// Text input
    #[must_use]
    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    /// Checkbox
    #[must_use]
    pub fn checkbox() -> Self {
        Self::new(FieldType::Checkbox)
    }

    /// Select from `choices`
    #[must_use]
    pub fn select(choices: Vec<Choice>) -> Self {
        Self::new(FieldType::Select).with_choices(choices)
    }

    /// Property tree editor
    #[must_use]
    pub fn json() -> Self {
        Self::new(FieldType::JsonField).with_initial_value(Value::Array(Vec::new()))
    }

    /// Set label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set initial value
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = value.into();
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow several choices (checkbox only)
    #[must_use]
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Set choices
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Replace the derived validation rule
    #[must_use]
    pub fn with_validation(mut self, rule: Rule) -> Self {
        self.validation = Some(rule);
        self
    }

    /// Choices, or an empty slice
    #[inline]
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        self.choices.as_deref().unwrap_or_default()
    }

    /// Find a choice by value
    #[must_use]
    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices().iter().find(|choice| choice.value == value)
    }

    /// Fill in checkbox defaults
    ///
    /// A checkbox without choices gets the single choice `{value: "true"}`.
    /// A single checkbox's initial value becomes that choice when truthy and
    /// `""` otherwise.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.field_type != FieldType::Checkbox {
            return self;
        }
        if self.choices.as_ref().map_or(true, Vec::is_empty) {
            self.choices = Some(vec![Choice::new("true")]);
        }
        if self.multi {
            if !self.initial_value.is_array() {
                self.initial_value = Value::Array(Vec::new());
            }
        } else if is_truthy(&self.initial_value) {
            if !self.initial_value.is_object() {
                self.initial_value = Choice::new("true").to_value();
            }
        } else {
            self.initial_value = Value::String(String::new());
        }
        self
    }
}

/// JavaScript-style truthiness of a JSON value
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_is_preserved() {
        let field: FieldConfig = serde_json::from_value(json!({"type": "colour"})).unwrap();
        assert_eq!(field.field_type, FieldType::Unknown("colour".into()));
        assert_eq!(serde_json::to_value(&field.field_type).unwrap(), json!("colour"));
    }

    #[test]
    fn json_field_wire_name() {
        let field: FieldConfig = serde_json::from_value(json!({"type": "jsonField"})).unwrap();
        assert_eq!(field.field_type, FieldType::JsonField);
    }

    #[test]
    fn checkbox_without_choices_gets_true_choice() {
        let field = FieldConfig::checkbox().with_initial_value(true).normalized();
        assert_eq!(field.choices(), &[Choice::new("true")]);
        assert_eq!(field.initial_value, json!({"value": "true"}));
    }

    #[test]
    fn falsy_checkbox_starts_empty() {
        let field = FieldConfig::checkbox().with_initial_value(false).normalized();
        assert_eq!(field.initial_value, json!(""));
    }

    #[test]
    fn multi_checkbox_starts_with_list() {
        let field = FieldConfig::checkbox()
            .multi()
            .with_choices(vec![Choice::new("x"), Choice::new("y")])
            .normalized();
        assert_eq!(field.initial_value, json!([]));
        assert_eq!(field.choices().len(), 2);
    }

    #[test]
    fn normalize_leaves_other_types_alone() {
        let field = FieldConfig::text().with_initial_value(true);
        assert_eq!(field.clone().normalized(), field);
    }

    #[test]
    fn choice_value_omits_missing_label() {
        assert_eq!(Choice::new("a").to_value(), json!({"value": "a"}));
        assert_eq!(Choice::labelled("A", "a").to_value(), json!({"label": "A", "value": "a"}));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!([])));
    }
}
