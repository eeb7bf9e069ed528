//! Field type to widget capability mapping
//!
//! A [`FieldBinding`] tells a widget renderer what shape a field's value has
//! and turns widget [`ChangeEvent`]s into new values. No widget is hardcoded.

use crate::field::{Choice, FieldConfig, FieldType};
use adapt_tree::PropertyTree;
use serde_json::Value;

/// Kind of a single-line input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
}

/// Capability set of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBinding {
    /// Scalar string, replaced on change
    Input { kind: InputKind },
    /// `""` or a choice, or a list of choices when `multi`
    Checkbox { multi: bool, choices: Vec<Choice> },
    /// A choice, replaced by value lookup
    Select { choices: Vec<Choice> },
    /// A choice, replaced by value lookup
    Radio { choices: Vec<Choice> },
    /// Scalar string
    Textarea,
    /// Property tree, replaced wholesale
    Json,
    /// Nothing interactive
    Unknown { type_name: String },
}

/// Change reported by a widget
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// New text of an input or textarea
    Text(String),
    /// Checkbox for `value` toggled to `checked`
    Toggle { value: String, checked: bool },
    /// Select or radio option chosen
    Choose(String),
    /// Edited property tree
    Tree(PropertyTree),
}

impl ChangeEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Toggle { .. } => "toggle",
            Self::Choose(_) => "choose",
            Self::Tree(_) => "tree",
        }
    }
}

/// Errors turning a change event into a value
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Event names a value that is not among the field's choices
    #[error("no choice with value {0:?}")]
    ChoiceNotFound(String),

    /// Event does not apply to this kind of field
    #[error("{event} event not supported by {binding} field")]
    UnsupportedEvent {
        binding: &'static str,
        event: &'static str,
    },

    /// Field type is not known, so it cannot change
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),

    /// Property tree could not be encoded
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl FieldBinding {
    /// Binding for a (normalized) field
    #[must_use]
    pub fn for_field(field: &FieldConfig) -> Self {
        let choices = field.choices().to_vec();
        match &field.field_type {
            FieldType::Text => Self::Input {
                kind: InputKind::Text,
            },
            FieldType::Number => Self::Input {
                kind: InputKind::Number,
            },
            FieldType::Checkbox => Self::Checkbox {
                multi: field.multi,
                choices,
            },
            FieldType::Select => Self::Select { choices },
            FieldType::Radio => Self::Radio { choices },
            FieldType::Textarea => Self::Textarea,
            FieldType::JsonField => Self::Json,
            FieldType::Unknown(name) => Self::Unknown {
                type_name: name.clone(),
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Checkbox { .. } => "checkbox",
            Self::Select { .. } => "select",
            Self::Radio { .. } => "radio",
            Self::Textarea => "textarea",
            Self::Json => "json",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Whether the widget accepts input at all
    #[inline]
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }

    /// Value after applying `event` to `current`
    ///
    /// # Errors
    /// Returns [`DispatchError::UnknownFieldType`] for unknown fields,
    /// [`DispatchError::ChoiceNotFound`] when the event names a value outside
    /// the choices, and [`DispatchError::UnsupportedEvent`] when the event
    /// does not fit the field.
    pub fn on_change(&self, current: &Value, event: ChangeEvent) -> Result<Value, DispatchError> {
        let unsupported = |event: &ChangeEvent| DispatchError::UnsupportedEvent {
            binding: self.name(),
            event: event.kind(),
        };

        match (self, event) {
            (Self::Unknown { type_name }, _) => {
                Err(DispatchError::UnknownFieldType(type_name.clone()))
            }
            (Self::Input { .. } | Self::Textarea, ChangeEvent::Text(text)) => {
                Ok(Value::String(text))
            }
            (Self::Checkbox { multi: false, choices }, ChangeEvent::Toggle { value, checked }) => {
                let choice = find(choices, &value)?;
                Ok(if checked {
                    choice.to_value()
                } else {
                    Value::String(String::new())
                })
            }
            (Self::Checkbox { multi: true, choices }, ChangeEvent::Toggle { value, .. }) => {
                let choice = find(choices, &value)?;
                let mut selected = current.as_array().cloned().unwrap_or_default();
                let before = selected.len();
                selected.retain(|item| choice_value(item) != Some(value.as_str()));
                if selected.len() == before {
                    selected.push(choice.to_value());
                }
                Ok(Value::Array(selected))
            }
            (Self::Select { choices } | Self::Radio { choices }, ChangeEvent::Choose(value)) => {
                Ok(find(choices, &value)?.to_value())
            }
            (Self::Json, ChangeEvent::Tree(tree)) => Ok(serde_json::to_value(tree)?),
            (_, event) => Err(unsupported(&event)),
        }
    }

    /// Whether `choice` is currently selected
    #[must_use]
    pub fn is_checked(&self, current: &Value, choice: &Choice) -> bool {
        match self {
            Self::Checkbox { multi: true, .. } => current.as_array().is_some_and(|items| {
                items
                    .iter()
                    .any(|item| choice_value(item) == Some(choice.value.as_str()))
            }),
            Self::Checkbox { .. } | Self::Select { .. } | Self::Radio { .. } => {
                !choice.value.is_empty() && choice_value(current) == Some(choice.value.as_str())
            }
            _ => false,
        }
    }
}

/// Property tree held by a JSON field value
///
/// Accepts the editor's own wire shape or a plain JSON object. Anything else
/// yields an empty tree.
#[must_use]
pub fn property_tree(value: &Value) -> PropertyTree {
    if let Value::Object(object) = value {
        return PropertyTree::from_json_object(object);
    }
    serde_json::from_value(value.clone()).unwrap_or_default()
}

fn find<'a>(choices: &'a [Choice], value: &str) -> Result<&'a Choice, DispatchError> {
    choices
        .iter()
        .find(|choice| choice.value == value)
        .ok_or_else(|| DispatchError::ChoiceNotFound(value.to_owned()))
}

fn choice_value(item: &Value) -> Option<&str> {
    item.get("value").and_then(Value::as_str)
}
