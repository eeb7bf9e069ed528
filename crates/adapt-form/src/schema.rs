//! Validation rules derived from field configs
//!
//! A [`Rule`] describes the accepted shape of one field value. An
//! [`ObjectSchema`] maps field names to rules and implements the async
//! [`Validate`] trait, which is also the seam for caller-supplied schemas.

use crate::field::{FieldConfig, FieldMap, FieldType};
use crate::ErrorMap;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Fallible predicate of a custom test
pub type Predicate = Arc<dyn Fn(&Value) -> anyhow::Result<bool> + Send + Sync>;

/// Named extra check attached to a rule
#[derive(Clone)]
pub struct CustomTest {
    pub name: String,
    pub message: String,
    predicate: Predicate,
}

impl CustomTest {
    /// Run the predicate
    ///
    /// # Errors
    /// Propagates a failure of the predicate itself.
    pub fn check(&self, value: &Value) -> anyhow::Result<bool> {
        (self.predicate)(value)
    }
}

impl Debug for CustomTest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTest")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomTest {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.message == other.message
            && Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

/// Accepted value shape
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Strings, numbers accepted as their text
    String,
    /// `{label?, value}` object
    Choice,
    /// Array whose items follow the inner rule
    ListOf(Box<Rule>),
    /// Anything; only custom tests apply
    Any,
}

impl RuleKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Choice => "object",
            Self::ListOf(_) => "array",
            Self::Any => "mixed",
        }
    }
}

/// Validation rule for one field
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub required: bool,
    pub label: Option<String>,
    pub tests: Vec<CustomTest>,
}

impl Rule {
    fn of(kind: RuleKind) -> Self {
        Self {
            kind,
            required: false,
            label: None,
            tests: Vec::new(),
        }
    }

    /// String rule
    #[must_use]
    pub fn string() -> Self {
        Self::of(RuleKind::String)
    }

    /// Choice object rule
    #[must_use]
    pub fn choice() -> Self {
        Self::of(RuleKind::Choice)
    }

    /// List rule over `inner`
    #[must_use]
    pub fn list_of(inner: Self) -> Self {
        Self::of(RuleKind::ListOf(Box::new(inner)))
    }

    /// Rule that accepts any value
    #[must_use]
    pub fn any() -> Self {
        Self::of(RuleKind::Any)
    }

    /// Reject absent values
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Name used in messages instead of the path
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach an infallible custom test
    #[must_use]
    pub fn test<F>(self, name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.try_test(name, message, move |value| Ok(predicate(value)))
    }

    /// Attach a custom test that may fail outright
    ///
    /// A predicate error aborts validation as an unexpected failure instead
    /// of producing a field message.
    #[must_use]
    pub fn try_test<F>(
        mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.tests.push(CustomTest {
            name: name.into(),
            message: message.into(),
            predicate: Arc::new(predicate),
        });
        self
    }

    /// Check `value` at `path`, appending any issues
    ///
    /// # Errors
    /// Returns error only if a custom test predicate fails.
    pub fn check(&self, path: &str, value: &Value, issues: &mut Vec<Issue>) -> anyhow::Result<()> {
        let name = self.label.as_deref().unwrap_or(path);

        if value.is_null() {
            if self.required {
                issues.push(Issue::required(path, name));
            }
            return Ok(());
        }

        match &self.kind {
            RuleKind::String => {
                if !(value.is_string() || value.is_number()) {
                    issues.push(Issue::type_mismatch(path, name, &self.kind));
                    return Ok(());
                }
            }
            RuleKind::Choice => {
                let Some(object) = value.as_object() else {
                    issues.push(Issue::type_mismatch(path, name, &self.kind));
                    return Ok(());
                };
                if self.required && !object.get("value").is_some_and(crate::field::is_truthy) {
                    issues.push(Issue::required(path, name));
                    return Ok(());
                }
            }
            RuleKind::ListOf(inner) => {
                let Some(items) = value.as_array() else {
                    issues.push(Issue::type_mismatch(path, name, &self.kind));
                    return Ok(());
                };
                if self.required && items.is_empty() {
                    issues.push(Issue::required(path, name));
                    return Ok(());
                }
                for (index, item) in items.iter().enumerate() {
                    inner.check(&format!("{path}[{index}]"), item, issues)?;
                }
            }
            RuleKind::Any => {}
        }

        for test in &self.tests {
            if !test.check(value)? {
                issues.push(Issue {
                    path: path.to_owned(),
                    rule_type: test.name.clone(),
                    message: test.message.replace("${path}", name),
                });
            }
        }
        Ok(())
    }
}

/// Rule implied by a field's type and flags, if any
///
/// `textarea`, `jsonField` and unknown types have no derived rule. An
/// explicit `validation` on the field always wins.
#[must_use]
pub fn derive_default_rule(field: &FieldConfig) -> Option<Rule> {
    if let Some(rule) = &field.validation {
        return Some(rule.clone());
    }

    let mut rule = match field.field_type {
        FieldType::Text | FieldType::Number => Rule::string(),
        FieldType::Checkbox | FieldType::Radio | FieldType::Select => Rule::choice(),
        FieldType::Textarea | FieldType::JsonField | FieldType::Unknown(_) => return None,
    };
    if field.required {
        rule = rule.required();
    }
    if field.multi && field.field_type == FieldType::Checkbox {
        let mut item = Rule::choice();
        item.label = field.label.clone();
        rule = Rule {
            kind: RuleKind::ListOf(Box::new(item)),
            ..rule
        };
    }
    if let Some(label) = &field.label {
        rule = rule.label(label.clone());
    }
    Some(rule)
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    /// `required`, `typeError`, or the custom test name
    pub rule_type: String,
    pub message: String,
}

impl Issue {
    fn required(path: &str, name: &str) -> Self {
        Self {
            path: path.to_owned(),
            rule_type: "required".into(),
            message: format!("{name} is a required field"),
        }
    }

    fn type_mismatch(path: &str, name: &str, kind: &RuleKind) -> Self {
        Self {
            path: path.to_owned(),
            rule_type: "typeError".into(),
            message: format!("{name} must be a `{}` type", kind.type_name()),
        }
    }
}

/// Expected validation failure carrying every issue found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} validation issue(s)", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

/// Outcome of running a schema other than success
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// User input did not satisfy the schema
    #[error("invalid form data: {0}")]
    Invalid(#[from] ValidationError),

    /// Validator itself failed
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl SchemaError {
    /// Check if this is an ordinary user-input failure
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Async validator over the whole (prepared) form data
#[async_trait]
pub trait Validate: Send + Sync {
    /// Validate `data`, reporting every issue at once
    async fn validate(&self, data: &Map<String, Value>) -> Result<(), SchemaError>;
}

/// Field name to rule map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    rules: IndexMap<String, Rule>,
}

impl ObjectSchema {
    /// Empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `name`
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Schema of derived rules, with names optionally prefixed
    #[must_use]
    pub fn from_fields(fields: &FieldMap, prefix: Option<&str>) -> Self {
        let rules = fields
            .iter()
            .filter_map(|(name, field)| {
                derive_default_rule(field).map(|rule| (prefixed(prefix, name), rule))
            })
            .collect();
        Self { rules }
    }

    /// Rule for `name`
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Check every rule and collect issues
    ///
    /// # Errors
    /// Returns error if a custom test predicate fails.
    pub fn issues(&self, data: &Map<String, Value>) -> anyhow::Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, rule) in &self.rules {
            let value = data.get(name).unwrap_or(&Value::Null);
            rule.check(name, value, &mut issues)?;
        }
        Ok(issues)
    }
}

#[async_trait]
impl Validate for ObjectSchema {
    async fn validate(&self, data: &Map<String, Value>) -> Result<(), SchemaError> {
        let issues = self.issues(data)?;
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues }.into())
        }
    }
}

pub(crate) fn prefixed(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}-{name}"),
        None => name.to_owned(),
    }
}

/// Normalize form data before validation
///
/// Empty strings become `null` at any depth; arrays and objects recurse;
/// everything else is unchanged.
#[must_use]
pub fn prepare_data_for_validation(value: &Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::Null,
        Value::Array(items) => {
            Value::Array(items.iter().map(prepare_data_for_validation).collect())
        }
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(k, v)| (k.clone(), prepare_data_for_validation(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Flatten issues into a path to message map
///
/// The first issue for a path wins the path key. A later issue for the same
/// path is stored under its rule type instead, if that key is still free.
#[must_use]
pub fn translate_validation_errors(error: &ValidationError) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for issue in &error.issues {
        if !errors.contains_key(&issue.path) {
            errors.insert(issue.path.clone(), issue.message.clone().into());
        } else if !errors.contains_key(&issue.rule_type) {
            errors.insert(issue.rule_type.clone(), issue.message.clone().into());
        }
    }
    errors
}
