//! Form state reducer and controller
//!
//! [`FormState`] is an immutable snapshot; [`reduce`] produces the next one
//! from a [`FormAction`]. [`FormEngine`] owns the current snapshot and runs
//! the async submit flow.

use crate::dispatch::{property_tree, ChangeEvent, FieldBinding};
use crate::error::{merge_errors, ErrorMap, FormError};
use crate::field::{Choice, FieldConfig, FieldMap, FieldType};
use crate::schema::{
    prefixed, prepare_data_for_validation, translate_validation_errors, ObjectSchema, SchemaError,
    Validate,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cross-field validation run after the schema
///
/// Receives the submitted values and the per-field errors; returns extra
/// errors. Per-field errors win on key collision.
pub type NonFieldValidation = Arc<dyn Fn(&Map<String, Value>, &ErrorMap) -> ErrorMap + Send + Sync>;

/// Options fixed for the lifetime of an engine
#[derive(Clone, Default)]
pub struct FormOptions {
    /// Prepended to every field name as `{prefix}-{name}`
    pub prefix: Option<String>,
    pub non_field_validation: Option<NonFieldValidation>,
    /// Replaces every derived field rule
    pub validation_schema: Option<Arc<dyn Validate>>,
}

impl FormOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set cross-field validation
    #[must_use]
    pub fn with_non_field_validation<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Map<String, Value>, &ErrorMap) -> ErrorMap + Send + Sync + 'static,
    {
        self.non_field_validation = Some(Arc::new(validate));
        self
    }

    /// Set whole-form schema
    #[must_use]
    pub fn with_validation_schema(mut self, schema: impl Validate + 'static) -> Self {
        self.validation_schema = Some(Arc::new(schema));
        self
    }
}

impl Debug for FormOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("prefix", &self.prefix)
            .field("non_field_validation", &self.non_field_validation.is_some())
            .field("validation_schema", &self.validation_schema.is_some())
            .finish()
    }
}

/// Snapshot of a form
///
/// Value maps are keyed by prefixed name. Cloning is cheap; unchanged parts
/// are shared between snapshots.
#[derive(Clone)]
pub struct FormState {
    fields: Arc<FieldMap>,
    initial_values: im::HashMap<String, Value>,
    use_initial_values: im::HashSet<String>,
    values: im::HashMap<String, Value>,
    errors: ErrorMap,
    schema: Arc<dyn Validate>,
    prefix: Option<String>,
}

impl FormState {
    /// Fresh state for `fields`
    ///
    /// Fields are normalized, every field starts on its initial value and
    /// there are no errors.
    #[must_use]
    pub fn init(fields: &FieldMap, options: &FormOptions) -> Self {
        let prefix = options.prefix.clone();
        let fields: FieldMap = fields
            .iter()
            .map(|(name, field)| (name.clone(), field.clone().normalized()))
            .collect();

        let mut initial_values = im::HashMap::new();
        let mut use_initial_values = im::HashSet::new();
        for (name, field) in &fields {
            let key = prefixed(prefix.as_deref(), name);
            initial_values.insert(key.clone(), field.initial_value.clone());
            use_initial_values.insert(key);
        }

        let schema = options.validation_schema.clone().unwrap_or_else(|| {
            Arc::new(ObjectSchema::from_fields(&fields, prefix.as_deref())) as Arc<dyn Validate>
        });

        Self {
            fields: Arc::new(fields),
            initial_values,
            use_initial_values,
            values: im::HashMap::new(),
            errors: ErrorMap::new(),
            schema,
            prefix,
        }
    }

    /// Normalized field configs, by unprefixed name
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Name prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Current errors
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Stored key of field `name`
    #[must_use]
    pub fn key(&self, name: &str) -> String {
        prefixed(self.prefix.as_deref(), name)
    }

    /// Whether `name` still reads its initial value
    #[must_use]
    pub fn uses_initial_value(&self, name: &str) -> bool {
        self.use_initial_values.contains(&self.key(name))
    }

    /// Effective value of field `name`
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        if !self.fields.contains_key(name) {
            return None;
        }
        let key = self.key(name);
        if self.use_initial_values.contains(&key) {
            self.initial_values.get(&key)
        } else {
            self.values.get(&key)
        }
    }

    /// Effective values of every field, by prefixed name
    #[must_use]
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .keys()
            .map(|name| {
                let value = self.value(name).cloned().unwrap_or(Value::Null);
                (self.key(name), value)
            })
            .collect()
    }
}

impl Debug for FormState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("fields", &self.fields)
            .field("initial_values", &self.initial_values)
            .field("use_initial_values", &self.use_initial_values)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Reducer action
///
/// Wire form is `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum FormAction {
    /// Rebuild the state from new fields
    Reset(FieldMap),
    /// Set one field, by unprefixed name
    SetFieldValue { name: String, value: Value },
    /// Replace all errors
    SetErrors(ErrorMap),
}

impl FormAction {
    /// Action type names understood by [`reduce`]
    pub const TYPES: [&'static str; 3] = ["reset", "setFieldValue", "setErrors"];

    /// Decode an action from its wire form
    ///
    /// # Errors
    /// Returns [`FormError::UnknownAction`] for an unrecognised `type` and
    /// [`FormError::MalformedAction`] for a bad payload.
    pub fn from_json(value: Value) -> Result<Self, FormError> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        if !Self::TYPES.contains(&kind) {
            return Err(FormError::UnknownAction(kind.to_owned()));
        }
        serde_json::from_value(value).map_err(FormError::MalformedAction)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Reset(_) => Self::TYPES[0],
            Self::SetFieldValue { .. } => Self::TYPES[1],
            Self::SetErrors(_) => Self::TYPES[2],
        }
    }
}

/// Next snapshot after `action`
///
/// # Errors
/// Returns [`FormError::UnknownField`] when setting a field the form does
/// not have.
pub fn reduce(
    state: &FormState,
    action: FormAction,
    options: &FormOptions,
) -> Result<FormState, FormError> {
    match action {
        FormAction::Reset(fields) => Ok(FormState::init(&fields, options)),
        FormAction::SetFieldValue { name, value } => {
            if !state.fields.contains_key(&name) {
                return Err(FormError::UnknownField(name));
            }
            let key = state.key(&name);
            let mut next = state.clone();
            next.use_initial_values.remove(&key);
            next.values.insert(key, value);
            Ok(next)
        }
        FormAction::SetErrors(errors) => {
            let mut next = state.clone();
            next.errors = errors;
            Ok(next)
        }
    }
}

/// Values handed to a submit callback
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Unprefixed names; choices unwrapped, property trees as plain JSON
    pub submission_values: Map<String, Value>,
    /// Raw values by prefixed name
    pub values: Map<String, Value>,
    pub prefix: Option<String>,
}

impl Submission {
    fn prepare(state: &FormState, values: Map<String, Value>) -> Self {
        let submission_values = state
            .fields
            .iter()
            .map(|(name, field)| {
                let raw = values.get(&state.key(name)).unwrap_or(&Value::Null);
                (name.clone(), submission_value(field, raw))
            })
            .collect();
        Self {
            submission_values,
            values,
            prefix: state.prefix.clone(),
        }
    }

    /// Submitted value of `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.submission_values.get(name)
    }

    /// Submitted value of `name`, if it is a string
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Whether `name` was submitted with a truthy value
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(crate::field::is_truthy)
    }
}

fn submission_value(field: &FieldConfig, raw: &Value) -> Value {
    if field.field_type == FieldType::JsonField {
        return Value::Object(property_tree(raw).to_json());
    }
    if field.choices().is_empty() {
        return raw.clone();
    }
    match raw {
        Value::Object(choice) => choice.get("value").cloned().unwrap_or(Value::Null),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| item.get("value").cloned().unwrap_or(Value::Null))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Reset capability passed to a submit callback
///
/// The reset is applied once the callback returns.
#[derive(Debug, Default)]
pub struct Resetter {
    requested: Option<Option<FieldMap>>,
}

impl Resetter {
    /// Reset the form to its current fields
    pub fn reset(&mut self) {
        self.requested = Some(None);
    }

    /// Reset the form to new fields
    pub fn reset_to(&mut self, fields: FieldMap) {
        self.requested = Some(Some(fields));
    }

    /// Whether a reset was requested
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.is_some()
    }
}

/// Stateful form controller
pub struct FormEngine {
    state: FormState,
    options: FormOptions,
    server_errors: Option<ErrorMap>,
}

impl FormEngine {
    /// Engine over `fields`
    #[must_use]
    pub fn new(fields: FieldMap, options: FormOptions) -> Self {
        debug!(fields = fields.len(), prefix = ?options.prefix, "initializing form");
        Self {
            state: FormState::init(&fields, &options),
            options,
            server_errors: None,
        }
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Apply `action`
    ///
    /// # Errors
    /// See [`reduce`].
    pub fn dispatch(&mut self, action: FormAction) -> Result<(), FormError> {
        debug!(action = action.kind(), "form action");
        self.state = reduce(&self.state, action, &self.options)?;
        Ok(())
    }

    /// Decode and apply a wire-form action
    ///
    /// # Errors
    /// See [`FormAction::from_json`] and [`reduce`].
    pub fn dispatch_json(&mut self, action: Value) -> Result<(), FormError> {
        self.dispatch(FormAction::from_json(action)?)
    }

    /// Set field `name` to `value`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if there is no such field.
    pub fn set_field_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), FormError> {
        self.dispatch(FormAction::SetFieldValue {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Rebuild from `fields`, dropping values and errors
    pub fn reset(&mut self, fields: FieldMap) {
        debug!(fields = fields.len(), "form reset");
        self.state = FormState::init(&fields, &self.options);
    }

    /// Reset only if `fields` differ structurally from the current ones
    ///
    /// Returns whether a reset happened.
    pub fn reset_if_changed(&mut self, fields: &FieldMap) -> bool {
        let changed = fields.len() != self.state.fields.len()
            || fields.iter().any(|(name, field)| {
                self.state.fields.get(name) != Some(&field.clone().normalized())
            });
        if changed {
            self.reset(fields.clone());
        }
        changed
    }

    /// Effective value of `name`
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.value(name)
    }

    /// Display label of `name`: its label, or the capitalized name
    ///
    /// Capitalizing lower-cases the rest, so `backgroundColor` reads
    /// `Backgroundcolor`.
    #[must_use]
    pub fn label(&self, name: &str) -> String {
        self.state
            .fields
            .get(name)
            .and_then(|field| field.label.clone())
            .unwrap_or_else(|| capitalize(name))
    }

    /// Current errors
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.state.errors
    }

    /// Messages for `name`
    #[must_use]
    pub fn field_errors(&self, name: &str) -> Vec<String> {
        self.state
            .errors
            .get(&self.state.key(name))
            .map(crate::error::FieldError::messages)
            .unwrap_or_default()
    }

    /// Whether `name` has no errors
    #[must_use]
    pub fn is_valid(&self, name: &str) -> bool {
        !self.state.errors.contains_key(&self.state.key(name))
    }

    /// Widget binding of `name`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if there is no such field.
    pub fn binding(&self, name: &str) -> Result<FieldBinding, FormError> {
        self.state
            .fields
            .get(name)
            .map(FieldBinding::for_field)
            .ok_or_else(|| FormError::UnknownField(name.to_owned()))
    }

    /// Apply a widget change event to `name`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] or [`FormError::Dispatch`].
    pub fn change(&mut self, name: &str, event: ChangeEvent) -> Result<(), FormError> {
        let binding = self.binding(name)?;
        let current = self.value(name).cloned().unwrap_or(Value::Null);
        let next = binding.on_change(&current, event)?;
        self.set_field_value(name, next)
    }

    /// Whether `choice` is selected on `name`
    ///
    /// # Errors
    /// Returns [`FormError::UnknownField`] if there is no such field.
    pub fn is_checked(&self, name: &str, choice: &Choice) -> Result<bool, FormError> {
        let binding = self.binding(name)?;
        Ok(self
            .value(name)
            .is_some_and(|current| binding.is_checked(current, choice)))
    }

    /// Merge errors reported by a server
    ///
    /// Applied only when they differ from the previously reported set and
    /// from the current errors. Server messages win on collision. Returns
    /// whether the errors changed.
    pub fn sync_server_errors(&mut self, errors: ErrorMap) -> bool {
        let is_new = self.server_errors.as_ref() != Some(&errors);
        self.server_errors = Some(errors.clone());
        if !is_new || errors == self.state.errors {
            return false;
        }
        let merged = merge_errors(errors, self.state.errors.clone());
        debug!(errors = merged.len(), "merging server errors");
        match reduce(&self.state, FormAction::SetErrors(merged), &self.options) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(e) => {
                warn!(error = %e, "server errors not applied");
                false
            }
        }
    }

    /// Validate and, if clean, hand the values to `on_submit`
    ///
    /// Errors from the run replace the current errors whether or not the
    /// callback is invoked. Returns `None` when validation failed.
    ///
    /// # Errors
    /// Returns [`FormError::UnexpectedValidation`] if the schema itself
    /// fails; the form state is left as it was.
    pub async fn submit<F, R>(&mut self, on_submit: F) -> Result<Option<R>, FormError>
    where
        F: FnOnce(Submission, &mut Resetter) -> R,
    {
        let values = self.state.values();
        let prepared: Map<String, Value> = values
            .iter()
            .map(|(key, value)| (key.clone(), prepare_data_for_validation(value)))
            .collect();

        let schema = Arc::clone(&self.state.schema);
        let field_errors = match schema.validate(&prepared).await {
            Ok(()) => ErrorMap::new(),
            Err(SchemaError::Invalid(invalid)) => translate_validation_errors(&invalid),
            Err(SchemaError::Unexpected(cause)) => {
                error!(error = %cause, "validation failed unexpectedly");
                return Err(FormError::UnexpectedValidation(cause));
            }
        };

        let non_field_errors = self
            .options
            .non_field_validation
            .as_ref()
            .map(|validate| validate(&values, &field_errors))
            .unwrap_or_default();
        let errors = merge_errors(field_errors, non_field_errors);

        self.dispatch(FormAction::SetErrors(errors.clone()))?;
        if !errors.is_empty() {
            debug!(errors = errors.len(), "submission rejected");
            return Ok(None);
        }

        let submission = Submission::prepare(&self.state, values);
        let mut resetter = Resetter::default();
        let reply = on_submit(submission, &mut resetter);
        info!(prefix = ?self.state.prefix, "form submitted");

        match resetter.requested {
            Some(Some(fields)) => self.reset(fields),
            Some(None) => {
                let fields = self.state.fields.as_ref().clone();
                self.reset(fields);
            }
            None => {}
        }
        Ok(Some(reply))
    }
}

impl Debug for FormEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("state", &self.state)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
