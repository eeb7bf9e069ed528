//! Adapt Form
//!
//! Declarative forms: a map of [`FieldConfig`]s is turned into default
//! values, a validation schema, and widget bindings.
//!
//! # Core Concepts
//!
//! - [`FieldConfig`]: type, label, initial value, choices and flags of a field
//! - [`Rule`] / [`ObjectSchema`]: validation derived from field configs
//! - [`FormEngine`]: owns a [`FormState`] snapshot, applies [`FormAction`]s
//!   and runs the async submit flow
//! - [`FieldBinding`]: what a widget needs to render and change a field
//!
//! # Example
//!
//! ```rust,ignore
//! use adapt_form::prelude::*;
//!
//! let mut fields = FieldMap::new();
//! fields.insert("element".into(), FieldConfig::text().required());
//!
//! let mut form = FormEngine::new(fields, FormOptions::new());
//! form.set_field_value("element", "Header")?;
//! let submitted = form.submit(|submission, _| submission).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod dispatch;
mod engine;
mod error;
mod field;
mod schema;

pub use dispatch::{property_tree, ChangeEvent, DispatchError, FieldBinding, InputKind};
pub use engine::{
    reduce, FormAction, FormEngine, FormOptions, FormState, NonFieldValidation, Resetter,
    Submission,
};
pub use error::{ErrorMap, FieldError, FormError};
pub use field::{is_truthy, Choice, FieldConfig, FieldMap, FieldType};
pub use schema::{
    derive_default_rule, prepare_data_for_validation, translate_validation_errors, CustomTest,
    Issue, ObjectSchema, Predicate, Rule, RuleKind, SchemaError, Validate, ValidationError,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ChangeEvent, Choice, ErrorMap, FieldConfig, FieldMap, FieldType, FormEngine, FormError,
        FormOptions, Rule, Submission,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::{json, Value};

    fn element_form() -> FormEngine {
        let mut fields = FieldMap::new();
        fields.insert(
            "element".into(),
            FieldConfig::text().required().with_initial_value(""),
        );
        FormEngine::new(fields, FormOptions::new())
    }

    #[tokio::test]
    async fn empty_required_field_blocks_submit() {
        let mut form = element_form();
        let mut called = false;
        let reply = form.submit(|_, _| called = true).await.unwrap();

        assert!(reply.is_none());
        assert!(!called);
        assert_eq!(
            serde_json::to_value(form.errors()).unwrap(),
            json!({"element": "element is a required field"})
        );
    }

    #[tokio::test]
    async fn filled_field_submits() {
        let mut form = element_form();
        form.set_field_value("element", "Header").unwrap();
        let submission = form.submit(|s, _| s).await.unwrap().unwrap();

        assert!(form.errors().is_empty());
        assert_eq!(Value::from(submission.submission_values), json!({"element": "Header"}));
    }
}
