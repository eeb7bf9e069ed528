//! Error types for the form engine
//!
//! - [`FormError`]: misuse of the engine or a validator failure
//! - [`FieldError`] / [`ErrorMap`]: user-facing messages shown per field

use crate::dispatch::DispatchError;
use serde::{Deserialize, Serialize};

/// Message(s) attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    One(String),
    Many(Vec<String>),
}

impl FieldError {
    /// Messages as a list
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::One(message) => vec![message.clone()],
            Self::Many(messages) => messages.clone(),
        }
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::One(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::One(message.to_owned())
    }
}

impl From<Vec<String>> for FieldError {
    fn from(messages: Vec<String>) -> Self {
        Self::Many(messages)
    }
}

/// Field path to message(s)
pub type ErrorMap = im::OrdMap<String, FieldError>;

/// Union of two error maps where `winner` keeps its message on a shared key
///
/// `OrdMap::union` keeps the larger map's values, so precedence has to be
/// explicit.
pub(crate) fn merge_errors(mut winner: ErrorMap, loser: ErrorMap) -> ErrorMap {
    for (key, error) in loser {
        if !winner.contains_key(&key) {
            winner.insert(key, error);
        }
    }
    winner
}

/// Form engine errors
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Name does not belong to this form
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Action type not handled by the reducer
    #[error("unknown form action: {0}")]
    UnknownAction(String),

    /// Action payload does not match its type
    #[error("malformed form action: {0}")]
    MalformedAction(#[source] serde_json::Error),

    /// Change event could not be applied
    #[error("change rejected: {0}")]
    Dispatch(#[from] DispatchError),

    /// Validator failed for a reason other than invalid input
    #[error("unexpected validation failure: {0}")]
    UnexpectedValidation(#[source] anyhow::Error),
}

impl FormError {
    /// Check if the error is a caller bug rather than a runtime failure
    #[inline]
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField(_) | Self::UnknownAction(_) | Self::MalformedAction(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_error_wire_shape() {
        let mut errors = ErrorMap::new();
        errors.insert("a".into(), "one".into());
        errors.insert("b".into(), vec!["x".to_owned(), "y".to_owned()].into());
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"a": "one", "b": ["x", "y"]})
        );
    }

    #[test]
    fn messages_flatten() {
        assert_eq!(FieldError::from("one").messages(), vec!["one"]);
    }

    #[test]
    fn merge_keeps_winner_regardless_of_size() {
        let mut small = ErrorMap::new();
        small.insert("a".into(), "small".into());
        let mut large = ErrorMap::new();
        large.insert("a".into(), "large".into());
        large.insert("b".into(), "b".into());
        large.insert("c".into(), "c".into());

        let merged = merge_errors(small.clone(), large.clone());
        assert_eq!(merged.get("a"), Some(&FieldError::from("small")));
        assert_eq!(merged.len(), 3);

        let merged = merge_errors(large, small);
        assert_eq!(merged.get("a"), Some(&FieldError::from("large")));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn programmer_errors() {
        assert!(FormError::UnknownField("x".into()).is_programmer_error());
        assert!(!FormError::UnexpectedValidation(anyhow::anyhow!("boom")).is_programmer_error());
    }
}
