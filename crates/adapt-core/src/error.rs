//! Error types for the Adapt controller

use crate::persistence::PersistenceError;
use adapt_form::FormError;
use adapt_tree::TreeError;

/// Main Adapt error type
#[derive(Debug, thiserror::Error)]
pub enum AdaptError {
    /// Tree addressing failed
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Form misuse or validator failure
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Loading or saving state failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// No element at this index
    #[error("no element at index {index} (have {len})")]
    ElementNotFound { index: usize, len: usize },

    /// Element names must be unique
    #[error("element name already taken: {0}")]
    DuplicateElement(String),

    /// Operation needs an element in view and none is
    #[error("no element in view")]
    NoElementInView,

    /// Name is not in the component catalog
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdaptError {
    /// Check if retrying the same call could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(e) if e.is_retryable())
    }
}

/// Result alias for Adapt operations
pub type Result<T> = std::result::Result<T, AdaptError>;
