//! Page state and its persisted form

use adapt_tree::ComponentNode;
use im::Vector;
use serde::{Deserialize, Serialize};

/// Where the devtools panel is docked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevtoolsPosition {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
    /// Undocked, in its own window
    Separate,
}

/// A named page element and its component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default)]
    pub components: Vector<ComponentNode>,
}

impl Element {
    /// Element with no components
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vector::new(),
        }
    }
}

/// Persisted page state
///
/// Wire shape: `{"devtoolsPosition": "left", "elements": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedState {
    #[serde(default)]
    pub devtools_position: DevtoolsPosition,
    #[serde(default)]
    pub elements: Vector<Element>,
}

/// In-memory page state
///
/// `element_in_view` is session-only and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptState {
    pub devtools_position: DevtoolsPosition,
    pub elements: Vector<Element>,
    pub element_in_view: Option<usize>,
}

impl AdaptState {
    /// Persisted part of the state
    #[must_use]
    pub fn to_serialized(&self) -> SerializedState {
        SerializedState {
            devtools_position: self.devtools_position,
            elements: self.elements.clone(),
        }
    }

    /// Element currently inspected
    #[must_use]
    pub fn element_in_view(&self) -> Option<&Element> {
        self.element_in_view.and_then(|index| self.elements.get(index))
    }

    /// Whether an element called `name` exists
    #[must_use]
    pub fn has_element(&self, name: &str) -> bool {
        self.elements.iter().any(|element| element.name == name)
    }
}

impl From<SerializedState> for AdaptState {
    fn from(state: SerializedState) -> Self {
        Self {
            devtools_position: state.devtools_position,
            elements: state.elements,
            element_in_view: None,
        }
    }
}
