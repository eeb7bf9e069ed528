//! Page state reducer

use crate::error::{AdaptError, Result};
use crate::state::{AdaptState, DevtoolsPosition, Element};
use adapt_tree::{insert_child, ComponentNode, TreePath, UserSelected};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Page state action
///
/// Wire form is `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum AdaptAction {
    /// Wrap `component` and insert it into an element's tree
    ///
    /// `parent` addresses the node to insert under; empty means the root.
    #[serde(rename_all = "camelCase")]
    AddComponentToElement {
        element: usize,
        component: UserSelected,
        #[serde(default)]
        parent: TreePath,
    },
    SetDevtoolsPosition(DevtoolsPosition),
    SetElements(Vector<Element>),
    /// Replace one element's whole component tree
    SetComponents {
        element: usize,
        components: Vector<ComponentNode>,
    },
    /// Choose the inspected element, or none
    ElementInView(Option<usize>),
}

impl AdaptAction {
    /// Wire type name
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddComponentToElement { .. } => "addComponentToElement",
            Self::SetDevtoolsPosition(_) => "setDevtoolsPosition",
            Self::SetElements(_) => "setElements",
            Self::SetComponents { .. } => "setComponents",
            Self::ElementInView(_) => "elementInView",
        }
    }
}

/// Next state after `action`
///
/// # Errors
/// Returns [`AdaptError::ElementNotFound`] for an out-of-range element
/// index, [`AdaptError::DuplicateElement`] when `SetElements` repeats a
/// name and [`AdaptError::Tree`] for a stale `parent` path.
pub fn reduce(state: &AdaptState, action: AdaptAction) -> Result<AdaptState> {
    let mut next = state.clone();
    match action {
        AdaptAction::AddComponentToElement {
            element,
            component,
            parent,
        } => {
            let target = element_mut(&mut next.elements, element)?;
            let child = ComponentNode::adapt(component);
            target.components = insert_child(&target.components, &parent, child)?;
        }
        AdaptAction::SetDevtoolsPosition(position) => next.devtools_position = position,
        AdaptAction::SetElements(elements) => {
            check_unique(&elements)?;
            if next.element_in_view.is_some_and(|index| index >= elements.len()) {
                next.element_in_view = None;
            }
            next.elements = elements;
        }
        AdaptAction::SetComponents { element, components } => {
            element_mut(&mut next.elements, element)?.components = components;
        }
        AdaptAction::ElementInView(index) => {
            if let Some(index) = index {
                check_index(&next.elements, index)?;
            }
            next.element_in_view = index;
        }
    }
    Ok(next)
}

fn check_index(elements: &Vector<Element>, index: usize) -> Result<()> {
    if index < elements.len() {
        Ok(())
    } else {
        Err(AdaptError::ElementNotFound {
            index,
            len: elements.len(),
        })
    }
}

fn check_unique(elements: &Vector<Element>) -> Result<()> {
    let mut seen = HashSet::new();
    match elements.iter().find(|element| !seen.insert(element.name.as_str())) {
        Some(duplicate) => Err(AdaptError::DuplicateElement(duplicate.name.clone())),
        None => Ok(()),
    }
}

fn element_mut(elements: &mut Vector<Element>, index: usize) -> Result<&mut Element> {
    let len = elements.len();
    elements
        .get_mut(index)
        .ok_or(AdaptError::ElementNotFound { index, len })
}
