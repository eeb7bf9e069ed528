//! Component tree of a page element
//!
//! Components are persisted as `{ "Component": name, "props": { ... } }`.
//! The renderer is referred to by its catalog name only.

use crate::node::{self, Branch, TreeError};
use crate::path::TreePath;
use crate::traverse::traverse_with_paths;
use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wrapper component every user-added node is rendered through
pub const ADAPT_COMPONENT: &str = "AdaptComponent";

/// Component chosen by the user in the inspector, with its props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSelected {
    #[serde(rename = "Component")]
    pub component: String,
    #[serde(default)]
    pub props: Map<String, Value>,
}

/// Props of a component node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProps {
    #[serde(default)]
    pub children: Vector<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<UserSelected>,
    /// Any other props, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One node of a component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    #[serde(rename = "Component")]
    pub component: String,
    #[serde(default)]
    pub props: ComponentProps,
}

impl ComponentNode {
    /// Node rendered by `component` with no props
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            props: ComponentProps::default(),
        }
    }

    /// Wrapper node around a user-selected component
    #[must_use]
    pub fn adapt(user_selected: UserSelected) -> Self {
        Self {
            component: ADAPT_COMPONENT.to_owned(),
            props: ComponentProps {
                user_selected: Some(user_selected),
                ..ComponentProps::default()
            },
        }
    }

    /// Name of the user-selected component, if any
    #[inline]
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.props
            .user_selected
            .as_ref()
            .map(|selected| selected.component.as_str())
    }
}

impl Branch for ComponentNode {
    fn children(&self) -> Option<&Vector<Self>> {
        Some(&self.props.children)
    }

    fn children_mut(&mut self) -> Option<&mut Vector<Self>> {
        Some(&mut self.props.children)
    }
}

/// Append `child` under the node at `path`, or at the root for an empty path
///
/// # Errors
/// Returns [`TreeError::PathNotFound`] for a stale path.
pub fn insert_child(
    components: &Vector<ComponentNode>,
    path: &TreePath,
    child: ComponentNode,
) -> Result<Vector<ComponentNode>, TreeError> {
    if path.is_empty() {
        let mut next = components.clone();
        next.push_back(child);
        return Ok(next);
    }
    node::mutate_at(components, path, |node: &mut ComponentNode| {
        node.props.children.push_back(child);
        Ok(())
    })
}

/// Inspector outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Serialized path of the node
    pub key: String,
    /// Selected component name
    pub title: Option<String>,
    pub children: Vec<OutlineNode>,
}

/// Outline of every node carrying a user-selected component
///
/// Nodes without a selection are skipped unless something below them has
/// one, in which case they appear untitled so the hierarchy is preserved.
#[must_use]
pub fn outline(components: &Vector<ComponentNode>) -> Vec<OutlineNode> {
    outline_level(components, &TreePath::root())
}

fn outline_level(level: &Vector<ComponentNode>, parent: &TreePath) -> Vec<OutlineNode> {
    level
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let path = parent.child(index);
            let children = outline_level(&node.props.children, &path);
            let title = node.selected_name().map(str::to_owned);
            if title.is_none() && children.is_empty() {
                return None;
            }
            Some(OutlineNode {
                key: path.serialize(),
                title,
                children,
            })
        })
        .collect()
}

/// Paths of every node rendered through [`ADAPT_COMPONENT`]
#[must_use]
pub fn selected_paths(components: &Vector<ComponentNode>) -> Vec<TreePath> {
    traverse_with_paths(components)
        .filter(|(_, node)| node.component == ADAPT_COMPONENT)
        .map(|(path, _)| path)
        .collect()
}
