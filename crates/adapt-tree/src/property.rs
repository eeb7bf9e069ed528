//! Property tree edited by the JSON property editor
//!
//! A property tree is a forest of key/value [`Pair`]s whose values are either
//! a single [`ScalarLeaf`] or a nested group. Every operation returns a new
//! tree and leaves `self` untouched.

use crate::node::{self, Branch, TreeError};
use crate::path::TreePath;
use crate::traverse::{traverse, Traverse};
use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bare editable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarLeaf {
    /// Always `true` for leaves produced by the editor
    #[serde(rename = "cssValue", default = "css_value_default")]
    pub css_value: bool,
    /// Raw text
    pub value: String,
    /// Currently being edited
    #[serde(default)]
    pub edit: bool,
}

fn css_value_default() -> bool {
    true
}

impl ScalarLeaf {
    /// A blank, non-editing leaf
    #[must_use]
    pub fn blank() -> Self {
        Self::new("")
    }

    /// Leaf holding `value`
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            css_value: true,
            value: value.into(),
            edit: false,
        }
    }
}

/// Value half of a [`Pair`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Nested sequence of nodes
    Group(Vector<PropertyNode>),
    /// Single scalar
    Scalar(ScalarLeaf),
}

/// A named property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "is_false")]
    pub expand: bool,
    /// Key half is being edited
    #[serde(default, skip_serializing_if = "is_false")]
    pub edit: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Pair {
    /// Pair with an empty key and a blank scalar value
    #[must_use]
    pub fn blank() -> Self {
        Self::scalar("", "")
    }

    /// Pair holding a single scalar
    #[must_use]
    pub fn scalar(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PropertyValue::Scalar(ScalarLeaf::new(value)),
            expand: false,
            edit: false,
        }
    }

    /// Pair holding a group of nodes
    #[must_use]
    pub fn group(key: impl Into<String>, nodes: Vector<PropertyNode>) -> Self {
        Self {
            key: key.into(),
            value: PropertyValue::Group(nodes),
            expand: false,
            edit: false,
        }
    }
}

/// Node of a property tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyNode {
    Pair(Pair),
    Leaf(ScalarLeaf),
}

impl Branch for PropertyNode {
    fn children(&self) -> Option<&Vector<Self>> {
        match self {
            Self::Pair(Pair {
                value: PropertyValue::Group(nodes),
                ..
            }) => Some(nodes),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vector<Self>> {
        match self {
            Self::Pair(Pair {
                value: PropertyValue::Group(nodes),
                ..
            }) => Some(nodes),
            _ => None,
        }
    }
}

impl From<Pair> for PropertyNode {
    fn from(pair: Pair) -> Self {
        Self::Pair(pair)
    }
}

impl From<ScalarLeaf> for PropertyNode {
    fn from(leaf: ScalarLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

/// Which half of a node an edit flag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditTarget {
    /// A pair's key, or a bare leaf
    Node,
    /// A pair's scalar value, or a bare leaf
    Value,
}

/// Forest of property nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTree(Vector<PropertyNode>);

impl PropertyTree {
    /// Empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root nodes
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &Vector<PropertyNode> {
        &self.0
    }

    /// Number of root nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the tree has no root nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Node at `path`
    ///
    /// # Errors
    /// Returns [`TreeError::PathNotFound`] for a stale path.
    pub fn node_at(&self, path: &TreePath) -> Result<&PropertyNode, TreeError> {
        node::node_at(&self.0, path)
    }

    /// Pre-order walk over every node
    #[must_use]
    pub fn traverse(&self) -> Traverse<'_, PropertyNode> {
        traverse(&self.0)
    }

    fn mutate(
        &self,
        path: &TreePath,
        updater: impl FnOnce(&mut PropertyNode) -> Result<(), TreeError>,
    ) -> Result<Self, TreeError> {
        node::mutate_at(&self.0, path, updater).map(Self)
    }

    /// Set the expand flag at `path` and collapse everything below it
    ///
    /// # Errors
    /// Returns [`TreeError::NotExpandable`] if `path` addresses a bare leaf.
    pub fn expand(&self, path: &TreePath, flag: bool) -> Result<Self, TreeError> {
        self.mutate(path, |node| {
            let PropertyNode::Pair(pair) = node else {
                return Err(TreeError::NotExpandable {
                    path: path.serialize(),
                });
            };
            pair.expand = flag;
            if let PropertyValue::Group(children) = &mut pair.value {
                node::for_each_mut(children, &mut |descendant: &mut PropertyNode| {
                    if let PropertyNode::Pair(p) = descendant {
                        p.expand = false;
                    }
                });
            }
            Ok(())
        })
    }

    /// Grow the tree at `path`
    ///
    /// - empty path: append a blank pair at the root
    /// - pair with a scalar: promote the value to `[existing, blank]`
    /// - pair with a group: append a blank leaf
    ///
    /// # Errors
    /// Returns [`TreeError::NotAGroup`] if `path` addresses a bare leaf.
    pub fn add_child(&self, path: &TreePath) -> Result<Self, TreeError> {
        if path.is_empty() {
            let mut nodes = self.0.clone();
            nodes.push_back(Pair::blank().into());
            return Ok(Self(nodes));
        }
        self.mutate(path, |node| match node {
            PropertyNode::Pair(pair) => {
                match &mut pair.value {
                    PropertyValue::Group(children) => {
                        children.push_back(ScalarLeaf::blank().into());
                    }
                    PropertyValue::Scalar(existing) => {
                        let existing = existing.clone();
                        pair.value = PropertyValue::Group(Vector::from(vec![
                            PropertyNode::Leaf(existing),
                            PropertyNode::Leaf(ScalarLeaf::blank()),
                        ]));
                    }
                }
                Ok(())
            }
            PropertyNode::Leaf(_) => Err(TreeError::NotAGroup {
                path: path.serialize(),
            }),
        })
    }

    /// Tree with every edit flag cleared
    #[must_use]
    pub fn clear_edits(&self) -> Self {
        let mut nodes = self.0.clone();
        node::for_each_mut(&mut nodes, &mut |node: &mut PropertyNode| match node {
            PropertyNode::Pair(pair) => {
                if pair.edit {
                    pair.edit = false;
                }
                if let PropertyValue::Scalar(leaf) = &mut pair.value {
                    if leaf.edit {
                        leaf.edit = false;
                    }
                }
            }
            PropertyNode::Leaf(leaf) => {
                if leaf.edit {
                    leaf.edit = false;
                }
            }
        });
        Self(nodes)
    }

    /// Make exactly one half of one node editable
    ///
    /// # Errors
    /// Returns [`TreeError::PathNotFound`] for a stale path, or
    /// [`TreeError::NoScalarValue`] when targeting the value of a group pair.
    pub fn set_editable(&self, path: &TreePath, target: EditTarget) -> Result<Self, TreeError> {
        self.clear_edits().mutate(path, |node| {
            *edit_flag(node, target, path)? = true;
            Ok(())
        })
    }

    /// Write `text` into the targeted half and leave edit mode
    ///
    /// # Errors
    /// Same conditions as [`PropertyTree::set_editable`].
    pub fn commit_edit(
        &self,
        path: &TreePath,
        target: EditTarget,
        text: impl Into<String>,
    ) -> Result<Self, TreeError> {
        let text = text.into();
        self.mutate(path, |node| {
            match (node, target) {
                (PropertyNode::Leaf(leaf), _) => {
                    leaf.value = text;
                    leaf.edit = false;
                }
                (PropertyNode::Pair(pair), EditTarget::Node) => {
                    pair.key = text;
                    pair.edit = false;
                }
                (PropertyNode::Pair(pair), EditTarget::Value) => match &mut pair.value {
                    PropertyValue::Scalar(leaf) => {
                        leaf.value = text;
                        leaf.edit = false;
                    }
                    PropertyValue::Group(_) => {
                        return Err(TreeError::NoScalarValue {
                            path: path.serialize(),
                        })
                    }
                },
            }
            Ok(())
        })
    }

    /// Number of edit flags currently set
    #[must_use]
    pub fn editable_count(&self) -> usize {
        self.traverse()
            .map(|node| match node {
                PropertyNode::Pair(pair) => {
                    let value_edit =
                        matches!(&pair.value, PropertyValue::Scalar(leaf) if leaf.edit);
                    usize::from(pair.edit) + usize::from(value_edit)
                }
                PropertyNode::Leaf(leaf) => usize::from(leaf.edit),
            })
            .sum()
    }

    /// Plain JSON object view of the tree
    ///
    /// Each root pair maps its key to the scalar text, or to an array when the
    /// value is a group. Nested pairs become single-key objects. Root-level
    /// bare leaves have no key and are skipped.
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter_map(|node| match node {
                PropertyNode::Pair(pair) => Some((pair.key.clone(), value_to_json(&pair.value))),
                PropertyNode::Leaf(_) => None,
            })
            .collect()
    }

    /// Build an editor tree from a plain JSON object
    ///
    /// Inverse of [`PropertyTree::to_json`] for the shapes it produces.
    /// Non-string scalars are stored as their JSON text.
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .map(|(key, value)| PropertyNode::Pair(pair_from_json(key, value)))
                .collect(),
        )
    }
}

impl From<Vector<PropertyNode>> for PropertyTree {
    fn from(nodes: Vector<PropertyNode>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<PropertyNode> for PropertyTree {
    fn from_iter<T: IntoIterator<Item = PropertyNode>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn edit_flag<'a>(
    node: &'a mut PropertyNode,
    target: EditTarget,
    path: &TreePath,
) -> Result<&'a mut bool, TreeError> {
    match (node, target) {
        (PropertyNode::Leaf(leaf), _) => Ok(&mut leaf.edit),
        (PropertyNode::Pair(pair), EditTarget::Node) => Ok(&mut pair.edit),
        (PropertyNode::Pair(pair), EditTarget::Value) => match &mut pair.value {
            PropertyValue::Scalar(leaf) => Ok(&mut leaf.edit),
            PropertyValue::Group(_) => Err(TreeError::NoScalarValue {
                path: path.serialize(),
            }),
        },
    }
}

fn value_to_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Scalar(leaf) => Value::String(leaf.value.clone()),
        PropertyValue::Group(nodes) => Value::Array(
            nodes
                .iter()
                .map(|node| match node {
                    PropertyNode::Leaf(leaf) => Value::String(leaf.value.clone()),
                    PropertyNode::Pair(pair) => {
                        let mut object = Map::new();
                        object.insert(pair.key.clone(), value_to_json(&pair.value));
                        Value::Object(object)
                    }
                })
                .collect(),
        ),
    }
}

fn pair_from_json(key: &str, value: &Value) -> Pair {
    match value {
        Value::Array(items) => Pair::group(key, items.iter().flat_map(nodes_from_json).collect()),
        Value::Object(object) => Pair::group(
            key,
            object
                .iter()
                .map(|(k, v)| PropertyNode::Pair(pair_from_json(k, v)))
                .collect(),
        ),
        other => Pair::scalar(key, scalar_text(other)),
    }
}

fn nodes_from_json(item: &Value) -> Vec<PropertyNode> {
    match item {
        Value::Object(object) => object
            .iter()
            .map(|(k, v)| PropertyNode::Pair(pair_from_json(k, v)))
            .collect(),
        Value::Array(items) => items.iter().flat_map(nodes_from_json).collect(),
        other => vec![PropertyNode::Leaf(ScalarLeaf::new(scalar_text(other)))],
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn p(indices: &[usize]) -> TreePath {
        TreePath::from_indices(indices)
    }

    fn margins() -> PropertyTree {
        serde_json::from_value(json!([
            {"key": "color", "value": {"cssValue": true, "value": "red", "edit": false}},
            {"key": "margin", "value": [
                {"cssValue": true, "value": "1px", "edit": false},
                {
                    "key": "inner",
                    "value": [{"cssValue": true, "value": "2px", "edit": false}],
                    "expand": true
                }
            ], "expand": true}
        ]))
        .unwrap()
    }

    #[test]
    fn wire_shape_deserializes_into_variants() {
        let tree = margins();
        assert!(matches!(
            tree.node_at(&p(&[0])).unwrap(),
            PropertyNode::Pair(Pair { value: PropertyValue::Scalar(_), .. })
        ));
        assert!(matches!(tree.node_at(&p(&[1, 0])).unwrap(), PropertyNode::Leaf(_)));
        assert!(matches!(tree.node_at(&p(&[1, 1])).unwrap(), PropertyNode::Pair(_)));
    }

    #[test]
    fn blank_pair_wire_shape() {
        let tree = PropertyTree::new().add_child(&TreePath::root()).unwrap();
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!([{"key": "", "value": {"cssValue": true, "value": "", "edit": false}}])
        );
    }

    #[test]
    fn add_child_twice_at_root() {
        let tree = PropertyTree::new()
            .add_child(&TreePath::root())
            .unwrap()
            .add_child(&TreePath::root())
            .unwrap();
        assert_eq!(tree.node_at(&p(&[0])).unwrap(), &PropertyNode::Pair(Pair::blank()));
        assert_eq!(tree.node_at(&p(&[1])).unwrap(), &PropertyNode::Pair(Pair::blank()));
    }

    #[test]
    fn add_child_promotes_scalar() {
        let tree = margins().add_child(&p(&[0])).unwrap();
        let PropertyNode::Pair(pair) = tree.node_at(&p(&[0])).unwrap() else {
            panic!("expected pair");
        };
        assert_eq!(
            pair.value,
            PropertyValue::Group(im::vector![
                PropertyNode::Leaf(ScalarLeaf::new("red")),
                PropertyNode::Leaf(ScalarLeaf::blank()),
            ])
        );
    }

    #[test]
    fn add_child_appends_to_group() {
        let tree = margins().add_child(&p(&[1])).unwrap();
        assert_eq!(tree.node_at(&p(&[1, 2])).unwrap(), &PropertyNode::Leaf(ScalarLeaf::blank()));
    }

    #[test]
    fn add_child_on_leaf_fails() {
        let err = margins().add_child(&p(&[1, 0])).unwrap_err();
        assert!(matches!(err, TreeError::NotAGroup { .. }));
    }

    #[test]
    fn expand_collapses_descendants() {
        let tree = margins().expand(&p(&[1]), true).unwrap();
        let PropertyNode::Pair(inner) = tree.node_at(&p(&[1, 1])).unwrap() else {
            panic!("expected pair");
        };
        assert!(!inner.expand);
        let PropertyNode::Pair(outer) = tree.node_at(&p(&[1])).unwrap() else {
            panic!("expected pair");
        };
        assert!(outer.expand);
    }

    #[test]
    fn expand_leaf_fails() {
        let err = margins().expand(&p(&[1, 0]), true).unwrap_err();
        assert!(matches!(err, TreeError::NotExpandable { .. }));
    }

    #[test]
    fn set_editable_moves_the_single_flag() {
        let tree = margins().set_editable(&p(&[0]), EditTarget::Node).unwrap();
        assert_eq!(tree.editable_count(), 1);

        let tree = tree.set_editable(&p(&[1, 0]), EditTarget::Value).unwrap();
        assert_eq!(tree.editable_count(), 1);
        assert!(matches!(tree.node_at(&p(&[1, 0])).unwrap(), PropertyNode::Leaf(l) if l.edit));
    }

    #[test]
    fn set_editable_value_of_group_fails() {
        let err = margins().set_editable(&p(&[1]), EditTarget::Value).unwrap_err();
        assert!(matches!(err, TreeError::NoScalarValue { .. }));
    }

    #[test]
    fn commit_edit_writes_and_clears() {
        let tree = margins()
            .set_editable(&p(&[0]), EditTarget::Value)
            .unwrap()
            .commit_edit(&p(&[0]), EditTarget::Value, "blue")
            .unwrap();
        assert_eq!(tree.editable_count(), 0);
        assert_eq!(tree.to_json()["color"], json!("blue"));

        let tree = tree.commit_edit(&p(&[0]), EditTarget::Node, "fill").unwrap();
        assert!(tree.to_json().contains_key("fill"));
    }

    #[test]
    fn clear_edits_resets_count() {
        let tree = margins().set_editable(&p(&[1, 1]), EditTarget::Node).unwrap();
        assert_eq!(tree.clear_edits().editable_count(), 0);
    }

    #[test]
    fn to_json_shapes() {
        assert_eq!(
            Value::Object(margins().to_json()),
            json!({"color": "red", "margin": ["1px", {"inner": ["2px"]}]})
        );
    }

    #[test]
    fn from_json_object_round_trips_to_json() {
        let object = margins().to_json();
        let rebuilt = PropertyTree::from_json_object(&object);
        assert_eq!(rebuilt.to_json(), object);
    }

    #[test]
    fn traverse_descends_into_groups() {
        assert_eq!(margins().traverse().count(), 5);
    }
}
