//! Adapt Tree
//!
//! Path-addressed, copy-on-write trees shared by the page builder.
//!
//! # Core Concepts
//!
//! - [`TreePath`]: positional address of a node, `[[level, index], ...]`
//! - [`Branch`]: the one trait a node type implements to get lookup,
//!   mutation and traversal
//! - [`PropertyTree`]: key/value forest edited by the JSON property editor
//! - [`ComponentNode`]: component tree of a page element
//!
//! Every mutation returns a new root. Nodes off the root-to-target spine are
//! shared with the previous snapshot through `im::Vector`.
//!
//! # Example
//!
//! ```rust,ignore
//! use adapt_tree::{PropertyTree, TreePath, EditTarget};
//!
//! let tree = PropertyTree::new().add_child(&TreePath::root())?;
//! let tree = tree.set_editable(&TreePath::from_indices(&[0]), EditTarget::Node)?;
//! let tree = tree.commit_edit(&TreePath::from_indices(&[0]), EditTarget::Node, "color")?;
//! assert!(tree.to_json().contains_key("color"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod component;
mod node;
mod path;
mod property;
mod traverse;

pub use component::{
    insert_child, outline, selected_paths, ComponentNode, ComponentProps, OutlineNode,
    UserSelected, ADAPT_COMPONENT,
};
pub use node::{for_each_mut, mutate_at, node_at, Branch, TreeError};
pub use path::{PathError, Step, TreePath};
pub use property::{EditTarget, Pair, PropertyNode, PropertyTree, PropertyValue, ScalarLeaf};
pub use traverse::{traverse, traverse_with_paths, Traverse, TraverseWithPaths};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
