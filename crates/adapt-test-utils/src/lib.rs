//! Testing utilities for the Adapt workspace
//!
//! Shared fixtures and tracing setup.

#![allow(missing_docs)]

use adapt_core::{AdaptConfig, DevtoolsPosition, Element, MemoryStateStore, SerializedState};
use adapt_form::{FieldConfig, FieldMap};
use adapt_tree::{ComponentNode, EditTarget, PropertyTree, TreePath, UserSelected};

/// Route `tracing` output to the test harness; safe to call repeatedly
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ordered field map from `(name, config)` pairs
pub fn field_map(fields: Vec<(&str, FieldConfig)>) -> FieldMap {
    fields
        .into_iter()
        .map(|(name, field)| (name.to_owned(), field))
        .collect()
}

/// `{"padding": ["4px", "8px"], "color": "red"}` as a property tree
pub fn sample_property_tree() -> PropertyTree {
    let root = TreePath::root();
    let padding = TreePath::from_indices(&[0]);
    let color = TreePath::from_indices(&[1]);

    PropertyTree::new()
        .add_child(&root)
        .and_then(|t| t.commit_edit(&padding, EditTarget::Node, "padding"))
        .and_then(|t| t.commit_edit(&padding, EditTarget::Value, "4px"))
        .and_then(|t| t.add_child(&padding))
        .and_then(|t| t.commit_edit(&padding.child(1), EditTarget::Value, "8px"))
        .and_then(|t| t.add_child(&root))
        .and_then(|t| t.commit_edit(&color, EditTarget::Node, "color"))
        .and_then(|t| t.commit_edit(&color, EditTarget::Value, "red"))
        .unwrap()
}

/// Selected `Table` with a background colour
pub fn table(background: &str) -> UserSelected {
    let mut props = serde_json::Map::new();
    props.insert("backgroundColor".into(), background.into());
    UserSelected {
        component: "Table".into(),
        props,
    }
}

/// Two elements, the first holding a `Table`
pub fn sample_state() -> SerializedState {
    let mut header = Element::new("Header");
    header.components.push_back(ComponentNode::adapt(table("red")));
    SerializedState {
        devtools_position: DevtoolsPosition::Right,
        elements: im::vector![header, Element::new("Footer")],
    }
}

/// Memory store preloaded with [`sample_state`]
pub fn memory_store() -> MemoryStateStore {
    MemoryStateStore::new(sample_state())
}

/// Default config with a state file under `dir`
pub fn file_config(dir: &std::path::Path) -> AdaptConfig {
    AdaptConfig::new().with_state_file(dir.join("adapt-state.json"))
}
