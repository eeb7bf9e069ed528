//! Adapt Core
//!
//! Page-builder controller on top of `adapt-tree` and `adapt-form`.
//!
//! # Core Concepts
//!
//! - [`AdaptState`]: elements, their component trees and the docked
//!   devtools position
//! - [`AdaptAction`] / [`reduce`]: pure state transitions
//! - [`Adapt`]: applies actions and saves through a [`StateStore`] when the
//!   persisted part of the state changed
//! - [`ComponentCatalog`]: the components a user can add and their
//!   inspector fields
//!
//! # Example
//!
//! ```rust,ignore
//! use adapt_core::prelude::*;
//!
//! let config = AdaptConfig::new().with_state_file("adapt.json");
//! adapt_core::logging::init(&config)?;
//!
//! let mut adapt = Adapt::open(config).await?;
//! let mut form = adapt.element_form();
//! form.set_field_value("element", "Header")?;
//! adapt.submit_element(&mut form).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod action;
mod catalog;
mod config;
mod editor;
mod error;
pub mod logging;
mod persistence;
mod state;

pub use action::{reduce, AdaptAction};
pub use catalog::{CatalogEntry, ComponentCatalog, COMPONENT_FIELD};
pub use config::{AdaptConfig, LogFormat};
pub use editor::{element_form_fields, Adapt, ELEMENT_FIELD, INSPECT_FIELD};
pub use error::{AdaptError, Result};
pub use persistence::{FileStateStore, MemoryStateStore, PersistenceError, SaveResponse, StateStore};
pub use state::{AdaptState, DevtoolsPosition, Element, SerializedState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Adapt, AdaptAction, AdaptConfig, AdaptError, AdaptState, ComponentCatalog, DevtoolsPosition,
        Element, FileStateStore, MemoryStateStore, StateStore,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use adapt_form::ChangeEvent;
    use adapt_tree::{PropertyTree, TreePath};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn build_a_page() {
        let mut adapt = Adapt::load(MemoryStateStore::default(), AdaptConfig::default())
            .await
            .unwrap();

        let mut form = adapt.element_form();
        form.set_field_value(ELEMENT_FIELD, "Header").unwrap();
        let index = adapt.submit_element(&mut form).await.unwrap();
        assert_eq!(index, Some(0));

        let mut inspector = adapt.component_form().unwrap();
        inspector
            .change(COMPONENT_FIELD, ChangeEvent::Choose("Table".into()))
            .unwrap();
        assert!(adapt.catalog().refresh_form(&mut inspector).unwrap());
        inspector.set_field_value("backgroundColor", "navy").unwrap();
        let submission = inspector.submit(|s, _| s).await.unwrap().unwrap();
        assert!(adapt.add_component(&submission, TreePath::root()).await.unwrap());

        let mut inspector = adapt.component_form().unwrap();
        let sx = PropertyTree::new().add_child(&TreePath::root()).unwrap();
        let sx = sx
            .commit_edit(&TreePath::from_indices(&[0]), adapt_tree::EditTarget::Node, "margin")
            .unwrap()
            .commit_edit(&TreePath::from_indices(&[0]), adapt_tree::EditTarget::Value, "2px")
            .unwrap();
        inspector.change("sx", ChangeEvent::Tree(sx)).unwrap();
        let submission = inspector.submit(|s, _| s).await.unwrap().unwrap();
        assert!(adapt
            .add_component(&submission, TreePath::from_indices(&[0]))
            .await
            .unwrap());

        let outline = adapt.outline();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].title.as_deref(), Some("Table"));
        assert_eq!(outline[0].children[0].title.as_deref(), Some("Box"));
        assert_eq!(outline[0].children[0].key, "[[0,0],[1,0]]");

        let saved: serde_json::Value =
            serde_json::from_str(&adapt.store().last_save().unwrap()).unwrap();
        assert_eq!(
            saved["elements"][0]["components"][0]["props"]["userSelected"],
            json!({"Component": "Table", "props": {"backgroundColor": "navy"}})
        );
        let table = &saved["elements"][0]["components"][0]["props"];
        assert_eq!(
            table["children"][0]["props"]["userSelected"]["props"],
            json!({"sx": {"margin": "2px"}})
        );
        assert_eq!(adapt.store().save_count(), 3);
    }
}
