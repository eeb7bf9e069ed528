//! Adapt controller
//!
//! Owns the page state, applies [`AdaptAction`]s and persists the result
//! through a [`StateStore`] whenever the persisted projection changed.

use crate::action::{self, AdaptAction};
use crate::catalog::ComponentCatalog;
use crate::config::AdaptConfig;
use crate::error::{AdaptError, Result};
use crate::persistence::{FileStateStore, PersistenceError, StateStore};
use crate::state::{AdaptState, Element, SerializedState};
use adapt_form::{FieldConfig, FieldMap, FormEngine, FormOptions, Rule, Submission};
use adapt_tree::{outline, OutlineNode, TreePath};
use im::Vector;
use tracing::{debug, info, warn};

/// Element name field of the new-element form
pub const ELEMENT_FIELD: &str = "element";
/// "Inspect new element" checkbox of the new-element form
pub const INSPECT_FIELD: &str = "inspect";

/// Fields of the new-element form
///
/// The name must be non-empty and not used by any of `elements`.
#[must_use]
pub fn element_form_fields(elements: &Vector<Element>) -> FieldMap {
    let taken: Vec<String> = elements.iter().map(|element| element.name.clone()).collect();
    let unique = Rule::string()
        .required()
        .label("Element")
        .test("unique", "This name is already taken", move |value| {
            value
                .as_str()
                .map_or(true, |name| !taken.iter().any(|existing| existing == name))
        });

    let mut fields = FieldMap::new();
    fields.insert(
        ELEMENT_FIELD.to_owned(),
        FieldConfig::text()
            .with_label("Element")
            .required()
            .with_initial_value("")
            .with_validation(unique),
    );
    fields.insert(
        INSPECT_FIELD.to_owned(),
        FieldConfig::checkbox()
            .with_label("Inspect new element")
            .with_initial_value(true),
    );
    fields
}

/// Structural editor controller
#[derive(Debug)]
pub struct Adapt<S: StateStore> {
    store: S,
    config: AdaptConfig,
    catalog: ComponentCatalog,
    state: AdaptState,
}

impl Adapt<FileStateStore> {
    /// Controller over the JSON file named by `config.state_file`
    ///
    /// # Errors
    /// Returns [`AdaptError::Config`] without a state file, or the load
    /// error of the store.
    pub async fn open(config: AdaptConfig) -> Result<Self> {
        let path = config
            .state_file
            .clone()
            .ok_or_else(|| AdaptError::Config("state_file is not set".into()))?;
        Self::load(FileStateStore::new(path), config).await
    }
}

impl<S: StateStore> Adapt<S> {
    /// Load the saved state from `store`
    ///
    /// Nothing is written back. An empty store starts with the configured
    /// devtools position.
    ///
    /// # Errors
    /// Returns [`AdaptError::Config`] for invalid config and
    /// [`AdaptError::Persistence`] if loading fails.
    pub async fn load(store: S, config: AdaptConfig) -> Result<Self> {
        config.validate()?;
        let mut saved = store.load_state().await?;
        if saved == SerializedState::default() {
            saved.devtools_position = config.devtools_position;
        }
        info!(
            elements = saved.elements.len(),
            position = ?saved.devtools_position,
            "adapt state loaded"
        );
        Ok(Self {
            store,
            config,
            catalog: ComponentCatalog::standard(),
            state: AdaptState::from(saved),
        })
    }

    /// Replace the component catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: ComponentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &AdaptState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &AdaptConfig {
        &self.config
    }

    /// Apply `action`, saving if the persisted state changed
    ///
    /// Returns whether a save happened. On a failed save the new state is
    /// kept in memory and the error is returned.
    ///
    /// # Errors
    /// Returns reducer errors unchanged (state untouched) and
    /// [`AdaptError::Persistence`] for failed or rejected saves.
    pub async fn dispatch(&mut self, action: AdaptAction) -> Result<bool> {
        let kind = action.kind();
        let next = action::reduce(&self.state, action)?;
        let before = self.state.to_serialized();
        let after = next.to_serialized();
        self.state = next;

        if before == after {
            debug!(action = kind, "persisted state unchanged");
            return Ok(false);
        }
        if !self.config.save_on_change {
            debug!(action = kind, "saving disabled");
            return Ok(false);
        }
        self.save(kind, &after).await?;
        Ok(true)
    }

    async fn save(&self, kind: &str, state: &SerializedState) -> Result<()> {
        let text = serde_json::to_string(state).map_err(PersistenceError::from)?;
        match self.store.save_state(&text).await {
            Ok(reply) if reply.success => {
                info!(action = kind, bytes = text.len(), "adapt state saved");
                Ok(())
            }
            Ok(_) => {
                warn!(action = kind, "state save rejected");
                Err(PersistenceError::Rejected.into())
            }
            Err(e) => {
                warn!(action = kind, error = %e, "state save failed");
                Err(e.into())
            }
        }
    }

    /// Empty new-element form for the current elements
    ///
    /// The uniqueness check captures the element names at call time, so
    /// build a fresh form after elements change.
    #[must_use]
    pub fn element_form(&self) -> FormEngine {
        FormEngine::new(element_form_fields(&self.state.elements), FormOptions::new())
    }

    /// Append the element described by a new-element submission
    ///
    /// Returns the new element's index, which also becomes the element in
    /// view when `inspect` was checked.
    ///
    /// # Errors
    /// Returns [`AdaptError::DuplicateElement`] if the name is taken and
    /// [`AdaptError::Persistence`] if saving fails.
    pub async fn add_element(&mut self, submission: &Submission) -> Result<usize> {
        let name = submission.str(ELEMENT_FIELD).unwrap_or_default();
        if self.state.has_element(name) {
            warn!(element = name, "element name already taken");
            return Err(AdaptError::DuplicateElement(name.to_owned()));
        }
        let mut elements = self.state.elements.clone();
        elements.push_back(Element::new(name));
        let index = elements.len() - 1;

        self.dispatch(AdaptAction::SetElements(elements)).await?;
        if submission.is_set(INSPECT_FIELD) {
            self.dispatch(AdaptAction::ElementInView(Some(index))).await?;
        }
        info!(element = name, index, "element added");
        Ok(index)
    }

    /// Submit `form` and add the element on success
    ///
    /// The form is reset after a successful submit. Returns `None` when
    /// validation failed.
    ///
    /// # Errors
    /// Returns form and persistence errors.
    pub async fn submit_element(&mut self, form: &mut FormEngine) -> Result<Option<usize>> {
        let submitted = form
            .submit(|submission, resetter| {
                resetter.reset();
                submission
            })
            .await?;
        match submitted {
            Some(submission) => Ok(Some(self.add_element(&submission).await?)),
            None => Ok(None),
        }
    }

    /// Inspector form preselecting the configured default component
    ///
    /// # Errors
    /// Returns [`AdaptError::UnknownComponent`] if the default component is
    /// not in the catalog.
    pub fn component_form(&self) -> Result<FormEngine> {
        let fields = self.catalog.component_form_fields(&self.config.default_component)?;
        Ok(FormEngine::new(fields, FormOptions::new()))
    }

    /// Add the component from an inspector submission to the element in view
    ///
    /// `parent` addresses the node to insert under; the root path appends a
    /// top-level component.
    ///
    /// # Errors
    /// Returns [`AdaptError::NoElementInView`], [`AdaptError::UnknownComponent`],
    /// tree and persistence errors.
    pub async fn add_component(
        &mut self,
        submission: &Submission,
        parent: TreePath,
    ) -> Result<bool> {
        let element = self.state.element_in_view.ok_or(AdaptError::NoElementInView)?;
        let component = self.catalog.new_component(submission)?;
        debug!(element, component = %component.component, parent = %parent, "adding component");
        self.dispatch(AdaptAction::AddComponentToElement {
            element,
            component,
            parent,
        })
        .await
    }

    /// Outline of the element in view; empty when none is
    #[must_use]
    pub fn outline(&self) -> Vec<OutlineNode> {
        self.state
            .element_in_view()
            .map(|element| outline(&element.components))
            .unwrap_or_default()
    }
}
