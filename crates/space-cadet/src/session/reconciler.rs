//! View-state reconciliation
//!
//! The reconciler owns one persisted slot in a [`KeyValueStore`] and the
//! in-memory [`ViewState`] mirrored from it. Extraction only happens when
//! nothing has been persisted yet, or when a refresh is asked for.

use std::path::Path;

use tracing::{debug, error, info, span, warn, Level};

use crate::core::{
    ClassEntity, ExplorerConfig, ExplorerError, Extractor, KeyValueStore, Position, Result,
    ViewState,
};
use crate::plugins::typescript::TypeScriptExtractor;

/// Keeps the persisted view-state and the extracted classes in step
pub struct StateReconciler<S: KeyValueStore> {
    store: S,
    extractor: Box<dyn Extractor>,
    config: ExplorerConfig,
    state: ViewState,
}

impl<S: KeyValueStore> StateReconciler<S> {
    /// Create a reconciler with the default configuration
    pub fn new(store: S, extractor: impl Extractor + 'static) -> Self {
        Self::with_config(store, extractor, ExplorerConfig::default())
    }

    pub fn with_config(store: S, extractor: impl Extractor + 'static, config: ExplorerConfig) -> Self {
        Self {
            store,
            extractor: Box::new(extractor),
            config,
            state: ViewState::new(),
        }
    }

    /// Reconciler backed by the TypeScript extractor, sharing `config`
    pub fn typescript(store: S, config: ExplorerConfig) -> Self {
        let extractor = TypeScriptExtractor::with_config(config.clone());
        Self::with_config(store, extractor, config)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Read the persisted state, if any
    ///
    /// A value that no longer decodes is logged and treated as absent.
    pub fn load(&self) -> Result<Option<ViewState>> {
        let Some(value) = self.store.get(&self.config.state_key)? else {
            return Ok(None);
        };
        match serde_json::from_value::<ViewState>(value) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(key = %self.config.state_key, error = %e, "Ignoring undecodable persisted state");
                Ok(None)
            }
        }
    }

    fn load_or_log(&self) -> Option<ViewState> {
        self.load().unwrap_or_else(|e| {
            error!(error = %e, "Failed to read persisted state");
            None
        })
    }

    /// Adopt the persisted state, or extract a fresh one
    ///
    /// Never writes to the store. Extraction failures are logged and the
    /// current in-memory state is returned unchanged.
    pub fn ensure(&mut self, project_root: Option<&Path>) -> &ViewState {
        let ensure_span = span!(Level::INFO, "ensure_state");
        let _enter = ensure_span.enter();

        if let Some(state) = self.load_or_log() {
            debug!(classes = state.len(), placed = state.placed_count(), "Adopted persisted state");
            self.state = state;
            return &self.state;
        }

        let Some(root) = project_root else {
            debug!("No project root, keeping current state");
            return &self.state;
        };

        match self.extractor.extract(root) {
            Ok(entities) => {
                info!(classes = entities.len(), extractor = self.extractor.name(), "Extracted fresh state");
                self.state = ViewState::from(entities);
            }
            Err(e) => error!(root = %root.display(), error = %e, "Extraction failed"),
        }
        &self.state
    }

    /// Extract again, carrying positions over by `(name, path)`
    ///
    /// The merged state is written back when a persisted slot existed or any
    /// position survived. On extraction failure the previous state is kept.
    pub fn refresh(&mut self, project_root: &Path) -> &ViewState {
        let refresh_span = span!(Level::INFO, "refresh_state", root = %project_root.display());
        let _enter = refresh_span.enter();

        let persisted = self.load_or_log();
        let had_slot = persisted.is_some();
        let previous = persisted.unwrap_or_else(|| self.state.clone());

        match self.extractor.extract(project_root) {
            Ok(entities) => {
                let mut fresh = ViewState::from(entities);
                let carried = fresh.merge_positions(&previous);
                info!(classes = fresh.len(), carried, "Refreshed state");
                self.state = fresh;
                if had_slot || carried > 0 {
                    if let Err(e) = self.persist() {
                        error!(error = %e, "Failed to persist refreshed state");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Extraction failed, keeping previous state");
                self.state = previous;
            }
        }
        &self.state
    }

    /// Move the matching entity to `position` and persist the whole state
    ///
    /// Returns `false` without writing anything when no entity matches.
    pub fn apply_move(&mut self, path: &str, name: Option<&str>, position: Position) -> Result<bool> {
        match self
            .state
            .relocate(path, name, position, self.config.match_policy)
        {
            Ok(entity) => {
                debug!(name = entity.name(), path, %position, "Moved class");
            }
            Err(ExplorerError::ApplyMoveNoMatch { .. }) => {
                debug!(path, policy = %self.config.match_policy, "No class matches move");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
        self.persist()?;
        Ok(true)
    }

    /// Overwrite the persisted slot and the in-memory state with `state`
    pub fn save(&mut self, state: ViewState) -> Result<()> {
        let invalid = state
            .entities()
            .iter()
            .filter_map(ClassEntity::position)
            .find(|position| !position.is_finite());
        if let Some(position) = invalid {
            return Err(ExplorerError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        self.state = state;
        self.persist()
    }

    /// Clear the whole store and forget the in-memory state
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.state = ViewState::new();
        info!("Reset persisted state");
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let value = serde_json::to_value(&self.state)?;
        self.store.set(&self.config.state_key, value)?;
        debug!(classes = self.state.len(), placed = self.state.placed_count(), "Persisted state");
        Ok(())
    }
}
