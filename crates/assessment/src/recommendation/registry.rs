use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::models::{ModelError, ModelHandle};

/// Error raised by registry lookups and scoring.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("model `{0}` is not registered")]
    UnknownModel(String),
    #[error("no model is active")]
    NoActiveModel,
    #[error("model `{model}` failed: {source}")]
    Model {
        model: String,
        #[source]
        source: ModelError,
    },
}

#[derive(Default)]
struct RegistryState {
    models: BTreeMap<String, ModelHandle>,
    active: Option<String>,
}

/// Named model handles with exactly one active entry once anything is registered.
///
/// Cloning shares the same underlying state. All mutation happens under the
/// write lock, so readers observe either the previous or the next active model.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        // Writers only swap whole values, so a poisoned guard still holds consistent state.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a model. The first model registered becomes active;
    /// returns whether this call activated `name`.
    pub fn register(&self, name: impl Into<String>, handle: ModelHandle) -> bool {
        let name = name.into();
        let mut state = self.write();
        let kind = handle.kind();
        let replaced = state.models.insert(name.clone(), handle).is_some();
        let activated = state.active.is_none();
        if activated {
            state.active = Some(name.clone());
        }
        drop(state);

        info!(model = %name, kind, replaced, activated, "model registered");
        activated
    }

    /// Makes `name` the active model. Unknown names leave the current model in place.
    pub fn activate(&self, name: &str) -> Result<(), RegistryError> {
        let mut state = self.write();
        if !state.models.contains_key(name) {
            let current = state.active.clone();
            drop(state);
            warn!(requested = name, active = ?current, "rejected activation of unknown model");
            return Err(RegistryError::UnknownModel(name.to_string()));
        }
        let previous = state.active.replace(name.to_string());
        drop(state);

        info!(model = name, previous = ?previous, "active model switched");
        Ok(())
    }

    pub fn active_name(&self) -> Option<String> {
        self.read().active.clone()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.read().models.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().models.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.read().models.is_empty()
    }

    /// Resolves a registered model by name without touching the active entry.
    pub fn get(&self, name: &str) -> Result<ActiveModel, RegistryError> {
        let state = self.read();
        let handle = state
            .models
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownModel(name.to_string()))?;
        Ok(ActiveModel {
            name: name.to_string(),
            handle,
        })
    }

    /// Snapshot of the active model. The snapshot keeps serving even if the
    /// registry switches models afterwards.
    pub fn active(&self) -> Result<ActiveModel, RegistryError> {
        let state = self.read();
        let name = state.active.as_deref().ok_or(RegistryError::NoActiveModel)?;
        let handle = state
            .models
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownModel(name.to_string()))?;
        Ok(ActiveModel {
            name: name.to_string(),
            handle,
        })
    }

    /// Scores `rows` with the model active at call entry.
    pub fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, RegistryError> {
        self.active()?.score(rows)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("ModelRegistry")
            .field("models", &state.models.keys().collect::<Vec<_>>())
            .field("active", &state.active)
            .finish()
    }
}

/// A model pinned for the duration of one request.
#[derive(Debug, Clone)]
pub struct ActiveModel {
    name: String,
    handle: ModelHandle,
}

impl ActiveModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &'static str {
        self.handle.kind()
    }

    /// Delegates to the backend and checks it returned one finite score per row.
    pub fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, RegistryError> {
        let scores = self.handle.score(rows).map_err(|source| self.failure(source))?;
        if scores.len() != rows.len() {
            return Err(self.failure(ModelError::OutputLength {
                expected: rows.len(),
                found: scores.len(),
            }));
        }
        if let Some(row) = scores.iter().position(|score| !score.is_finite()) {
            return Err(self.failure(ModelError::NonFiniteScore { row }));
        }
        Ok(scores)
    }

    fn failure(&self, source: ModelError) -> RegistryError {
        RegistryError::Model {
            model: self.name.clone(),
            source,
        }
    }
}
