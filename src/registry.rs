//! Backend handles and the registry that owns them.

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::Extractor;

/// One configured backend: an opaque extraction capability plus the weight
/// and enablement state the orchestrator manages for it.
#[derive(Clone)]
pub struct BackendHandle {
    /// Unique backend id.
    pub id: String,
    /// Voting weight, always > 0.
    pub weight: f64,
    /// Disabled handles are excluded from new calls; in-flight calls keep
    /// the snapshot they started with.
    pub enabled: bool,
    /// The extraction capability itself.
    pub extractor: Arc<dyn Extractor>,
}

impl BackendHandle {
    /// Create an enabled handle with the given weight.
    pub fn new(id: impl Into<String>, weight: f64, extractor: impl Extractor + 'static) -> Self {
        Self {
            id: id.into(),
            weight,
            enabled: true,
            extractor: Arc::new(extractor),
        }
    }

    /// Create a handle around an already-shared extractor.
    pub fn from_arc(id: impl Into<String>, weight: f64, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            id: id.into(),
            weight,
            enabled: true,
            extractor,
        }
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .field("enabled", &self.enabled)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

/// Registry of configured backends.
///
/// Handles are created at orchestrator initialization and never removed,
/// only disabled. Reads clone handles, so a call that snapshotted the
/// registry is unaffected by later reconfiguration.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    handles: RwLock<Vec<BackendHandle>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a duplicate id or a weight <= 0.
    pub fn register(&self, handle: BackendHandle) -> Result<()> {
        if handle.weight <= 0.0 || !handle.weight.is_finite() {
            return Err(Error::config(format!(
                "backend '{}' weight must be > 0, got {}",
                handle.id, handle.weight
            )));
        }

        let mut handles = self.write();
        if handles.iter().any(|h| h.id == handle.id) {
            return Err(Error::config(format!(
                "backend '{}' already registered",
                handle.id
            )));
        }
        handles.push(handle);
        Ok(())
    }

    /// Snapshot the enabled, available handles. Never returns a handle
    /// with weight <= 0.
    #[must_use]
    pub fn get_active(&self) -> Vec<BackendHandle> {
        self.read()
            .iter()
            .filter(|h| h.enabled && h.weight > 0.0 && h.extractor.is_available())
            .cloned()
            .collect()
    }

    /// Snapshot all handles, enabled or not.
    #[must_use]
    pub fn get_all(&self) -> Vec<BackendHandle> {
        self.read().clone()
    }

    /// Enable or disable a backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown id.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let mut handles = self.write();
        let handle = handles
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| Error::config(format!("unknown backend '{id}'")))?;
        handle.enabled = enabled;
        log::debug!("backend '{id}' enabled={enabled}");
        Ok(())
    }

    /// Update a backend's weight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown id or a weight <= 0.
    pub fn set_weight(&self, id: &str, weight: f64) -> Result<()> {
        if weight <= 0.0 || !weight.is_finite() {
            return Err(Error::config(format!(
                "backend '{id}' weight must be > 0, got {weight}"
            )));
        }

        let mut handles = self.write();
        let handle = handles
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| Error::config(format!("unknown backend '{id}'")))?;
        handle.weight = weight;
        log::debug!("backend '{id}' weight={weight}");
        Ok(())
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True if no backends are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<BackendHandle>> {
        self.handles.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<BackendHandle>> {
        self.handles.write().unwrap_or_else(|e| e.into_inner())
    }
}
