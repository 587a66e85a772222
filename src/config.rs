//! Processing modes, tunable settings, and per-call configuration.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::BackendHandle;

/// Processing strategy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Invoke exactly one backend. Fastest, lowest recall.
    Single,
    /// Fan out to all active backends concurrently.
    Parallel,
    /// Invoke backends one at a time in descending weight order.
    Sequential,
    /// Parallel fan-out followed by weighted consensus voting.
    Ensemble,
    /// Inspect text features to pick one of the other modes.
    Adaptive,
}

impl Mode {
    /// Convert to a stable label string.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Mode::Single => "single",
            Mode::Parallel => "parallel",
            Mode::Sequential => "sequential",
            Mode::Ensemble => "ensemble",
            Mode::Adaptive => "adaptive",
        }
    }

    /// Parse from a label string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown label.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_lowercase().as_str() {
            "single" => Ok(Mode::Single),
            "parallel" => Ok(Mode::Parallel),
            "sequential" => Ok(Mode::Sequential),
            "ensemble" => Ok(Mode::Ensemble),
            "adaptive" => Ok(Mode::Adaptive),
            other => Err(Error::config(format!("unknown mode '{other}'"))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Similarity-clustering parameters.
///
/// These are tuning knobs, not invariants: the defaults work for prose
/// chapters but should be validated per corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Minimum span overlap ratio for two candidates to cluster.
    pub position_overlap: f64,
    /// Minimum token-set similarity for two candidates to cluster.
    pub token_similarity: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            position_overlap: 0.5,
            token_similarity: 0.7,
        }
    }
}

/// Tunable orchestrator settings.
///
/// Updated through [`SettingsProvider`]; calls in flight keep the snapshot
/// they started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum weighted consensus for an ensemble cluster to survive.
    pub consensus_threshold: f64,
    /// Minimum confidence for a candidate to survive filtering.
    pub min_confidence: f64,
    /// Timeout applied to each backend invocation individually.
    pub per_backend_timeout: Duration,
    /// Sequential early-stop: stop invoking further backends once this many
    /// descriptions have been collected. 0 disables early stopping.
    pub min_descriptions: usize,
    /// Similarity-clustering parameters for the ensemble voter.
    pub clustering: ClusterParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            consensus_threshold: 0.6,
            min_confidence: 0.5,
            per_backend_timeout: Duration::from_secs(10),
            min_descriptions: 0,
            clustering: ClusterParams::default(),
        }
    }
}

/// Thread-safe settings holder with atomic-swap snapshots.
///
/// Readers take an `Arc<Settings>` and can never observe a half-applied
/// update; writers build a new `Settings` and swap it in whole.
#[derive(Debug)]
pub struct SettingsProvider {
    inner: RwLock<Arc<Settings>>,
}

impl SettingsProvider {
    /// Create a provider with the given initial settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(Arc::new(settings)),
        }
    }

    /// Take a consistent snapshot of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.inner.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Replace the settings wholesale.
    pub fn replace(&self, settings: Settings) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(settings);
    }

    /// Update consensus and confidence thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either value is outside [0.0, 1.0].
    pub fn set_thresholds(&self, consensus: f64, min_confidence: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&consensus) {
            return Err(Error::config(format!(
                "consensus_threshold {consensus} outside [0, 1]"
            )));
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(Error::config(format!(
                "min_confidence {min_confidence} outside [0, 1]"
            )));
        }

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut next = (**guard).clone();
        next.consensus_threshold = consensus;
        next.min_confidence = min_confidence;
        *guard = Arc::new(next);
        Ok(())
    }
}

impl Default for SettingsProvider {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Immutable per-call configuration.
///
/// Built once at the start of a `process()` call from the registry and
/// settings snapshots; concurrent reconfiguration cannot affect it.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Strategy mode for this call.
    pub mode: Mode,
    /// Active backend handles, sorted by weight descending then id
    /// ascending. Single takes the first; Sequential walks the order.
    pub backends: Vec<BackendHandle>,
    /// Settings snapshot for this call.
    pub settings: Arc<Settings>,
}

impl ProcessingConfig {
    /// Build a per-call config from snapshots.
    ///
    /// Sorts the handle list so every strategy sees the same deterministic
    /// order regardless of registry insertion order.
    #[must_use]
    pub fn new(mode: Mode, mut backends: Vec<BackendHandle>, settings: Arc<Settings>) -> Self {
        backends.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self {
            mode,
            backends,
            settings,
        }
    }

    /// Restrict to a subset of backend ids, preserving order.
    #[must_use]
    pub fn restricted_to(&self, ids: &[String]) -> Self {
        let backends = self
            .backends
            .iter()
            .filter(|h| ids.contains(&h.id))
            .cloned()
            .collect();
        Self {
            mode: self.mode,
            backends,
            settings: Arc::clone(&self.settings),
        }
    }

    /// Same config under a different mode.
    #[must_use]
    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            backends: self.backends.clone(),
            settings: Arc::clone(&self.settings),
        }
    }

    /// Total weight of the configured backends.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.backends.iter().map(|h| h.weight).sum()
    }
}
