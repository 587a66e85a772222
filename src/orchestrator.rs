//! The orchestrator: entry point, builder, and call statistics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{Mode, ProcessingConfig, Settings, SettingsProvider};
use crate::error::Result;
use crate::registry::{BackendHandle, BackendRegistry};
use crate::result::ProcessingResult;
use crate::strategy;
use crate::Extractor;

/// Lightweight bookkeeping across the orchestrator's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    /// Total `process` calls.
    pub calls: usize,
    /// Calls per effective mode label.
    pub calls_per_mode: HashMap<String, usize>,
    /// Total descriptions returned across all calls.
    pub descriptions_returned: usize,
    /// Cumulative wall-clock processing time.
    pub total_elapsed: Duration,
}

impl OrchestratorStats {
    fn record(&mut self, result: &ProcessingResult) {
        self.calls += 1;
        *self
            .calls_per_mode
            .entry(result.mode.as_label().to_string())
            .or_insert(0) += 1;
        self.descriptions_returned += result.descriptions.len();
        self.total_elapsed += result.elapsed;
    }
}

/// Coordinates a set of registered backends under a configurable strategy.
///
/// The orchestrator is `Send + Sync` and intended to be shared behind an
/// `Arc`; `process` takes `&self` and any number of calls may run
/// concurrently with each other and with reconfiguration. Each call works
/// from snapshots taken at its start, so reconfiguration never affects a
/// call already in flight.
///
/// # Examples
///
/// ```
/// use limn::{Description, DescriptionKind, MockExtractor, Mode, Orchestrator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> limn::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .backend(
///         "mock",
///         1.0,
///         MockExtractor::new("mock").with_descriptions(vec![Description::new(
///             "the dark castle loomed over the valley",
///             DescriptionKind::Location,
///             0.9,
///             0,
///         )]),
///     )?
///     .mode(Mode::Single)
///     .build();
///
/// let result = orchestrator.process("chapter text", "ch-1", None).await?;
/// assert_eq!(result.descriptions.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    registry: BackendRegistry,
    settings: SettingsProvider,
    default_mode: Mode,
    stats: Mutex<OrchestratorStats>,
}

impl Orchestrator {
    /// Start building an orchestrator.
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Process one chapter text.
    ///
    /// Snapshots the registry and settings, builds an immutable per-call
    /// config, and dispatches to the strategy for the effective mode
    /// (`mode_override` if given, the configured default otherwise).
    /// Individual backend failures and timeouts never surface as errors;
    /// they are reported through `failed_backends` on the result. A call
    /// with zero active backends returns the empty result rather than
    /// erroring.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) only for
    /// configuration problems surfaced before any backend runs.
    pub async fn process(
        &self,
        text: &str,
        chapter_id: &str,
        mode_override: Option<Mode>,
    ) -> Result<ProcessingResult> {
        let mode = mode_override.unwrap_or(self.default_mode);
        let config = ProcessingConfig::new(mode, self.registry.get_active(), self.settings.snapshot());

        log::debug!(
            "processing chapter '{chapter_id}': mode={mode} backends={}",
            config.backends.len()
        );

        let result = if config.backends.is_empty() {
            ProcessingResult::empty(mode)
        } else {
            match mode {
                Mode::Single => strategy::single::process(text, &config).await,
                Mode::Parallel => strategy::parallel::process(text, &config).await,
                Mode::Sequential => strategy::sequential::process(text, &config).await,
                Mode::Ensemble => strategy::ensemble::process(text, &config).await,
                Mode::Adaptive => strategy::adaptive::process(text, &config).await,
            }
        };

        if result.is_degraded() {
            log::warn!(
                "chapter '{chapter_id}' processed degraded: {} backend(s) failed",
                result.failed_backends.len()
            );
        }

        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(&result);
        Ok(result)
    }

    /// Update a backend's voting weight for future calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for an unknown id or
    /// a non-positive weight.
    pub fn set_backend_weight(&self, id: &str, weight: f64) -> Result<()> {
        self.registry.set_weight(id, weight)
    }

    /// Enable or disable a backend for future calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for an unknown id.
    pub fn set_backend_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        self.registry.set_enabled(id, enabled)
    }

    /// Update consensus and confidence thresholds for future calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if either is outside
    /// [0.0, 1.0].
    pub fn set_thresholds(&self, consensus: f64, min_confidence: f64) -> Result<()> {
        self.settings.set_thresholds(consensus, min_confidence)
    }

    /// Replace the tunable settings wholesale for future calls.
    pub fn set_settings(&self, settings: Settings) {
        self.settings.replace(settings);
    }

    /// All registered backend handles, including disabled ones.
    #[must_use]
    pub fn backends(&self) -> Vec<BackendHandle> {
        self.registry.get_all()
    }

    /// Cumulative call statistics.
    #[must_use]
    pub fn stats(&self) -> OrchestratorStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("default_mode", &self.default_mode)
            .field("backends", &self.registry.len())
            .finish()
    }
}

/// Builder for [`Orchestrator`].
#[derive(Debug)]
pub struct OrchestratorBuilder {
    registry: BackendRegistry,
    settings: Settings,
    default_mode: Mode,
}

impl OrchestratorBuilder {
    fn new() -> Self {
        Self {
            registry: BackendRegistry::new(),
            settings: Settings::default(),
            default_mode: Mode::Adaptive,
        }
    }

    /// Register a backend with a unique id and a positive voting weight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for a duplicate id
    /// or a non-positive weight.
    pub fn backend(
        self,
        id: impl Into<String>,
        weight: f64,
        extractor: impl Extractor + 'static,
    ) -> Result<Self> {
        self.registry
            .register(BackendHandle::new(id, weight, extractor))?;
        Ok(self)
    }

    /// Register a backend around an already-shared extractor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for a duplicate id
    /// or a non-positive weight.
    pub fn backend_arc(
        self,
        id: impl Into<String>,
        weight: f64,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self> {
        self.registry
            .register(BackendHandle::from_arc(id, weight, extractor))?;
        Ok(self)
    }

    /// Set the default mode used when `process` gets no override.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Set the initial tunable settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Orchestrator {
        Orchestrator {
            registry: self.registry,
            settings: SettingsProvider::new(self.settings),
            default_mode: self.default_mode,
            stats: Mutex::new(OrchestratorStats::default()),
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
