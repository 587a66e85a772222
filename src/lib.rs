//! # limn
//!
//! Multi-backend ensemble extraction of descriptive passages from chapter
//! text: Location, Character, Atmosphere, Object, and Action descriptions.
//!
//! - **Backends**: opaque [`Extractor`] implementations registered with an
//!   id and a voting weight
//! - **Strategies**: Single, Parallel, Sequential, Ensemble (weighted
//!   consensus voting), and Adaptive (feature-driven selection)
//! - **Resilience**: per-backend timeouts, failure isolation, and a valid
//!   empty result when every backend fails
//!
//! The [`Orchestrator`] is the single entry point:
//!
//! ```
//! use limn::{Description, DescriptionKind, MockExtractor, Mode, Orchestrator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> limn::Result<()> {
//! let orchestrator = Orchestrator::builder()
//!     .backend(
//!         "spatial",
//!         1.5,
//!         MockExtractor::new("spatial").with_descriptions(vec![Description::new(
//!             "the dark castle loomed over the valley",
//!             DescriptionKind::Location,
//!             0.9,
//!             0,
//!         )]),
//!     )?
//!     .mode(Mode::Adaptive)
//!     .build();
//!
//! let result = orchestrator.process("The dark castle loomed...", "ch-1", None).await?;
//! for d in &result.descriptions {
//!     println!("[{}] {} ({:.2})", d.kind, d.content, d.confidence);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dedup;
pub mod description;
pub mod error;
pub mod features;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod similarity;
pub mod strategy;
pub mod voter;

pub use config::{ClusterParams, Mode, Settings, SettingsProvider};
pub use description::{Description, DescriptionKind};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorStats};
pub use registry::{BackendHandle, BackendRegistry};
pub use result::{ProcessingResult, QualityMetrics};

/// A text-analysis backend capable of extracting descriptive passages.
///
/// Implementations are opaque to the orchestrator: it sees only this
/// interface, never how a backend works internally. `extract` is a
/// *blocking* call; the orchestrator runs it on a blocking worker thread
/// with a per-invocation timeout, so implementations are free to do
/// CPU-heavy or synchronous-IO work directly.
///
/// Returned candidates need not be perfectly groomed: the orchestrator
/// stamps `source`, clamps `confidence`, recomputes `char_length` and
/// `priority`, and drops blank content before any candidate enters a
/// pipeline.
pub trait Extractor: Send + Sync {
    /// Extract descriptive passages from the text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extraction`] (or any other variant) when the
    /// backend cannot produce output. The orchestrator recovers the
    /// failure locally; it is reported, never propagated.
    fn extract(&self, text: &str) -> Result<Vec<Description>>;

    /// Stable human-readable name, used in logs.
    fn name(&self) -> &str;

    /// The description kinds this backend is good at. The adaptive
    /// selector uses this to route texts; it is advisory, not a filter.
    fn supported_kinds(&self) -> Vec<DescriptionKind>;

    /// Whether the backend is currently able to serve calls.
    fn is_available(&self) -> bool {
        true
    }
}

/// A configurable in-memory extractor for tests and examples.
///
/// Returns a fixed candidate list, optionally after a delay (to exercise
/// timeout paths) or as a fixed error (to exercise failure isolation).
#[derive(Debug, Clone)]
pub struct MockExtractor {
    name: String,
    descriptions: Vec<Description>,
    kinds: Vec<DescriptionKind>,
    error: Option<String>,
    delay: Option<std::time::Duration>,
    available: bool,
}

impl MockExtractor {
    /// Create a mock that returns nothing.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptions: Vec::new(),
            kinds: DescriptionKind::ALL.to_vec(),
            error: None,
            delay: None,
            available: true,
        }
    }

    /// Set the candidates returned on extraction.
    #[must_use]
    pub fn with_descriptions(mut self, descriptions: Vec<Description>) -> Self {
        self.descriptions = descriptions;
        self
    }

    /// Advertise a specific set of supported kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<DescriptionKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Make every extraction fail with the given message.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Sleep for the given duration before returning. Combine with a short
    /// per-backend timeout to exercise the timeout path.
    #[must_use]
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report the backend as unavailable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, _text: &str) -> Result<Vec<Description>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = &self.error {
            return Err(Error::extraction(message.clone()));
        }
        Ok(self.descriptions.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supported_kinds(&self) -> Vec<DescriptionKind> {
        self.kinds.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// Commonly used types, importable in one line.
///
/// ```
/// use limn::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ClusterParams, Mode, Settings};
    pub use crate::description::{Description, DescriptionKind};
    pub use crate::error::{Error, Result};
    pub use crate::orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorStats};
    pub use crate::registry::BackendHandle;
    pub use crate::result::{ProcessingResult, QualityMetrics};
    pub use crate::{Extractor, MockExtractor};
}
