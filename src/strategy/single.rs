//! Single-backend strategy: fastest, lowest recall.

use std::time::Instant;

use crate::config::{Mode, ProcessingConfig};
use crate::result::ProcessingResult;

use super::{finish_deduplicated, invoke, record, Gathered};

/// Invoke exactly one backend: the first of the config snapshot, which is
/// the highest-weight active backend. On backend failure the call returns
/// an empty result with the backend listed in `failed_backends` rather
/// than raising, so pipelines proceed with zero descriptions.
pub(crate) async fn process(text: &str, config: &ProcessingConfig) -> ProcessingResult {
    let started = Instant::now();
    let mut gathered = Gathered::default();

    if let Some(handle) = config.backends.first() {
        let outcome = invoke(handle, text, config.settings.per_backend_timeout).await;
        record(&mut gathered, handle, outcome);
    }

    finish_deduplicated(Mode::Single, gathered, config, started)
}
