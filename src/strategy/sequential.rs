//! Sequential strategy: serialized fan-out with optional early stop.

use std::time::Instant;

use crate::config::{Mode, ProcessingConfig};
use crate::result::ProcessingResult;

use super::{finish_deduplicated, gather_sequential};

/// Invoke backends one at a time in descending weight order. Behaves like
/// Parallel but serialized; with `min_descriptions > 0` it stops invoking
/// further backends once enough candidates have been collected, trading
/// recall for latency. Same partial-failure tolerance as Parallel.
pub(crate) async fn process(text: &str, config: &ProcessingConfig) -> ProcessingResult {
    let started = Instant::now();
    let gathered = gather_sequential(text, config).await;
    finish_deduplicated(Mode::Sequential, gathered, config, started)
}
