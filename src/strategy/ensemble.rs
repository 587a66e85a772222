//! Ensemble strategy: parallel fan-out plus weighted consensus voting.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::{Mode, ProcessingConfig};
use crate::result::ProcessingResult;
use crate::voter;

use super::{finish, gather_parallel};

/// The quality-maximizing mode: reuse Parallel's fan-out, then merge
/// through the ensemble voter instead of the plain deduplicator. Backends
/// that failed or timed out contribute nothing to the voting-weight
/// denominator; if every backend failed the voter short-circuits and the
/// call returns the empty floor.
pub(crate) async fn process(text: &str, config: &ProcessingConfig) -> ProcessingResult {
    let started = Instant::now();
    let gathered = gather_parallel(text, config).await;

    // Raw weights of the backends that ran to completion.
    let weights: HashMap<String, f64> = config
        .backends
        .iter()
        .filter(|h| gathered.raw.contains_key(&h.id))
        .map(|h| (h.id.clone(), h.weight))
        .collect();

    let total_extracted: usize = gathered.raw.values().map(Vec::len).sum();

    let mut descriptions = voter::vote(
        &gathered.raw,
        &weights,
        config.settings.consensus_threshold,
        &config.settings.clustering,
    );
    descriptions.retain(|d| d.confidence >= config.settings.min_confidence);

    finish(Mode::Ensemble, descriptions, total_extracted, gathered, started)
}
