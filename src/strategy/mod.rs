//! Processing strategies and their shared backend fan-out plumbing.
//!
//! All five strategies share the same contract: given the chapter text and
//! an immutable per-call config, produce a [`ProcessingResult`] without ever
//! raising for backend failure. Ensemble composes Parallel's fan-out with
//! the voter; Adaptive composes the selector with one of the other modes.

pub mod adaptive;
pub mod ensemble;
pub mod parallel;
pub mod sequential;
pub mod single;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Mode, ProcessingConfig};
use crate::dedup::deduplicate;
use crate::description::Description;
use crate::error::Error;
use crate::registry::BackendHandle;
use crate::result::{recommendations, ProcessingResult, QualityMetrics};

/// Per-backend outcomes collected by a fan-out.
#[derive(Debug, Default)]
pub(crate) struct Gathered {
    /// Raw output per succeeding backend (empty output still counts as a
    /// success and participates in voting-weight normalization).
    pub raw: HashMap<String, Vec<Description>>,
    /// Succeeding backend ids, in config order.
    pub used: Vec<String>,
    /// Failing backend ids, in config order.
    pub failed: Vec<String>,
}

/// Invoke one backend with its own timeout.
///
/// The blocking `extract` runs on the blocking pool; on timeout the join
/// handle is dropped, detaching the task, and any partial output is
/// discarded. Returned candidates are sanitized: source stamped, confidence
/// clamped, char length recomputed, empty content dropped.
pub(crate) async fn invoke(
    handle: &BackendHandle,
    text: &str,
    timeout: Duration,
) -> Result<Vec<Description>, Error> {
    let extractor = Arc::clone(&handle.extractor);
    let owned = text.to_string();
    let task = tokio::task::spawn_blocking(move || extractor.extract(&owned));

    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(Error::timeout(format!(
            "backend '{}' exceeded {:?}",
            handle.id, timeout
        ))),
        Ok(Err(join_err)) => Err(Error::backend(format!(
            "backend '{}' panicked: {join_err}",
            handle.id
        ))),
        Ok(Ok(Err(e))) => Err(Error::backend(format!("backend '{}': {e}", handle.id))),
        Ok(Ok(Ok(descs))) => Ok(sanitize(descs, &handle.id)),
    }
}

fn sanitize(descs: Vec<Description>, backend_id: &str) -> Vec<Description> {
    descs
        .into_iter()
        .filter(|d| !d.content.trim().is_empty())
        .map(|mut d| {
            d.source = backend_id.to_string();
            d.confidence = d.confidence.clamp(0.0, 1.0);
            d.char_length = d.content.chars().count();
            d.priority = d.kind.base_priority();
            d
        })
        .collect()
}

/// Fan out to every configured backend concurrently and collect whatever
/// completes within its own timeout.
pub(crate) async fn gather_parallel(text: &str, config: &ProcessingConfig) -> Gathered {
    let timeout = config.settings.per_backend_timeout;
    let outcomes = futures::future::join_all(
        config
            .backends
            .iter()
            .map(|handle| invoke(handle, text, timeout)),
    )
    .await;

    let mut gathered = Gathered::default();
    for (handle, outcome) in config.backends.iter().zip(outcomes) {
        record(&mut gathered, handle, outcome);
    }
    gathered
}

/// Invoke backends one at a time in config (descending weight) order,
/// optionally stopping early once `min_descriptions` have been collected.
pub(crate) async fn gather_sequential(text: &str, config: &ProcessingConfig) -> Gathered {
    let timeout = config.settings.per_backend_timeout;
    let early_stop = config.settings.min_descriptions;

    let mut gathered = Gathered::default();
    let mut collected = 0;

    for handle in &config.backends {
        let outcome = invoke(handle, text, timeout).await;
        if let Ok(descs) = &outcome {
            collected += descs.len();
        }
        record(&mut gathered, handle, outcome);

        if early_stop > 0 && collected >= early_stop {
            log::debug!(
                "sequential early stop after '{}' ({collected} >= {early_stop})",
                handle.id
            );
            break;
        }
    }
    gathered
}

fn record(gathered: &mut Gathered, handle: &BackendHandle, outcome: Result<Vec<Description>, Error>) {
    match outcome {
        Ok(descs) => {
            gathered.used.push(handle.id.clone());
            gathered.raw.insert(handle.id.clone(), descs);
        }
        Err(e) => {
            log::warn!("backend '{}' excluded from call: {e}", handle.id);
            gathered.failed.push(handle.id.clone());
        }
    }
}

/// Final ranking shared by every strategy: priority descending, position
/// ascending. Applied after fan-in so completion order can never leak into
/// the result.
pub(crate) fn rank(descriptions: &mut [Description]) {
    descriptions.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.position.cmp(&b.position))
    });
}

/// Build a result for the non-voting strategies: confidence filter,
/// dedup, rank.
pub(crate) fn finish_deduplicated(
    mode: Mode,
    gathered: Gathered,
    config: &ProcessingConfig,
    started: Instant,
) -> ProcessingResult {
    let total_extracted: usize = gathered.raw.values().map(Vec::len).sum();

    let candidates: Vec<Description> = gathered
        .raw
        .values()
        .flatten()
        .filter(|d| d.confidence >= config.settings.min_confidence)
        .cloned()
        .collect();

    let mut descriptions = deduplicate(candidates);
    rank(&mut descriptions);

    finish(mode, descriptions, total_extracted, gathered, started)
}

/// Assemble the common result fields.
pub(crate) fn finish(
    mode: Mode,
    descriptions: Vec<Description>,
    total_extracted: usize,
    gathered: Gathered,
    started: Instant,
) -> ProcessingResult {
    let quality = QualityMetrics::compute(total_extracted, &descriptions);
    let hints = recommendations(&quality, &gathered.used, &gathered.failed);

    ProcessingResult {
        mode,
        descriptions,
        per_backend_raw: gathered.raw,
        quality,
        backends_used: gathered.used,
        failed_backends: gathered.failed,
        recommendations: hints,
        elapsed: started.elapsed(),
    }
}
