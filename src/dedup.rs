//! Candidate deduplication for the non-voting strategies.
//!
//! When two backends trivially agree on a passage (or one backend emits
//! overlapping spans), the result should contain it once. This is the
//! simple path: no weighting, no consensus, just collapse near-exact
//! duplicates and keep the most confident copy. The ensemble voter replaces
//! this with weighted clustering.

use crate::description::Description;
use crate::similarity::token_set_similarity;

/// Span overlap ratio at or above which two same-kind candidates are
/// near-exact duplicates.
const DUP_OVERLAP: f64 = 0.9;

/// Token-set similarity at or above which two same-kind candidates are
/// near-exact duplicates.
const DUP_SIMILARITY: f64 = 0.9;

/// Collapse exact and near-exact duplicates, keeping the
/// highest-confidence copy of each.
///
/// Two candidates are duplicates iff they have the same kind and their
/// spans overlap by at least 90% or their content similarity is at least
/// 0.9. Ties on confidence go to the longer content, then the
/// lexicographically smaller source id, so output is deterministic
/// regardless of input order. Each survivor's priority is recomputed from
/// its kind.
#[must_use]
pub fn deduplicate(mut candidates: Vec<Description>) -> Vec<Description> {
    // Deterministic scan order regardless of backend completion order.
    candidates.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.char_length.cmp(&b.char_length))
            .then_with(|| a.source.cmp(&b.source))
    });

    let mut kept: Vec<Description> = Vec::with_capacity(candidates.len());

    for mut candidate in candidates {
        candidate.priority = candidate.kind.base_priority();

        match kept.iter().position(|k| is_duplicate(k, &candidate)) {
            None => kept.push(candidate),
            Some(idx) => {
                if prefer_candidate(&kept[idx], &candidate) {
                    kept[idx] = candidate;
                }
            }
        }
    }

    kept
}

fn is_duplicate(a: &Description, b: &Description) -> bool {
    a.kind == b.kind
        && (a.overlap_ratio(b) >= DUP_OVERLAP
            || token_set_similarity(&a.content, &b.content) >= DUP_SIMILARITY)
}

/// True if `candidate` should replace `existing`.
fn prefer_candidate(existing: &Description, candidate: &Description) -> bool {
    candidate
        .confidence
        .partial_cmp(&existing.confidence)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| candidate.char_length.cmp(&existing.char_length))
        .then_with(|| existing.source.cmp(&candidate.source))
        .is_gt()
}
