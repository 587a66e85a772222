//! Processing results, quality metrics, and recommendations.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::description::{Description, DescriptionKind};

/// Aggregate quality numbers for one `process()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Raw candidates extracted across all backends, before any filtering.
    pub total_extracted: usize,
    /// Descriptions that survived filtering, dedup, or voting.
    pub passed_threshold: usize,
    /// Mean confidence of the surviving descriptions (0.0 when none).
    pub average_confidence: f64,
    /// Surviving descriptions per kind.
    pub kind_distribution: HashMap<DescriptionKind, usize>,
}

impl QualityMetrics {
    /// Compute metrics from the raw candidate count and the final list.
    #[must_use]
    pub fn compute(total_extracted: usize, descriptions: &[Description]) -> Self {
        let average_confidence = if descriptions.is_empty() {
            0.0
        } else {
            descriptions.iter().map(|d| d.confidence).sum::<f64>() / descriptions.len() as f64
        };

        let mut kind_distribution = HashMap::new();
        for d in descriptions {
            *kind_distribution.entry(d.kind).or_insert(0) += 1;
        }

        Self {
            total_extracted,
            passed_threshold: descriptions.len(),
            average_confidence,
            kind_distribution,
        }
    }

    fn empty() -> Self {
        Self {
            total_extracted: 0,
            passed_threshold: 0,
            average_confidence: 0.0,
            kind_distribution: HashMap::new(),
        }
    }
}

/// The outcome of one `process()` call.
///
/// Created once per call and returned to the caller; the orchestrator never
/// retains or mutates it afterwards. A result with zero descriptions is a
/// valid, silent outcome, not an error state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Mode that actually ran (for Adaptive, the delegated mode).
    pub mode: Mode,
    /// Final descriptions: deduplicated or voted, ranked by priority
    /// descending with position ascending as the tie-break.
    pub descriptions: Vec<Description>,
    /// Raw per-backend output from the backends that succeeded.
    pub per_backend_raw: HashMap<String, Vec<Description>>,
    /// Quality metrics for this call.
    pub quality: QualityMetrics,
    /// Ids of backends that completed successfully.
    pub backends_used: Vec<String>,
    /// Ids of backends that errored or timed out this call.
    pub failed_backends: Vec<String>,
    /// Human-readable hints about this call's quality.
    pub recommendations: Vec<String>,
    /// Wall-clock processing time.
    pub elapsed: Duration,
}

impl ProcessingResult {
    /// The total-failure floor: a valid, empty result.
    #[must_use]
    pub fn empty(mode: Mode) -> Self {
        Self {
            mode,
            descriptions: Vec::new(),
            per_backend_raw: HashMap::new(),
            quality: QualityMetrics::empty(),
            backends_used: Vec::new(),
            failed_backends: Vec::new(),
            recommendations: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// True when at least one backend failed during this call.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failed_backends.is_empty()
    }
}

/// Generate human-readable hints from a call's outcome.
#[must_use]
pub fn recommendations(
    quality: &QualityMetrics,
    backends_used: &[String],
    failed_backends: &[String],
) -> Vec<String> {
    let mut hints = Vec::new();

    if backends_used.is_empty() {
        hints.push(
            "No backend produced output; check backend health and the per-backend timeout."
                .to_string(),
        );
        return hints;
    }

    if !failed_backends.is_empty() {
        hints.push(format!(
            "{} backend(s) failed and were excluded from this call: {}",
            failed_backends.len(),
            failed_backends.join(", ")
        ));
    }

    if quality.total_extracted > 0 && quality.passed_threshold == 0 {
        hints.push(
            "All candidates fell below the configured thresholds; \
             consider lowering min_confidence or consensus_threshold."
                .to_string(),
        );
    } else if quality.average_confidence < 0.5 && quality.passed_threshold > 0 {
        hints.push(
            "Low agreement across backends; consider adjusting backend weights.".to_string(),
        );
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(kind: DescriptionKind, conf: f64) -> Description {
        Description::new("x", kind, conf, 0)
    }

    #[test]
    fn test_metrics_empty() {
        let m = QualityMetrics::compute(0, &[]);
        assert_eq!(m.total_extracted, 0);
        assert_eq!(m.passed_threshold, 0);
        assert_eq!(m.average_confidence, 0.0);
        assert!(m.kind_distribution.is_empty());
    }

    #[test]
    fn test_metrics_distribution() {
        let descs = vec![
            desc(DescriptionKind::Location, 0.8),
            desc(DescriptionKind::Location, 0.6),
            desc(DescriptionKind::Object, 1.0),
        ];
        let m = QualityMetrics::compute(5, &descs);

        assert_eq!(m.total_extracted, 5);
        assert_eq!(m.passed_threshold, 3);
        assert!((m.average_confidence - 0.8).abs() < 1e-10);
        assert_eq!(m.kind_distribution[&DescriptionKind::Location], 2);
        assert_eq!(m.kind_distribution[&DescriptionKind::Object], 1);
    }

    #[test]
    fn test_no_backends_hint() {
        let hints = recommendations(&QualityMetrics::empty(), &[], &["a".to_string()]);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("No backend produced output"));
    }

    #[test]
    fn test_partial_failure_hint() {
        let m = QualityMetrics::compute(3, &[desc(DescriptionKind::Object, 0.9)]);
        let hints = recommendations(&m, &["a".to_string()], &["b".to_string()]);
        assert!(hints.iter().any(|h| h.contains("excluded")));
        assert!(hints.iter().any(|h| h.contains('b')));
    }

    #[test]
    fn test_low_confidence_hint() {
        let m = QualityMetrics::compute(2, &[desc(DescriptionKind::Object, 0.3)]);
        let hints = recommendations(&m, &["a".to_string()], &[]);
        assert!(hints.iter().any(|h| h.contains("Low agreement")));
    }

    #[test]
    fn test_all_filtered_hint() {
        let m = QualityMetrics::compute(4, &[]);
        let hints = recommendations(&m, &["a".to_string()], &[]);
        assert!(hints.iter().any(|h| h.contains("below the configured thresholds")));
    }

    #[test]
    fn test_clean_run_no_hints() {
        let m = QualityMetrics::compute(2, &[desc(DescriptionKind::Object, 0.9)]);
        let hints = recommendations(&m, &["a".to_string()], &[]);
        assert!(hints.is_empty());
    }

    #[test]
    fn test_result_serializes() {
        let result = ProcessingResult::empty(Mode::Parallel);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"descriptions\":[]"));
    }
}
