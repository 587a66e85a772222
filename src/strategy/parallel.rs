//! Parallel strategy: concurrent fan-out to all active backends.

use std::time::Instant;

use crate::config::{Mode, ProcessingConfig};
use crate::result::ProcessingResult;

use super::{finish_deduplicated, gather_parallel};

/// Fan out to every backend concurrently, each under its own timeout, and
/// merge whatever completes through the deduplicator. Partial failure is
/// tolerated: any succeeding subset yields a result, and total failure
/// yields the empty floor with a health recommendation.
pub(crate) async fn process(text: &str, config: &ProcessingConfig) -> ProcessingResult {
    let started = Instant::now();
    let gathered = gather_parallel(text, config).await;
    finish_deduplicated(Mode::Parallel, gathered, config, started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::description::{Description, DescriptionKind};
    use crate::registry::BackendHandle;
    use crate::MockExtractor;
    use std::sync::Arc;
    use std::time::Duration;

    fn backend(id: &str, descs: Vec<Description>) -> BackendHandle {
        BackendHandle::new(id, 1.0, MockExtractor::new("m").with_descriptions(descs))
    }

    #[tokio::test]
    async fn test_parallel_merges_all_backends() {
        let config = ProcessingConfig::new(
            Mode::Parallel,
            vec![
                backend(
                    "a",
                    vec![Description::new("a mossy well", DescriptionKind::Object, 0.8, 40)],
                ),
                backend(
                    "b",
                    vec![Description::new(
                        "the village square",
                        DescriptionKind::Location,
                        0.9,
                        200,
                    )],
                ),
            ],
            Arc::new(Settings::default()),
        );

        let result = process("text", &config).await;
        assert_eq!(result.descriptions.len(), 2);
        assert_eq!(result.backends_used.len(), 2);
        assert_eq!(result.per_backend_raw.len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_dedup_keeps_highest_confidence() {
        let config = ProcessingConfig::new(
            Mode::Parallel,
            vec![
                backend(
                    "a",
                    vec![Description::new("the old oak tree", DescriptionKind::Object, 0.6, 50)],
                ),
                backend(
                    "b",
                    vec![Description::new("the old oak tree", DescriptionKind::Object, 0.9, 50)],
                ),
            ],
            Arc::new(Settings::default()),
        );

        let result = process("text", &config).await;
        assert_eq!(result.descriptions.len(), 1);
        assert!((result.descriptions[0].confidence - 0.9).abs() < 1e-10);
        assert_eq!(result.descriptions[0].source, "b");
    }

    #[tokio::test]
    async fn test_parallel_survives_partial_failure() {
        let config = ProcessingConfig::new(
            Mode::Parallel,
            vec![
                backend(
                    "good",
                    vec![Description::new("an iron gate", DescriptionKind::Object, 0.9, 0)],
                ),
                BackendHandle::new("bad", 1.0, MockExtractor::new("bad").with_error("down")),
                BackendHandle::new(
                    "slow",
                    1.0,
                    MockExtractor::new("slow").with_delay(Duration::from_secs(5)),
                ),
            ],
            Arc::new(Settings {
                per_backend_timeout: Duration::from_millis(50),
                ..Settings::default()
            }),
        );

        let result = process("text", &config).await;
        assert_eq!(result.descriptions.len(), 1);
        assert_eq!(result.backends_used, vec!["good".to_string()]);
        assert_eq!(result.failed_backends.len(), 2);
        assert!(!result.per_backend_raw.contains_key("slow"));
    }

    #[tokio::test]
    async fn test_parallel_total_failure_floor() {
        let config = ProcessingConfig::new(
            Mode::Parallel,
            vec![
                BackendHandle::new("x", 1.0, MockExtractor::new("x").with_error("down")),
                BackendHandle::new("y", 1.0, MockExtractor::new("y").with_error("down")),
            ],
            Arc::new(Settings::default()),
        );

        let result = process("text", &config).await;
        assert!(result.descriptions.is_empty());
        assert!(result.backends_used.is_empty());
        assert_eq!(result.quality.total_extracted, 0);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("check backend health")));
    }

    #[tokio::test]
    async fn test_parallel_ordering_independent_of_completion() {
        // The slower backend carries the higher-priority kind; ordering must
        // come from ranking, not arrival order.
        let config = ProcessingConfig::new(
            Mode::Parallel,
            vec![
                backend(
                    "fast",
                    vec![Description::new("a tin cup", DescriptionKind::Object, 0.9, 5)],
                ),
                BackendHandle::new(
                    "slowish",
                    1.0,
                    MockExtractor::new("slowish")
                        .with_descriptions(vec![Description::new(
                            "the banquet hall",
                            DescriptionKind::Location,
                            0.9,
                            300,
                        )])
                        .with_delay(Duration::from_millis(30)),
                ),
            ],
            Arc::new(Settings::default()),
        );

        let result = process("text", &config).await;
        assert_eq!(result.descriptions[0].kind, DescriptionKind::Location);
        assert_eq!(result.descriptions[1].kind, DescriptionKind::Object);
    }
}
