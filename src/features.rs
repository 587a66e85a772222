//! Text feature analysis and adaptive strategy selection.
//!
//! A heuristic, not a classifier: the selector inspects cheap surface
//! features of the chapter text and the advertised strengths of the
//! configured backends, then picks a strategy and a backend subset. It is
//! pure and deterministic for identical text and backend availability.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::description::DescriptionKind;
use crate::registry::BackendHandle;

/// Texts shorter than this go straight to Single mode.
const SHORT_TEXT_CHARS: usize = 500;

/// Texts longer than this always include a general-purpose backend.
const LONG_TEXT_CHARS: usize = 1000;

/// Complexity above which a 3+ backend subset is worth full ensemble voting.
const ENSEMBLE_COMPLEXITY: f64 = 0.7;

/// Keywords that suggest place description. Heuristic proxy, not a gazetteer.
static LOCATION_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "forest", "castle", "mountain", "river", "city", "village", "valley", "tower", "garden",
        "road", "hall", "room", "chamber", "house", "palace", "bridge", "harbor", "shore",
        "meadow", "cliff", "street", "tavern", "church", "cellar", "courtyard", "field", "lake",
        "island", "cave", "gate", "corridor", "attic", "kitchen", "library", "yard",
    ]
    .into_iter()
    .collect()
});

/// Surface features of a chapter text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    /// Char count.
    pub length: usize,
    /// Lexical complexity estimate in [0.0, 1.0]: vocabulary diversity,
    /// mean word length, and punctuation density, equally weighted.
    pub estimated_complexity: f64,
    /// Adjacent capitalized words were seen (proxy for person names).
    pub has_name_sequences: bool,
    /// Number of location-keyword hits (proxy for place description).
    pub location_keyword_hits: usize,
}

impl TextFeatures {
    /// Analyze a text in a single pass over its tokens.
    #[must_use]
    pub fn analyze(text: &str) -> Self {
        let length = text.chars().count();

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let words: Vec<String> = tokens
            .iter()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|w| !w.is_empty())
            .collect();

        let estimated_complexity = estimate_complexity(text, &words, length);

        let mut has_name_sequences = false;
        for pair in words.windows(2) {
            if is_capitalized(&pair[0]) && is_capitalized(&pair[1]) {
                has_name_sequences = true;
                break;
            }
        }

        let location_keyword_hits = words
            .iter()
            .filter(|w| LOCATION_KEYWORDS.contains(w.to_lowercase().as_str()))
            .count();

        Self {
            length,
            estimated_complexity,
            has_name_sequences,
            location_keyword_hits,
        }
    }
}

fn estimate_complexity(text: &str, words: &[String], length: usize) -> f64 {
    if words.is_empty() || length == 0 {
        return 0.0;
    }

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let diversity = unique.len() as f64 / words.len() as f64;

    let total_word_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    let mean_word_len = total_word_chars as f64 / words.len() as f64;
    let word_len_score = (mean_word_len / 10.0).min(1.0);

    let punct = text.chars().filter(|c| c.is_ascii_punctuation()).count();
    let punct_score = (punct as f64 / length as f64 * 8.0).min(1.0);

    ((diversity + word_len_score + punct_score) / 3.0).clamp(0.0, 1.0)
}

fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}

/// The selector's decision: which concrete mode to run and which backends
/// to hand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Concrete strategy to delegate to. Never [`Mode::Adaptive`] and never
    /// [`Mode::Sequential`] (that mode is an explicit fallback only).
    pub mode: Mode,
    /// Backend ids to invoke, in deterministic order.
    pub backend_ids: Vec<String>,
}

/// Choose a strategy and backend subset for the given text.
///
/// Decision rules, in order:
/// 1. Short text: Single with the highest-weight backend.
/// 2. Otherwise build a subset: a Character-capable backend when name
///    sequences were detected, a Location-capable backend when place
///    keywords were detected, and the general-purpose backend (3+ supported
///    kinds) for long texts. An empty subset falls back to all backends.
/// 3. Subset of 1 runs Single; 2 runs Parallel; 3+ runs Ensemble when the
///    text looks complex, Parallel otherwise.
#[must_use]
pub fn select(text: &str, backends: &[BackendHandle]) -> Selection {
    let features = TextFeatures::analyze(text);
    select_with_features(&features, backends)
}

/// Rule evaluation split out so tests can probe the decision table
/// directly.
#[must_use]
pub fn select_with_features(features: &TextFeatures, backends: &[BackendHandle]) -> Selection {
    // Deterministic ranking regardless of caller ordering.
    let mut ranked: Vec<&BackendHandle> = backends.iter().collect();
    ranked.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    if ranked.is_empty() {
        return Selection {
            mode: Mode::Single,
            backend_ids: Vec::new(),
        };
    }

    // Fast path for short text.
    if features.length < SHORT_TEXT_CHARS {
        return Selection {
            mode: Mode::Single,
            backend_ids: vec![ranked[0].id.clone()],
        };
    }

    let mut subset: Vec<String> = Vec::new();
    let mut add = |id: &str| {
        if !subset.iter().any(|existing| existing == id) {
            subset.push(id.to_string());
        }
    };

    if features.has_name_sequences {
        if let Some(h) = best_supporting(&ranked, DescriptionKind::Character) {
            add(&h.id);
        }
    }
    if features.location_keyword_hits > 0 {
        if let Some(h) = best_supporting(&ranked, DescriptionKind::Location) {
            add(&h.id);
        }
    }
    if features.length > LONG_TEXT_CHARS {
        if let Some(h) = ranked
            .iter()
            .find(|h| h.extractor.supported_kinds().len() >= 3)
        {
            add(&h.id);
        }
    }

    // Nothing matched any role: run everything rather than nothing.
    if subset.is_empty() {
        subset = ranked.iter().map(|h| h.id.clone()).collect();
    }

    let mode = match subset.len() {
        1 => Mode::Single,
        2 => Mode::Parallel,
        _ if features.estimated_complexity > ENSEMBLE_COMPLEXITY => Mode::Ensemble,
        _ => Mode::Parallel,
    };

    log::debug!(
        "adaptive selection: mode={mode} backends={subset:?} len={} complexity={:.2} names={} places={}",
        features.length,
        features.estimated_complexity,
        features.has_name_sequences,
        features.location_keyword_hits,
    );

    Selection {
        mode,
        backend_ids: subset,
    }
}

fn best_supporting<'a>(
    ranked: &[&'a BackendHandle],
    kind: DescriptionKind,
) -> Option<&'a BackendHandle> {
    ranked
        .iter()
        .find(|h| h.extractor.supported_kinds().contains(&kind))
        .copied()
}
