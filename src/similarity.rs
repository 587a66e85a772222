//! Text similarity utilities for candidate clustering and deduplication.

use std::collections::HashSet;

/// Compute case-insensitive token-set (Jaccard) similarity.
///
/// Splits both strings by whitespace after lowercasing and returns the
/// Jaccard coefficient of the resulting token sets, a value in [0.0, 1.0].
///
/// # Examples
///
/// ```
/// use limn::similarity::token_set_similarity;
///
/// assert!((token_set_similarity("the old oak", "The Old Oak") - 1.0).abs() < 1e-10);
/// // "the old oak" vs "the oak": intersection 2, union 3
/// assert!((token_set_similarity("the old oak", "the oak") - 2.0 / 3.0).abs() < 1e-10);
/// assert_eq!(token_set_similarity("castle", "river"), 0.0);
/// ```
#[must_use]
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    if a_lower == b_lower {
        return 1.0;
    }

    let tokens_a: HashSet<&str> = a_lower.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b_lower.split_whitespace().collect();

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert!((token_set_similarity("dark castle", "dark castle") - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_case_insensitive() {
        assert!((token_set_similarity("Dark Castle", "dark castle") - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_partial_overlap() {
        // intersection {old, oak} = 2, union {the, old, oak, tree} = 4
        let sim = token_set_similarity("old oak", "the old oak tree");
        assert!((sim - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(token_set_similarity("misty forest", "brass lantern"), 0.0);
    }

    #[test]
    fn test_empty_strings() {
        assert!((token_set_similarity("", "") - 1.0).abs() < 1e-10);
        assert_eq!(token_set_similarity("oak", ""), 0.0);
    }

    #[test]
    fn test_word_order_ignored() {
        assert!((token_set_similarity("oak old the", "the old oak") - 1.0).abs() < 1e-10);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn similarity_bounded(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let sim = token_set_similarity(&a, &b);
            prop_assert!(sim >= 0.0);
            prop_assert!(sim <= 1.0);
        }

        #[test]
        fn similarity_symmetric(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let ab = token_set_similarity(&a, &b);
            let ba = token_set_similarity(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-10);
        }

        #[test]
        fn self_similarity_is_one(a in "[a-z][a-z ]{0,40}") {
            prop_assert!((token_set_similarity(&a, &a) - 1.0).abs() < 1e-10);
        }
    }
}
