//! Descriptive passage types.

use serde::{Deserialize, Serialize};

/// Kind of descriptive passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptionKind {
    /// A place: rooms, landscapes, buildings.
    Location,
    /// A person's appearance or presence.
    Character,
    /// Mood, weather, lighting.
    Atmosphere,
    /// A concrete object in the scene.
    Object,
    /// Ongoing action or movement.
    Action,
}

impl DescriptionKind {
    /// All kinds, in base-priority order.
    pub const ALL: [DescriptionKind; 5] = [
        DescriptionKind::Location,
        DescriptionKind::Character,
        DescriptionKind::Atmosphere,
        DescriptionKind::Object,
        DescriptionKind::Action,
    ];

    /// Convert to a stable label string.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            DescriptionKind::Location => "LOCATION",
            DescriptionKind::Character => "CHARACTER",
            DescriptionKind::Atmosphere => "ATMOSPHERE",
            DescriptionKind::Object => "OBJECT",
            DescriptionKind::Action => "ACTION",
        }
    }

    /// Parse from a label string (case-insensitive).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "LOCATION" | "LOC" | "PLACE" => Some(DescriptionKind::Location),
            "CHARACTER" | "CHAR" | "PERSON" => Some(DescriptionKind::Character),
            "ATMOSPHERE" | "MOOD" => Some(DescriptionKind::Atmosphere),
            "OBJECT" | "OBJ" => Some(DescriptionKind::Object),
            "ACTION" | "ACT" => Some(DescriptionKind::Action),
            _ => None,
        }
    }

    /// Base priority for ranking. Places and people rank above incidental
    /// objects and motion; the ensemble voter adds a consensus boost on top.
    #[must_use]
    pub fn base_priority(&self) -> f64 {
        match self {
            DescriptionKind::Location => 1.0,
            DescriptionKind::Character => 0.9,
            DescriptionKind::Atmosphere => 0.7,
            DescriptionKind::Object => 0.5,
            DescriptionKind::Action => 0.4,
        }
    }
}

impl std::fmt::Display for DescriptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A candidate or final descriptive passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Description {
    /// Passage text.
    pub content: String,
    /// Passage kind.
    pub kind: DescriptionKind,
    /// Confidence score, always in [0.0, 1.0].
    pub confidence: f64,
    /// Derived ranking priority. Recomputed by the orchestrator; a value
    /// set by a backend is never trusted.
    pub priority: f64,
    /// Id of the backend that produced this candidate.
    pub source: String,
    /// Char offset of the passage within the chapter text.
    pub position: usize,
    /// Char length of `content`, fixed at construction.
    pub char_length: usize,
}

impl Description {
    /// Create a new description. Confidence is clamped to [0.0, 1.0] and
    /// priority starts at the kind's base priority.
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        kind: DescriptionKind,
        confidence: f64,
        position: usize,
    ) -> Self {
        let content = content.into();
        let char_length = content.chars().count();
        Self {
            content,
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            priority: kind.base_priority(),
            source: String::new(),
            position,
            char_length,
        }
    }

    /// Set the source backend id.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// End of the passage span (exclusive char offset).
    #[must_use]
    pub fn end(&self) -> usize {
        self.position + self.char_length
    }

    /// Check if this passage's span overlaps another's.
    #[must_use]
    pub fn overlaps(&self, other: &Description) -> bool {
        !(self.end() <= other.position || other.end() <= self.position)
    }

    /// Span overlap ratio (intersection over union) with another passage.
    #[must_use]
    pub fn overlap_ratio(&self, other: &Description) -> f64 {
        let intersection_start = self.position.max(other.position);
        let intersection_end = self.end().min(other.end());

        if intersection_start >= intersection_end {
            return 0.0;
        }

        let intersection = (intersection_end - intersection_start) as f64;
        let union =
            (self.char_length + other.char_length - (intersection_end - intersection_start)) as f64;

        if union == 0.0 {
            return 1.0;
        }

        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_label_roundtrip() {
        for kind in DescriptionKind::ALL {
            assert_eq!(DescriptionKind::from_label(kind.as_label()), Some(kind));
        }
    }

    #[test]
    fn test_kind_label_aliases() {
        assert_eq!(
            DescriptionKind::from_label("place"),
            Some(DescriptionKind::Location)
        );
        assert_eq!(
            DescriptionKind::from_label("person"),
            Some(DescriptionKind::Character)
        );
        assert_eq!(DescriptionKind::from_label("banana"), None);
    }

    #[test]
    fn test_confidence_clamping() {
        let d = Description::new("x", DescriptionKind::Object, 1.5, 0);
        assert!((d.confidence - 1.0).abs() < f64::EPSILON);

        let d = Description::new("x", DescriptionKind::Object, -0.5, 0);
        assert!(d.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_char_length_counts_chars() {
        let d = Description::new("café", DescriptionKind::Atmosphere, 0.5, 0);
        assert_eq!(d.char_length, 4);
    }

    #[test]
    fn test_overlap() {
        let a = Description::new("dark hall", DescriptionKind::Location, 0.8, 0);
        let b = Description::new("hallway", DescriptionKind::Location, 0.8, 5);
        let c = Description::new("garden", DescriptionKind::Location, 0.8, 50);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_base_priority_ordering() {
        let mut prev = f64::INFINITY;
        for kind in DescriptionKind::ALL {
            assert!(kind.base_priority() <= prev);
            prev = kind.base_priority();
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn confidence_always_clamped(conf in -10.0f64..10.0) {
            let d = Description::new("test", DescriptionKind::Object, conf, 0);
            prop_assert!(d.confidence >= 0.0);
            prop_assert!(d.confidence <= 1.0);
        }

        #[test]
        fn overlap_is_symmetric(
            p1 in 0usize..200,
            p2 in 0usize..200,
            len1 in 1usize..40,
            len2 in 1usize..40,
        ) {
            let a = Description::new("a".repeat(len1), DescriptionKind::Object, 0.5, p1);
            let b = Description::new("b".repeat(len2), DescriptionKind::Object, 0.5, p2);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn overlap_ratio_bounded(
            p1 in 0usize..200,
            p2 in 0usize..200,
            len1 in 1usize..40,
            len2 in 1usize..40,
        ) {
            let a = Description::new("a".repeat(len1), DescriptionKind::Object, 0.5, p1);
            let b = Description::new("b".repeat(len2), DescriptionKind::Object, 0.5, p2);
            let ratio = a.overlap_ratio(&b);
            prop_assert!(ratio >= 0.0);
            prop_assert!(ratio <= 1.0);
        }

        #[test]
        fn self_overlap_ratio_is_one(p in 0usize..200, len in 1usize..40) {
            let d = Description::new("x".repeat(len), DescriptionKind::Object, 0.5, p);
            prop_assert!((d.overlap_ratio(&d) - 1.0).abs() < 1e-10);
        }
    }
}
