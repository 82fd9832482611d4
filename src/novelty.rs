//! "Is this reading worth sending?" predicates.

/// Decides whether `current` differs enough from the last observed value to transmit.
pub trait NoveltyPolicy {
    fn is_novel(&self, previous: f32, current: f32) -> bool;
}

/// Novel once the absolute change reaches `threshold`.
///
/// A NaN on either side never compares below the threshold, so a failed sensor read
/// always goes out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteDifference {
    pub threshold: f32,
}

impl AbsoluteDifference {
    pub const fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl NoveltyPolicy for AbsoluteDifference {
    fn is_novel(&self, previous: f32, current: f32) -> bool {
        !((current - previous).abs() < self.threshold)
    }
}

/// Novel whenever the value changes at all. Used for discrete class codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExactMatch;

impl NoveltyPolicy for ExactMatch {
    #[allow(clippy::float_cmp)]
    fn is_novel(&self, previous: f32, current: f32) -> bool {
        current != previous
    }
}
