//! Trait definitions for comparison strategies.

use crate::core::hasher::SIGNATURE_BITS;

/// Strategy trait for determining if two signatures are close enough
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if two images should be considered duplicates based on distance
    fn is_duplicate(&self, distance: u32) -> bool;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Simple threshold-based comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdStrategy {
    /// Maximum distance to consider as duplicate
    threshold: u32,
}

impl ThresholdStrategy {
    /// Default threshold, about 8% of the signature width
    pub const DEFAULT_THRESHOLD: u32 = 5;

    /// Create a new threshold strategy.
    ///
    /// Any value is accepted; callers validate against [`SIGNATURE_BITS`].
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Whether `threshold` is inside `0..=SIGNATURE_BITS`
    pub fn is_valid(threshold: u32) -> bool {
        threshold <= SIGNATURE_BITS
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_duplicate(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: images whose signatures differ in at most {} of {} bits are duplicates",
            self.threshold, SIGNATURE_BITS
        )
    }
}
