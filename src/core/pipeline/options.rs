//! Scan configuration.

use super::control::{CancellationToken, ProgressCounter};
use crate::core::comparator::ThresholdStrategy;
use crate::core::hasher::SIGNATURE_BITS;
use crate::core::scanner::ScanConfig;
use crate::error::DedupError;

/// How files are hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One file at a time on the calling thread
    #[default]
    Sequential,
    /// A dedicated rayon pool of `workers` threads
    Parallel { workers: usize },
}

impl Parallelism {
    /// Parallel with one worker per available core
    pub fn parallel() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Parallelism::Parallel { workers }
    }
}

/// Everything a scan can be tuned with
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum Hamming distance for two images to be grouped
    pub threshold: u32,
    pub parallelism: Parallelism,
    pub discovery: ScanConfig,
    pub cancellation: CancellationToken,
    pub progress: ProgressCounter,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            threshold: ThresholdStrategy::DEFAULT_THRESHOLD,
            parallelism: Parallelism::Sequential,
            discovery: ScanConfig::default(),
            cancellation: CancellationToken::new(),
            progress: ProgressCounter::new(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn discovery(mut self, config: ScanConfig) -> Self {
        self.discovery = config;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.discovery.include_hidden = include;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn progress(mut self, counter: ProgressCounter) -> Self {
        self.progress = counter;
        self
    }

    /// Reject settings no scan can run with
    pub fn validate(&self) -> Result<(), DedupError> {
        if !ThresholdStrategy::is_valid(self.threshold) {
            return Err(DedupError::Config(format!(
                "threshold {} is out of range 0..={}",
                self.threshold, SIGNATURE_BITS
            )));
        }
        if self.parallelism == (Parallelism::Parallel { workers: 0 }) {
            return Err(DedupError::Config(
                "parallel hashing needs at least one worker".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = ScanOptions::default();
        assert_eq!(options.threshold, 5);
        assert_eq!(options.parallelism, Parallelism::Sequential);
        assert!(options.discovery.include_hidden);
        assert!(!options.discovery.follow_symlinks);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn threshold_above_signature_width_is_rejected() {
        assert!(ScanOptions::new().threshold(64).validate().is_ok());

        let err = ScanOptions::new().threshold(65).validate().unwrap_err();
        assert!(matches!(err, DedupError::Config(_)));
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let options = ScanOptions::new().parallelism(Parallelism::Parallel { workers: 0 });
        assert!(options.validate().is_err());
    }

    #[test]
    fn parallel_has_at_least_one_worker() {
        match Parallelism::parallel() {
            Parallelism::Parallel { workers } => assert!(workers >= 1),
            Parallelism::Sequential => panic!("expected parallel"),
        }
    }

    #[test]
    fn builder_methods_chain() {
        let token = CancellationToken::new();
        let options = ScanOptions::new()
            .threshold(10)
            .include_hidden(false)
            .cancellation(token.clone());

        token.cancel();

        assert_eq!(options.threshold, 10);
        assert!(!options.discovery.include_hidden);
        assert!(options.cancellation.is_cancelled());
    }
}
