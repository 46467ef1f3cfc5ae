//! Greedy single-pass clustering.
//!
//! Records are taken in discovery order. Each one joins the group already
//! holding a byte-identical file, otherwise the first group whose
//! representative (founding member) is within the threshold, otherwise it
//! founds a new group. First fit, not closest fit: reruns over the same
//! ordered input always produce the same groups.

use super::traits::ComparisonStrategy;
use super::{CandidateGroup, GroupMember, JoinReason};
use crate::core::hasher::{ContentDigest, ImageRecord};
use std::collections::HashMap;
use tracing::debug;

/// Incremental grouping state. Mutations go through `&mut self`, so a
/// streaming caller needs a single writer.
pub struct GroupAccumulator<'a> {
    strategy: &'a dyn ComparisonStrategy,
    groups: Vec<CandidateGroup>,
    by_digest: HashMap<ContentDigest, usize>,
}

impl<'a> GroupAccumulator<'a> {
    pub fn new(strategy: &'a dyn ComparisonStrategy) -> Self {
        Self {
            strategy,
            groups: Vec::new(),
            by_digest: HashMap::new(),
        }
    }

    /// Place one record. Returns the index of the group it landed in.
    pub fn push(&mut self, record: ImageRecord) -> usize {
        let digest = record.digest;

        // Exact duplicate fast path, no perceptual comparison
        if let Some(&index) = self.by_digest.get(&digest) {
            self.groups[index].members.push(GroupMember {
                record,
                joined: JoinReason::ExactDigest,
            });
            return index;
        }

        let fit = self.groups.iter().enumerate().find_map(|(index, group)| {
            let distance = group.representative().distance(&record.signature);
            self.strategy
                .is_duplicate(distance)
                .then_some((index, distance))
        });

        let index = match fit {
            Some((index, distance)) => {
                self.groups[index].members.push(GroupMember {
                    record,
                    joined: JoinReason::Perceptual { distance },
                });
                index
            }
            None => {
                self.groups.push(CandidateGroup::founded_by(record));
                self.groups.len() - 1
            }
        };

        self.by_digest.insert(digest, index);
        index
    }

    /// Number of open groups, singletons included
    pub fn open_groups(&self) -> usize {
        self.groups.len()
    }

    /// Close grouping, dropping every group with fewer than two members
    pub fn finish(self) -> Vec<CandidateGroup> {
        self.groups
            .into_iter()
            .filter(|group| group.len() >= 2)
            .collect()
    }
}

/// Groups records using a comparison strategy
pub struct GreedyGrouper<S: ComparisonStrategy> {
    strategy: S,
}

impl<S: ComparisonStrategy> GreedyGrouper<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Group records in the order given
    pub fn group<I>(&self, records: I) -> Vec<CandidateGroup>
    where
        I: IntoIterator<Item = ImageRecord>,
    {
        let mut accumulator = GroupAccumulator::new(&self.strategy);
        for record in records {
            accumulator.push(record);
        }
        debug!(open_groups = accumulator.open_groups(), "grouping finished");
        accumulator.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparator::{MatchType, ThresholdStrategy};
    use crate::core::hasher::PerceptualSignature;
    use crate::core::scanner::ImageFormat;
    use std::path::PathBuf;

    fn record(name: &str, content: &str, signature: u64) -> ImageRecord {
        ImageRecord {
            path: PathBuf::from(format!("/photos/{name}")),
            size: 1000,
            width: 64,
            height: 64,
            format: ImageFormat::Jpeg,
            digest: ContentDigest::of_bytes(content.as_bytes()),
            signature: PerceptualSignature::from_bits(signature),
        }
    }

    fn grouper(threshold: u32) -> GreedyGrouper<ThresholdStrategy> {
        GreedyGrouper::new(ThresholdStrategy::new(threshold))
    }

    fn names(group: &CandidateGroup) -> Vec<String> {
        group
            .members
            .iter()
            .map(|m| m.record.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn empty_input_returns_no_groups() {
        assert!(grouper(5).group(Vec::new()).is_empty());
    }

    #[test]
    fn singletons_are_not_emitted() {
        let groups = grouper(5).group(vec![
            record("a.jpg", "a", 0),
            record("b.jpg", "b", u64::MAX),
        ]);
        assert!(groups.is_empty());
    }

    #[test]
    fn exact_digest_groups_even_at_threshold_zero() {
        // Same bytes but a contrived signature mismatch: the digest wins
        let groups = grouper(0).group(vec![
            record("a.jpg", "same", 0),
            record("b.jpg", "same", u64::MAX),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members[1].joined, JoinReason::ExactDigest);
        assert_eq!(groups[0].match_type(), MatchType::Exact);
    }

    #[test]
    fn similar_signature_joins_within_threshold() {
        let groups = grouper(3).group(vec![
            record("a.jpg", "a", 0b0000),
            record("b.jpg", "b", 0b0111),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].members[1].joined,
            JoinReason::Perceptual { distance: 3 }
        );
        assert_eq!(groups[0].match_type(), MatchType::Similar);
    }

    #[test]
    fn comparison_is_against_representative_only() {
        // b is 2 from a; c is 2 from b but 4 from a
        let groups = grouper(2).group(vec![
            record("a.jpg", "a", 0b0000),
            record("b.jpg", "b", 0b0011),
            record("c.jpg", "c", 0b1111),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn first_fit_beats_closest_fit() {
        // x is 3 from group one's representative and 1 from group two's
        let groups = grouper(3).group(vec![
            record("one.jpg", "1", 0x00),
            record("two.jpg", "2", 0x0F),
            record("one_b.jpg", "1b", 0x01),
            record("two_b.jpg", "2b", 0x1F),
            record("x.jpg", "x", 0x07),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups[0]), vec!["one.jpg", "one_b.jpg", "x.jpg"]);
        assert_eq!(names(&groups[1]), vec!["two.jpg", "two_b.jpg"]);
    }

    #[test]
    fn digest_fast_path_follows_first_copy() {
        // c is a byte copy of b, which joined a's group perceptually
        let groups = grouper(1).group(vec![
            record("a.jpg", "a", 0b00),
            record("b.jpg", "b", 0b01),
            record("other.jpg", "o", u64::MAX),
            record("c.jpg", "b", 0b01),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(groups[0].members[2].joined, JoinReason::ExactDigest);
    }

    #[test]
    fn accumulator_tracks_open_groups() {
        let strategy = ThresholdStrategy::new(0);
        let mut accumulator = GroupAccumulator::new(&strategy);

        assert_eq!(accumulator.push(record("a.jpg", "a", 1)), 0);
        assert_eq!(accumulator.push(record("b.jpg", "b", 2)), 1);
        assert_eq!(accumulator.push(record("c.jpg", "c", 1)), 0);
        assert_eq!(accumulator.open_groups(), 2);

        let groups = accumulator.finish();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn grouping_is_deterministic() {
        let input = || {
            (0..40u64)
                .map(|i| record(&format!("{i}.jpg"), &format!("c{}", i % 7), i * 0x0101))
                .collect::<Vec<_>>()
        };

        let first = grouper(4).group(input());
        let second = grouper(4).group(input());

        assert_eq!(first, second);
    }
}
