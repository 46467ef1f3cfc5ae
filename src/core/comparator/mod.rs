//! # Comparator Module
//!
//! Clusters hashed images into candidate duplicate groups.
//!
//! ## How It Works
//! 1. Byte-identical files (equal digests) always share a group
//! 2. Otherwise a record joins the first group whose founder's signature is
//!    within the Hamming-distance threshold
//! 3. Groups left with a single member are dropped
//!
//! The result depends on input order by construction. Swapping this for
//! pairwise or union-find clustering changes which files end up together.
//!
//! ## Threshold Guide
//! | Distance | Meaning                 |
//! |----------|-------------------------|
//! | 0        | Same coarse structure   |
//! | 1-5      | Re-encode, resize       |
//! | 6-12     | Light edits             |
//! | 13+      | Increasingly unrelated  |

mod grouper;
mod traits;

pub use grouper::{GreedyGrouper, GroupAccumulator};
pub use traits::{ComparisonStrategy, ThresholdStrategy};

use crate::core::hasher::{ImageRecord, PerceptualSignature};
use serde::{Deserialize, Serialize};

/// How a member entered its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinReason {
    /// First member; its signature is the group's representative
    Founder,
    /// Byte-identical to a file already in the group
    ExactDigest,
    /// Signature within the threshold of the representative
    Perceptual { distance: u32 },
}

/// Overall classification of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Every member is byte-identical to the founder
    Exact,
    /// At least one member matched on its signature only
    Similar,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact duplicates"),
            MatchType::Similar => write!(f, "similar images"),
        }
    }
}

/// A record together with how it joined its group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub record: ImageRecord,
    pub joined: JoinReason,
}

/// A group of similar records in discovery order, before keep/delete
/// selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    pub members: Vec<GroupMember>,
}

impl CandidateGroup {
    pub fn founded_by(record: ImageRecord) -> Self {
        Self {
            members: vec![GroupMember {
                record,
                joined: JoinReason::Founder,
            }],
        }
    }

    /// Signature of the founding member
    pub fn representative(&self) -> &PerceptualSignature {
        &self.members[0].record.signature
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn match_type(&self) -> MatchType {
        let all_exact = self
            .members
            .iter()
            .skip(1)
            .all(|m| m.joined == JoinReason::ExactDigest);

        if all_exact {
            MatchType::Exact
        } else {
            MatchType::Similar
        }
    }
}
