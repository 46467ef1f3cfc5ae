//! # Selection Module
//!
//! Decides, per group, which file to keep and which to recommend for
//! deletion. Pure functions of group membership: no I/O.

use crate::core::comparator::{CandidateGroup, GroupMember, MatchType};
use crate::core::hasher::ImageRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Picks the member to keep
pub trait KeepPolicy: Send + Sync {
    /// Index into `members` of the file to keep. `members` is never empty.
    fn choose_keep(&self, members: &[GroupMember]) -> usize;

    fn description(&self) -> &'static str;
}

/// Keep the largest file; on a size tie keep the earliest discovered
#[derive(Debug, Default, Clone, Copy)]
pub struct LargestFilePolicy;

impl KeepPolicy for LargestFilePolicy {
    fn choose_keep(&self, members: &[GroupMember]) -> usize {
        let mut best = 0;
        for (index, member) in members.iter().enumerate().skip(1) {
            // Strictly greater, so the first of equal sizes stays
            if member.record.size > members[best].record.size {
                best = index;
            }
        }
        best
    }

    fn description(&self) -> &'static str {
        "keep the largest file, earliest discovered on ties"
    }
}

/// A finalized duplicate group with its keep/delete recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// 1-based position in the result
    pub id: usize,
    pub match_type: MatchType,
    /// All members in discovery order
    pub members: Vec<GroupMember>,
    /// Path of the member to keep
    pub keep: PathBuf,
    /// Paths of every other member, in discovery order
    pub delete: Vec<PathBuf>,
    /// Total size of the delete members
    pub bytes_reclaimable: u64,
}

impl DuplicateGroup {
    /// Annotate a candidate group. Membership is left untouched.
    pub fn finalize(id: usize, group: CandidateGroup, policy: &dyn KeepPolicy) -> Self {
        let match_type = group.match_type();
        let keep_index = policy.choose_keep(&group.members);

        let mut delete = Vec::with_capacity(group.len().saturating_sub(1));
        let mut bytes_reclaimable = 0;
        for (index, member) in group.members.iter().enumerate() {
            if index != keep_index {
                delete.push(member.record.path.clone());
                bytes_reclaimable += member.record.size;
            }
        }

        Self {
            id,
            match_type,
            keep: group.members[keep_index].record.path.clone(),
            members: group.members,
            delete,
            bytes_reclaimable,
        }
    }

    pub fn keep_record(&self) -> Option<&ImageRecord> {
        self.members
            .iter()
            .map(|m| &m.record)
            .find(|r| r.path == self.keep)
    }

    /// Number of files recommended for deletion
    pub fn duplicate_count(&self) -> usize {
        self.delete.len()
    }
}

/// Finalize every candidate group, numbering them from 1
pub fn select_groups(groups: Vec<CandidateGroup>, policy: &dyn KeepPolicy) -> Vec<DuplicateGroup> {
    groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| DuplicateGroup::finalize(index + 1, group, policy))
        .collect()
}
