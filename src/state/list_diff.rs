use serde::{Deserialize, Serialize};
use crate::state::value::StateValue;

/// One positional entry of a [`ListDiff`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ListDiffEntry {
    /// Element unchanged.
    Nop,
    /// Replacement element, or a nested StateDiff when the value is a diff State.
    Value(StateValue),
}

impl ListDiffEntry {
    pub fn is_nop(&self) -> bool {
        matches!(self, ListDiffEntry::Nop)
    }
}

/// Update to an array or complex list that avoids sending the whole collection.
///
/// `diff` covers the overlapping prefix of before/after, `rpush` is appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDiff {
    pub is_array: bool,
    pub diff: Option<Vec<ListDiffEntry>>,
    pub rpush: Option<Vec<StateValue>>,
}

impl ListDiff {
    pub fn for_array() -> Self {
        ListDiff {
            is_array: true,
            ..ListDiff::default()
        }
    }

    pub fn for_list() -> Self {
        ListDiff::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diff.is_none() && self.rpush.is_none()
    }
}

impl PartialEq for ListDiff {
    fn eq(&self, other: &Self) -> bool {
        crate::state::equality::list_diff_equals_strict(self, other)
    }
}
