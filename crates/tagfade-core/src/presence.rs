//! Per-reader sets of active tags.
//!
//! A tag is a member of its reader's set from the presence event that
//! registered it until the next departure event on that reader. Membership
//! is independent of fade progress: a tag whose fade-in is still running is
//! already active.
//!
//! Each reader's set lives in one [`DashMap`] entry; holding the entry guard
//! serialises concurrent events for the same reader while leaving other
//! readers unblocked.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::constants::CC_MAX;
use crate::traits::LookupTable;
use crate::types::{Action, IgnoreReason, ReaderId, TagId};

/// Tracks which tags are currently active on each reader.
pub struct PresenceTracker {
    lookup: Arc<dyn LookupTable>,
    active: DashMap<ReaderId, BTreeSet<TagId>>,
}

impl PresenceTracker {
    pub fn new(lookup: Arc<dyn LookupTable>) -> Self {
        Self {
            lookup,
            active: DashMap::new(),
        }
    }

    /// Register `tag` on `reader`.
    ///
    /// Returns [`Action::StartFade`] towards [`CC_MAX`] for a newly active
    /// mapped tag, otherwise the reason it was ignored. Unmapped tags leave
    /// the tracker untouched. The tag id is stored in canonical form.
    pub fn on_tag_present(&self, reader: &ReaderId, tag: &TagId) -> Action {
        self.on_tag_present_with(reader, tag, |_, _| {})
    }

    /// [`on_tag_present`](Self::on_tag_present), running `commit(tag, cc)`
    /// for a newly active tag while the reader's entry is still locked.
    ///
    /// Anything `commit` publishes is ordered with the membership change
    /// against every other event on the same reader.
    pub fn on_tag_present_with(
        &self,
        reader: &ReaderId,
        tag: &TagId,
        commit: impl FnOnce(&TagId, u8),
    ) -> Action {
        let tag = TagId::canonical(tag.as_str());
        let Some(cc) = self.lookup.resolve(reader, &tag) else {
            debug!(%reader, %tag, "presence: undefined tag");
            return Action::Ignore(IgnoreReason::UndefinedTag);
        };

        let mut set = self.active.entry(reader.clone()).or_default();
        if !set.insert(tag.clone()) {
            debug!(%reader, %tag, "presence: already active");
            return Action::Ignore(IgnoreReason::AlreadyActive);
        }
        debug!(%reader, %tag, cc, active = set.len(), "presence: tag registered");
        commit(&tag, cc);
        drop(set);

        Action::StartFade {
            tag,
            cc,
            target: CC_MAX,
        }
    }

    /// Clear every active tag on `reader`.
    ///
    /// Returns the `(tag, cc)` pairs that need a fade to zero, ordered by tag
    /// id. Tags that lost their mapping are dropped silently. A reader never
    /// seen before yields an empty list and creates no state.
    pub fn on_tag_absent(&self, reader: &ReaderId) -> Vec<(TagId, u8)> {
        self.on_tag_absent_with(reader, |_| {})
    }

    /// [`on_tag_absent`](Self::on_tag_absent), running `commit(departures)`
    /// while the reader's entry is still locked. Not called for unseen
    /// readers.
    pub fn on_tag_absent_with(
        &self,
        reader: &ReaderId,
        commit: impl FnOnce(&[(TagId, u8)]),
    ) -> Vec<(TagId, u8)> {
        let Some(mut set) = self.active.get_mut(reader) else {
            return Vec::new();
        };

        let departures: Vec<(TagId, u8)> = std::mem::take(&mut *set)
            .into_iter()
            .filter_map(|tag| {
                let cc = self.lookup.resolve(reader, &tag)?;
                Some((tag, cc))
            })
            .collect();
        debug!(%reader, count = departures.len(), "presence: reader cleared");
        commit(&departures);
        drop(set);
        departures
    }

    /// Tags currently active on `reader`, ordered by id.
    pub fn active_tags(&self, reader: &ReaderId) -> Vec<TagId> {
        self.active
            .get(reader)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_active(&self, reader: &ReaderId, tag: &TagId) -> bool {
        self.active
            .get(reader)
            .is_some_and(|set| set.contains(&TagId::canonical(tag.as_str())))
    }

    /// Whether any state exists for `reader` (even an empty set).
    pub fn knows_reader(&self, reader: &ReaderId) -> bool {
        self.active.contains_key(reader)
    }

    /// Active tags of every known reader.
    pub fn snapshot(&self) -> BTreeMap<ReaderId, Vec<TagId>> {
        self.active
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().iter().cloned().collect()))
            .collect()
    }
}
