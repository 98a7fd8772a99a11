//! Actor registry
//!
//! Authoritative set of actors seen in the last successful scan, keyed by
//! stable id, each with its resolved [`OverlaySettings`] alongside.

use glam::Vec3;
use hashbrown::HashMap;

use crate::filter::OverlaySettings;
use crate::layout::{ActorId, ActorRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ActorEntry {
    pub record: ActorRecord,
    pub settings: OverlaySettings,
}

/// Membership change produced by one update. `added` and `removed` are
/// always disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDiff {
    pub added: Vec<ActorId>,
    pub removed: Vec<ActorId>,
}

impl RegistryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ActorRegistry {
    entries: HashMap<ActorId, ActorEntry>,
    /// Scan order of the last update
    order: Vec<ActorId>,
    highlighted: Option<ActorId>,
}

/// Fill in `local_distance` relative to the local player in the scan
fn assign_distances(scan: &mut [ActorRecord]) {
    let origin: Option<Vec3> = scan.iter().find(|a| a.is_local_player()).map(|a| a.position);

    for actor in scan.iter_mut() {
        actor.local_distance = match origin {
            _ if actor.is_local_player() => 0.0,
            Some(origin) => origin.distance(actor.position),
            None => f32::INFINITY,
        };
    }
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorEntry> {
        self.entries.get(&id)
    }

    /// Entries in scan order
    pub fn iter(&self) -> impl Iterator<Item = &ActorEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn local_player(&self) -> Option<&ActorEntry> {
        self.iter().find(|e| e.record.is_local_player())
    }

    pub fn highlighted(&self) -> Option<ActorId> {
        self.highlighted
    }

    /// Replace membership with a new scan.
    ///
    /// Actors present before and after keep their settings (including the
    /// highlight) and get their record refreshed. New actors get settings
    /// from `resolve`.
    pub fn update<F>(&mut self, mut scan: Vec<ActorRecord>, mut resolve: F) -> RegistryDiff
    where
        F: FnMut(&ActorRecord) -> OverlaySettings,
    {
        assign_distances(&mut scan);

        let mut next = HashMap::with_capacity(scan.len());
        let mut order = Vec::with_capacity(scan.len());
        let mut diff = RegistryDiff::default();

        for record in scan {
            let id = record.stable_id;
            let settings = match self.entries.remove(&id) {
                Some(previous) => previous.settings,
                None => {
                    diff.added.push(id);
                    resolve(&record)
                }
            };
            order.push(id);
            next.insert(id, ActorEntry { record, settings });
        }

        // Whatever wasn't claimed by the scan is gone
        diff.removed = self
            .order
            .iter()
            .copied()
            .filter(|id| self.entries.contains_key(id))
            .collect();

        if self.highlighted.is_some_and(|id| !next.contains_key(&id)) {
            self.highlighted = None;
        }

        self.entries = next;
        self.order = order;
        diff
    }

    /// Drop every actor, returning the removed ids in scan order
    pub fn clear(&mut self) -> Vec<ActorId> {
        self.entries.clear();
        self.highlighted = None;
        std::mem::take(&mut self.order)
    }

    /// Recompute settings for every actor, keeping the highlight
    pub fn reresolve<F>(&mut self, mut resolve: F)
    where
        F: FnMut(&ActorRecord) -> OverlaySettings,
    {
        for entry in self.entries.values_mut() {
            let highlighted = entry.settings.highlighted;
            entry.settings = resolve(&entry.record);
            entry.settings.highlighted = highlighted;
        }
    }

    /// Select at most one actor. Returns false if `id` is not tracked.
    pub fn set_highlighted(&mut self, id: Option<ActorId>) -> bool {
        if let Some(id) = id
            && !self.entries.contains_key(&id)
        {
            return false;
        }

        if let Some(previous) = self.highlighted.take()
            && let Some(entry) = self.entries.get_mut(&previous)
        {
            entry.settings.highlighted = false;
        }
        if let Some(id) = id
            && let Some(entry) = self.entries.get_mut(&id)
        {
            entry.settings.highlighted = true;
            self.highlighted = Some(id);
        }
        true
    }
}
