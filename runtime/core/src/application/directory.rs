// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Player Directory
//!
//! The per-host map of resident players, keyed by uuid.
//!
//! A player that leaves never notifies the directory. Its handle is marked
//! departed by its own task, and departed entries are purged the next time
//! anyone touches the directory. Readers may still act on a handle that went
//! stale after the snapshot was taken; the handle's own flags make that
//! harmless.
//!
//! Lock order is directory first, then handle.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::player::{PlayerHandle, PlayerId, PlayerSnapshot, TagOutcome};

#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: Mutex<HashMap<PlayerId, PlayerHandle>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map with departed entries already purged.
    fn live(&self) -> MutexGuard<'_, HashMap<PlayerId, PlayerHandle>> {
        let mut players = self.players.lock();
        let before = players.len();
        players.retain(|id, handle| {
            let keep = !handle.is_departed();
            if !keep {
                debug!(player = %id, "Purging departed player");
            }
            keep
        });
        if players.len() != before {
            metrics::gauge!("tagnet_resident_players").set(players.len() as f64);
        }
        players
    }

    /// Insert an arriving player, replacing any stale entry for the same uuid.
    pub fn insert(&self, handle: PlayerHandle) {
        let mut players = self.live();
        if let Some(previous) = players.insert(handle.id(), handle) {
            debug!(player = %previous.id(), "Replaced stale directory entry");
        }
        metrics::gauge!("tagnet_resident_players").set(players.len() as f64);
    }

    pub fn get(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.live().get(&id).cloned()
    }

    /// Tag transition on behalf of the resident player `id`.
    pub fn tag(&self, id: PlayerId) -> TagOutcome {
        let players = self.live();
        match players.get(&id) {
            Some(handle) => handle.try_tag(),
            None => TagOutcome::NotResident,
        }
    }

    /// Live handles of every resident, in the map's iteration order.
    pub fn residents(&self) -> Vec<PlayerHandle> {
        self.live().values().cloned().collect()
    }

    pub fn snapshot(&self) -> HashMap<PlayerId, PlayerSnapshot> {
        self.live()
            .iter()
            .map(|(id, handle)| (*id, handle.snapshot()))
            .collect()
    }

    pub fn names(&self) -> HashMap<PlayerId, String> {
        self.live()
            .iter()
            .map(|(id, handle)| (*id, handle.name().to_string()))
            .collect()
    }

    pub fn tagged_status(&self) -> HashMap<PlayerId, bool> {
        self.live()
            .iter()
            .map(|(id, handle)| (*id, handle.is_tagged()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.live().len()
    }
}
