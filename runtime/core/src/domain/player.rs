// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Tag Game Players
//!
//! - [`PlayerId`]: stable identity, assigned once at first launch.
//! - [`PlayerState`]: the serializable record a Player migrates with.
//! - [`PlayerHandle`]: the live, shared view of a resident Player. The
//!   running agent and its host's directory hold clones of the same handle,
//!   so a tag applied through the host is seen by the agent immediately.
//! - [`PlayerSnapshot`]: read-only copy handed out by directory queries.
//!
//! # Invariants
//!
//! - [`PlayerHandle::try_tag`] is the only not-tagged → tagged transition and
//!   is serialized per player by the handle's mutex: of any number of
//!   concurrent attempts at most one succeeds.
//! - A handle whose `migrating` or `departed` flag is set cannot be tagged.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::agent::DexterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a tag transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// The target went from not tagged to tagged.
    Tagged,
    /// No such player is resident (never arrived, or already left).
    NotResident,
    /// The target is already tagged or in flight.
    Conflict,
}

impl TagOutcome {
    pub fn is_tagged(&self) -> bool {
        matches!(self, TagOutcome::Tagged)
    }
}

/// Resume record of a Player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub core: DexterState,
    pub uuid: PlayerId,
    pub display_name: String,
    #[serde(default)]
    pub tagged: bool,
    #[serde(default)]
    pub migrating: bool,
    /// Service name of the host the player believes it occupies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_host: Option<String>,
}

impl PlayerState {
    /// A brand new player with a fresh identity.
    pub fn new(core: DexterState, display_name: Option<String>, tagged: bool) -> Self {
        let uuid = PlayerId::new();
        let display_name = display_name.unwrap_or_else(|| default_display_name(uuid));
        Self {
            core,
            uuid,
            display_name,
            tagged,
            migrating: false,
            current_host: None,
        }
    }
}

/// `player-` followed by the first eight characters of the uuid.
pub fn default_display_name(id: PlayerId) -> String {
    let simple = id.0.simple().to_string();
    format!("player-{}", &simple[..8])
}

#[derive(Debug, Clone, Copy, Default)]
struct PlayerFlags {
    tagged: bool,
    migrating: bool,
    departed: bool,
}

#[derive(Debug)]
struct PlayerShared {
    id: PlayerId,
    name: String,
    arrived_at: DateTime<Utc>,
    flags: Mutex<PlayerFlags>,
}

/// Live, shared handle on a resident Player.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    inner: Arc<PlayerShared>,
}

impl PlayerHandle {
    pub fn new(id: PlayerId, name: impl Into<String>, tagged: bool) -> Self {
        Self::with_flags(
            id,
            name.into(),
            PlayerFlags {
                tagged,
                ..PlayerFlags::default()
            },
        )
    }

    /// Rebuild the live handle from a record that just arrived.
    pub fn from_state(state: &PlayerState) -> Self {
        Self::with_flags(
            state.uuid,
            state.display_name.clone(),
            PlayerFlags {
                tagged: state.tagged,
                migrating: state.migrating,
                departed: false,
            },
        )
    }

    fn with_flags(id: PlayerId, name: String, flags: PlayerFlags) -> Self {
        Self {
            inner: Arc::new(PlayerShared {
                id,
                name,
                arrived_at: Utc::now(),
                flags: Mutex::new(flags),
            }),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_tagged(&self) -> bool {
        self.inner.flags.lock().tagged
    }

    pub fn is_migrating(&self) -> bool {
        self.inner.flags.lock().migrating
    }

    pub fn is_departed(&self) -> bool {
        self.inner.flags.lock().departed
    }

    /// Eligible to be tagged right now: present, not tagged, not in flight.
    pub fn is_eligible_target(&self) -> bool {
        let flags = self.inner.flags.lock();
        !flags.tagged && !flags.migrating && !flags.departed
    }

    /// Atomic not-tagged → tagged transition.
    pub fn try_tag(&self) -> TagOutcome {
        let mut flags = self.inner.flags.lock();
        if flags.departed {
            return TagOutcome::NotResident;
        }
        if flags.tagged || flags.migrating {
            return TagOutcome::Conflict;
        }
        flags.tagged = true;
        TagOutcome::Tagged
    }

    /// Clear the tag, e.g. after this player passed it on.
    pub fn reset_tag(&self) {
        self.inner.flags.lock().tagged = false;
    }

    pub fn clear_migrating(&self) {
        self.inner.flags.lock().migrating = false;
    }

    /// Enter flight. Returns the tag flag as frozen for the transfer; it
    /// cannot change while `migrating` is set.
    pub fn begin_migration(&self) -> bool {
        let mut flags = self.inner.flags.lock();
        flags.migrating = true;
        flags.tagged
    }

    /// The transfer failed; the player is back to normal on this host.
    pub fn abort_migration(&self) {
        self.inner.flags.lock().migrating = false;
    }

    /// The player's unit of execution on this host has ended.
    pub fn mark_departed(&self) {
        let mut flags = self.inner.flags.lock();
        flags.departed = true;
        flags.migrating = false;
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let flags = *self.inner.flags.lock();
        PlayerSnapshot {
            uuid: self.inner.id,
            name: self.inner.name.clone(),
            tagged: flags.tagged,
            migrating: flags.migrating,
            arrived_at: self.inner.arrived_at,
        }
    }

    /// Two handles refer to the same live player instance.
    pub fn same_instance(&self, other: &PlayerHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Read-only view of a resident Player at some instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub uuid: PlayerId,
    pub name: String,
    pub tagged: bool,
    pub migrating: bool,
    pub arrived_at: DateTime<Utc>,
}
