// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Directory Entry Classification
//!
//! An agent's private memory of which registry names proved to be working
//! hosts ([`Classification::Good`]) and which did not ([`Classification::Bad`]).
//!
//! # Invariants
//!
//! - A name is in at most one of the good list and the bad set.
//! - Bad names stay bad until [`Discovery::reset`]; there is no per-name
//!   rehabilitation.
//! - The good list keeps first-seen order, which selection policies use to
//!   break ties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Unknown,
    Good,
    Bad,
}

/// A directory entry as observed by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub name: String,
    pub classification: Classification,
}

/// Phases of the discovery/migration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    /// Pacing delay after arrival.
    Restraining,
    /// Listing and classifying registry names.
    Discovering,
    /// Choosing one good candidate.
    Selecting,
    /// Transfer in flight.
    Migrating,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoopPhase::Restraining => "restraining",
            LoopPhase::Discovering => "discovering",
            LoopPhase::Selecting => "selecting",
            LoopPhase::Migrating => "migrating",
        };
        f.write_str(label)
    }
}

/// Good/bad classification of registry names, owned by one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    #[serde(default)]
    good: Vec<String>,
    #[serde(default)]
    bad: BTreeSet<String>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classification(&self, name: &str) -> Classification {
        if self.bad.contains(name) {
            Classification::Bad
        } else if self.good.iter().any(|g| g == name) {
            Classification::Good
        } else {
            Classification::Unknown
        }
    }

    pub fn is_classified(&self, name: &str) -> bool {
        self.classification(name) != Classification::Unknown
    }

    /// Record `name` as a working host. Bad names are sticky and are not
    /// promoted; returns whether the name is good afterwards.
    pub fn mark_good(&mut self, name: &str) -> bool {
        match self.classification(name) {
            Classification::Bad => false,
            Classification::Good => true,
            Classification::Unknown => {
                self.good.push(name.to_string());
                true
            }
        }
    }

    /// Move `name` to the bad set, removing it from the good list.
    pub fn mark_bad(&mut self, name: &str) {
        self.good.retain(|g| g != name);
        self.bad.insert(name.to_string());
    }

    /// Forget every classification.
    pub fn reset(&mut self) {
        self.good.clear();
        self.bad.clear();
    }

    /// Good names in first-seen order.
    pub fn good(&self) -> &[String] {
        &self.good
    }

    pub fn bad(&self) -> impl Iterator<Item = &str> {
        self.bad.iter().map(String::as_str)
    }

    pub fn has_candidates(&self) -> bool {
        !self.good.is_empty()
    }

    /// All classified names as entries, good ones first.
    pub fn entries(&self) -> Vec<HostEntry> {
        self.good
            .iter()
            .map(|name| HostEntry {
                name: name.clone(),
                classification: Classification::Good,
            })
            .chain(self.bad.iter().map(|name| HostEntry {
                name: name.clone(),
                classification: Classification::Bad,
            }))
            .collect()
    }
}
