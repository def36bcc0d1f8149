// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Error Taxonomy
//!
//! Every failure a host, the registry, or a migrating agent can observe.
//! All of them are recoverable from the agent's point of view: the
//! migration loop consumes [`MigrationError`] and either drops one candidate
//! or resets its whole classification. Nothing here is process-fatal.

use thiserror::Error;

/// Failures reported by an execution host (local or remote).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The agent kind has no entry point with this name and arity.
    #[error("no entry point '{entry_point}' taking {arity} argument(s) on {kind} agent")]
    NoSuchEntryPoint {
        kind: String,
        entry_point: String,
        arity: usize,
    },

    /// The host could not be reached (connection refused, timeout, host down).
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// The host answered but refused the request.
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Failures reported by the name registry collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    #[error("name not bound in registry: {0}")]
    NotFound(String),

    /// The registry answered for this one name but refused it or returned
    /// a binding that cannot be used.
    #[error("registry refused name: {0}")]
    Rejected(String),

    /// The registry backend cannot bind this kind of host handle
    /// (e.g. an in-process host without an endpoint URL on an HTTP registry).
    #[error("registry cannot bind '{0}': host handle has no endpoint")]
    Unsupported(String),
}

/// Outcome classes of a failed migration attempt.
///
/// `DirectoryUnreachable` is systemic and discards the whole good/bad
/// classification. The remaining variants are localized to one candidate,
/// which is reclassified bad.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("directory unreachable: {0}")]
    DirectoryUnreachable(String),

    #[error("candidate {name} rejected the agent: {reason}")]
    CandidateRejected { name: String, reason: String },

    #[error("candidate {name} unreachable: {reason}")]
    CandidateUnreachable { name: String, reason: String },

    #[error("candidate {name} has no entry point '{entry_point}'")]
    NoSuchEntryPoint { name: String, entry_point: String },
}

impl MigrationError {
    /// Map a host-side failure for candidate `name` into the migration taxonomy.
    pub fn from_host(name: &str, err: HostError) -> Self {
        match err {
            HostError::NoSuchEntryPoint { entry_point, .. } => Self::NoSuchEntryPoint {
                name: name.to_string(),
                entry_point,
            },
            HostError::Unreachable(reason) => Self::CandidateUnreachable {
                name: name.to_string(),
                reason,
            },
            HostError::Rejected(reason) => Self::CandidateRejected {
                name: name.to_string(),
                reason,
            },
        }
    }

    /// Map a registry failure met while resolving candidate `name`.
    pub fn from_registry(name: &str, err: RegistryError) -> Self {
        match err {
            RegistryError::Unreachable(reason) => Self::DirectoryUnreachable(reason),
            RegistryError::NotFound(reason)
            | RegistryError::Rejected(reason)
            | RegistryError::Unsupported(reason) => {
                Self::CandidateUnreachable {
                    name: name.to_string(),
                    reason,
                }
            }
        }
    }

    /// True when the whole classification must be discarded.
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::DirectoryUnreachable(_))
    }

    /// The candidate this failure is attributed to, if it is localized.
    pub fn candidate(&self) -> Option<&str> {
        match self {
            Self::DirectoryUnreachable(_) => None,
            Self::CandidateRejected { name, .. }
            | Self::CandidateUnreachable { name, .. }
            | Self::NoSuchEntryPoint { name, .. } => Some(name),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DirectoryUnreachable(_) => "directory_unreachable",
            Self::CandidateRejected { .. } => "candidate_rejected",
            Self::CandidateUnreachable { .. } => "candidate_unreachable",
            Self::NoSuchEntryPoint { .. } => "no_such_entry_point",
        }
    }
}
