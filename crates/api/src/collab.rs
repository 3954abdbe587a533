// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator contracts.
//!
//! The orchestrator consumes three external collaborators. Their
//! internals are out of scope; each is an explicit dependency passed in
//! at construction time so tests can substitute fakes without a DI
//! framework.

use std::collections::HashMap;

use thiserror::Error;

/// The authorization scope of one event, as resolved for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventScope {
    pub company_id: i64,
    pub subcompany_ids: Vec<i64>,
    /// The event's IANA timezone name.
    pub timezone: String,
}

/// Raised when a user may not operate on an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeError {
    pub user: String,
    pub event_id: i64,
}

impl std::fmt::Display for ScopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User '{}' is not allowed to operate on event {}",
            self.user, self.event_id
        )
    }
}

impl std::error::Error for ScopeError {}

/// Resolves a user's scope for an event, or refuses.
///
/// The orchestrator calls this once per mutation before touching data.
pub trait ScopeResolver {
    /// # Errors
    ///
    /// Returns an error if the user may not operate on the event.
    fn resolve(&mut self, user: &str, event_id: i64) -> Result<EventScope, ScopeError>;
}

/// The lookup entity kinds the orchestrator resolves by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Vendor,
    Area,
    Position,
    PositionName,
}

impl LookupKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Area => "area",
            Self::Position => "position",
            Self::PositionName => "position_name",
        }
    }
}

/// Failure of the lookup resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lookup resolution failed for {kind}: {message}")]
pub struct LookupError {
    pub kind: &'static str,
    pub message: String,
}

/// Idempotent batch resolve-or-create of lookup records by
/// human-readable name within a company.
pub trait LookupResolver {
    /// Returns the id of every requested name, creating records as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the names cannot be resolved or created.
    fn resolve_or_create(
        &mut self,
        kind: LookupKind,
        company_id: i64,
        names: &[String],
    ) -> Result<HashMap<String, i64>, LookupError>;
}

/// Failure of the notification collaborator.
///
/// Notification is fire-and-forget: these errors are logged by the
/// orchestrator, never surfaced to the caller, and never roll back data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("Notification channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Real-time notification collaborator, invoked only after a successful
/// commit.
pub trait Notifier {
    /// # Errors
    ///
    /// Returns an error if delivery fails; the orchestrator logs and
    /// drops it.
    fn notify(
        &mut self,
        event_id: i64,
        operation: &str,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError>;
}
