// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the orchestration boundary.

use dotplan::CoreError;
use dotplan_domain::DomainError;
use dotplan_persistence::PersistenceError;

use crate::collab::ScopeError;

/// The user-visible error taxonomy.
///
/// Every inner error is translated explicitly; nothing is swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The user may not operate on the event.
    Forbidden {
        /// A human-readable description of the refusal.
        message: String,
    },
    /// The same position identifier appears more than once in one input
    /// batch. Rejected before any persistence attempt.
    DuplicateIdentifier {
        /// The duplicated identifier.
        pos_id: String,
    },
    /// A position identifier already exists for the event. Rejected
    /// before the transaction opens (or surfaced by the unique
    /// constraint if a concurrent insert wins the race).
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A referenced resource was not found.
    ResourceNotFound {
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
            Self::DuplicateIdentifier { pos_id } => {
                write!(f, "Duplicate position identifier in batch: '{pos_id}'")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::ResourceNotFound { message } => write!(f, "Not found: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ScopeError> for ApiError {
    fn from(err: ScopeError) -> Self {
        Self::Forbidden {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::DuplicatePosId { pos_id } => ApiError::DuplicateIdentifier { pos_id },
        DomainError::InvalidPosId(msg) => ApiError::InvalidInput {
            field: String::from("pos_id"),
            message: msg,
        },
        DomainError::InvalidQuantity { quantity } => ApiError::InvalidInput {
            field: String::from("quantity"),
            message: format!("Invalid quantity: {quantity}. Must be at least 1"),
        },
        DomainError::InvalidStaff { staff } => ApiError::InvalidInput {
            field: String::from("staff"),
            message: format!("Invalid staff count: {staff}. Must be at least 1"),
        },
        DomainError::InvalidRate { rate } => ApiError::InvalidInput {
            field: String::from("rate"),
            message: format!("Invalid rate: {rate}. Must be finite and non-negative"),
        },
        DomainError::InvalidTimezone(name) => ApiError::InvalidInput {
            field: String::from("timezone"),
            message: format!("Invalid timezone: {name}"),
        },
        DomainError::UnresolvableLocalTime { date, time } => ApiError::InvalidInput {
            field: String::from("dates"),
            message: format!(
                "Could not resolve local time {time} on {date} (ambiguous or non-existent due to DST)"
            ),
        },
        DomainError::InvalidShiftWindow { start, end } => ApiError::InvalidInput {
            field: String::from("shifts"),
            message: format!("Shift window end '{end}' must come after start '{start}'"),
        },
        DomainError::DateOutOfRange { date } => ApiError::InvalidInput {
            field: String::from("dates"),
            message: format!("Date {date} cannot be projected"),
        },
        DomainError::MixedVendorUpload => ApiError::InvalidInput {
            field: String::from("vendor"),
            message: String::from("Swap upload rows must all resolve to the same vendor"),
        },
    }
}

/// Translates a planning error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Planning error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound { message: msg },
        PersistenceError::UniqueViolation(msg) => ApiError::Conflict { message: msg },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
