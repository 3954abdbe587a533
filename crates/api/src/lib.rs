// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Orchestration boundary for the Dotplan deployment engine.
//!
//! This crate composes the planning engine and the persistence layer
//! into the bulk mutation operations (upload, clone, copy, swap, bulk
//! update, single update, delete, reset) behind a small API surface.
//!
//! External collaborators — authorization scope resolution, lookup
//! resolve-or-create, and post-commit notification — are explicit
//! dependencies injected into [`Deployments`]; there are no service
//! singletons.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod collab;
mod deployments;
mod error;
mod request_response;

#[cfg(test)]
mod tests;

pub use collab::{
    EventScope, LookupError, LookupKind, LookupResolver, Notifier, NotifyError, ScopeError,
    ScopeResolver,
};
pub use deployments::Deployments;
pub use error::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};
pub use request_response::{
    BulkShiftChange, BulkUpdateRequest, BulkUpdateResponse, CloneRequest, CloneResponse,
    CopyRequest, CopyResponse, DotUploadRequest, DotUploadRow, ResetRequest, ResetResponse,
    ShiftTemplateUpload, ShiftUpload, SwapRequest, SwapResponse, UpdateDotRequest, UploadResponse,
};
