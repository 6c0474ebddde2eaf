//! Folio client library.
//!
//! Exposes the session, orchestrator and supporting stores so the `folio`
//! binary and integration tests can both use them.
//!
//! - [`session::Session`] -- identity, guest flag and the derived role.
//! - [`orchestrator::ProjectOrchestrator`] -- listing, search/sort state and
//!   permission-gated mutations.
//! - [`form::ProjectForm`] -- modal draft with per-field validation state.
//! - [`memory::InMemoryBackend`] -- in-process backend enforcing the hosted
//!   access policy.

pub mod config;
pub mod error;
pub mod form;
pub mod guest;
pub mod memory;
pub mod orchestrator;
pub mod session;
