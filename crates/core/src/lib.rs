//! Folio domain logic.
//!
//! Roles, visibility, permissions, search/sort and form validation for the
//! project catalog, plus the collaborator traits the client orchestrates.
//! Nothing in this crate performs I/O.

pub mod backend;
pub mod error;
pub mod permissions;
pub mod project;
pub mod roles;
pub mod search;
pub mod types;
pub mod upload;
pub mod validation;
pub mod visibility;
