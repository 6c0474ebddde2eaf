//! HTTP adapters for the hosted backend.
//!
//! - [`projects::RestProjectStore`] -- REST access to the `projects` table.
//! - [`auth::HostedAuth`] -- password / magic-link authentication.
//! - [`upload::EdgeUploader`] -- image upload through the edge function.
//!
//! All three share one [`client::BackendClient`], which carries the
//! project key and the signed-in access token.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod projects;
pub mod upload;

pub use auth::HostedAuth;
pub use client::BackendClient;
pub use config::RemoteConfig;
pub use projects::RestProjectStore;
pub use upload::EdgeUploader;
