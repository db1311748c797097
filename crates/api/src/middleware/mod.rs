//! Authentication middleware extractors.
//!
//! - [`auth::RequireAuth`] -- Requires the shared-secret bearer credential.

pub mod auth;
