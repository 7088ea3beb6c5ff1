//! Authentication strategies layered on top of [`Client`](crate::client::Client).
//!
//! - [`basic`]: fixed `Basic` credentials computed once at construction.
//! - [`bearer`]: a caller callback supplies a fresh bearer token for every request, optionally
//!   from the client's bound context.
//! - [`access_token`]: a per-call plugin forwarding a pre-issued token to the host named by its
//!   issuer.
//! - [`multi_realm`]: an OIDC provider is asked for a token per call, scoped to a realm.

pub mod access_token;
pub mod basic;
pub mod bearer;
pub mod multi_realm;

pub use multi_realm::*;
