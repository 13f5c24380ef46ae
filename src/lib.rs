#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//! Request authorization gate for the Liga league platform.
//!
//! Every inbound request passes through [`AuthGate`] before any page or API
//! handler runs. The gate is three small pieces wired together:
//!
//! - [`session::SessionVerifier`] decodes the signed session token into a
//!   [`session::SessionState`], failing closed to anonymous.
//! - [`routes::RouteTable`] classifies the requested path as public,
//!   authenticated-only, or admin-only from a static ordered rule table.
//! - [`policy::decide`] maps classification and session state to exactly
//!   one outcome: pass through, redirect to login (preserving the requested
//!   path as a callback), or redirect to the dashboard.
//!
//! Everything is stateless per request; the gate types are `Clone` and safe
//! to share across workers.
//!
//! ```rust,ignore
//! use liga_gate::{AuthGate, SessionVerifier};
//!
//! let gate = AuthGate::new(SessionVerifier::with_secret(b"league-signing-key"));
//! let app = route.with(gate);
//! ```

pub mod middleware;
pub mod policy;
pub mod routes;
pub mod session;

pub use middleware::{AuthGate, GateError};
pub use policy::{decide, Decision};
pub use routes::{RouteClass, RouteTable};
pub use session::{
    CurrentSession, Role, SessionClaims, SessionState, SessionVerifier, VerifyError,
    SESSION_COOKIE, SESSION_TTL,
};
