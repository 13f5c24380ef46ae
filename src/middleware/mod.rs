//! Middleware applied to every inbound request.
//!
//! The gate is a standard [`http_kit::Middleware`]: it either lets the
//! request through to the next endpoint or answers with a redirect itself.
//!
//! ```rust,ignore
//! use liga_gate::{AuthGate, SessionVerifier};
//!
//! let gate = AuthGate::new(SessionVerifier::with_secret(b"league-signing-key"));
//! let app = route.with(gate);
//! ```

mod gate;

pub use gate::{AuthGate, GateError};
pub use http_kit::middleware::Middleware;
