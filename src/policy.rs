//! The authorization decision.
//!
//! [`decide`] is the pure transition function at the heart of the gate: it
//! combines a route classification with the verified session state and maps
//! every combination to exactly one [`Decision`]. It holds no state and
//! performs no I/O; the session state is passed in explicitly rather than
//! read from anything ambient.

use crate::routes::RouteClass;
use crate::session::{Role, SessionState};

/// Outcome of evaluating a request against the gate policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed to its handler.
    Allow,
    /// Send the client to the login page, preserving the originally
    /// requested path so login can forward the user after success.
    RedirectLogin {
        /// The path the client originally asked for.
        callback: String,
    },
    /// Send an authenticated non-admin away from the admin area.
    RedirectDashboard,
}

/// Map a classification and session state to a decision.
///
/// `path` is the originally requested path, carried into
/// [`Decision::RedirectLogin`] as the login callback.
#[must_use]
pub fn decide(class: RouteClass, session: &SessionState, path: &str) -> Decision {
    match (class, session) {
        (RouteClass::Public, _) => Decision::Allow,
        (RouteClass::Authenticated | RouteClass::AdminOnly, SessionState::Anonymous) => {
            Decision::RedirectLogin {
                callback: path.to_owned(),
            }
        }
        (RouteClass::Authenticated, SessionState::Authenticated(_)) => Decision::Allow,
        (RouteClass::AdminOnly, SessionState::Authenticated(claims)) => {
            if claims.role == Role::Admin {
                Decision::Allow
            } else {
                Decision::RedirectDashboard
            }
        }
    }
}
