//! Session token model and verification.
//!
//! A session is carried as a signed JWT issued at login. The gate only ever
//! *verifies* tokens; issuing and signing them is the login service's job.
//! [`SessionVerifier`] turns an incoming request into a [`SessionState`],
//! failing closed to [`SessionState::Anonymous`] on any validation problem.
//!
//! # Example
//!
//! ```rust,ignore
//! use liga_gate::session::{SessionVerifier, SessionState};
//!
//! let verifier = SessionVerifier::with_secret(b"league-signing-key");
//! match verifier.verify(&request) {
//!     SessionState::Authenticated(claims) => println!("hello {}", claims.sub),
//!     SessionState::Anonymous => println!("hello stranger"),
//! }
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http_kit::Request;
use serde::{Deserialize, Serialize};

mod verifier;

pub use verifier::{SessionVerifier, VerifyError, SESSION_COOKIE};

/// How long a session token stays valid after it is issued.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Role carried by a session token.
///
/// Roles form a closed set; a token carrying any other role string fails
/// deserialization and the request is treated as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access, including the admin area.
    Admin,
    /// A regular league member.
    User,
}

/// Claims carried by a session token.
///
/// Immutable once issued; claims only change when the login service issues a
/// fresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id the token was issued to.
    pub sub: String,
    /// Role of the user at issue time.
    pub role: Role,
    /// Player record linked to this account, if any.
    #[serde(
        rename = "linkedPlayerId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_player_id: Option<String>,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

impl SessionClaims {
    /// Create claims for a freshly issued session, expiring after
    /// [`SESSION_TTL`].
    #[must_use]
    pub fn new(sub: impl Into<String>, role: Role, linked_player_id: Option<String>) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            sub: sub.into(),
            role,
            linked_player_id,
            iat: now,
            exp: now + SESSION_TTL.as_secs(),
        }
    }
}

/// Outcome of verifying the session token on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No acceptable token was presented.
    Anonymous,
    /// The token verified; these are its claims.
    Authenticated(SessionClaims),
}

impl SessionState {
    /// Whether the request carried a valid session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Whether the session belongs to an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Authenticated(claims) if claims.role == Role::Admin)
    }

    /// The verified claims, if any.
    #[must_use]
    pub const fn claims(&self) -> Option<&SessionClaims> {
        match self {
            Self::Authenticated(claims) => Some(claims),
            Self::Anonymous => None,
        }
    }
}

/// Session state the gate stored in request extensions after an allow.
///
/// Handlers read it back with [`CurrentSession::of`]; a request that never
/// went through the gate (or was anonymous on a public route) reads as
/// [`SessionState::Anonymous`].
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionState);

impl std::ops::Deref for CurrentSession {
    type Target = SessionState;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CurrentSession {
    /// Read the session state stored on a request.
    #[must_use]
    pub fn of(request: &Request) -> SessionState {
        request
            .extensions()
            .get::<Self>()
            .map_or(SessionState::Anonymous, |current| current.0.clone())
    }
}
