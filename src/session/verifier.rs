//! Session token verification.

use cookie::Cookie;
use http_kit::{header, Request};
use jsonwebtoken::{decode, DecodingKey, Validation};
use thiserror::Error;

use super::{SessionClaims, SessionState};

/// Default name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "liga_session";

/// Verifies the session token presented on a request.
///
/// Tokens are looked up in the session cookie first, then in an
/// `Authorization: Bearer` header. Verification is a local cryptographic
/// check with no side effects; any failure folds to
/// [`SessionState::Anonymous`].
#[derive(Clone)]
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("validation", &self.validation)
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl SessionVerifier {
    /// Create a verifier for tokens signed with an HMAC secret.
    ///
    /// Uses HS256, the algorithm the login service signs with.
    #[must_use]
    pub fn with_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            cookie_name: SESSION_COOKIE.to_owned(),
        }
    }

    /// Set the leeway (in seconds) applied to time-based claims.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: u64) -> Self {
        self.validation.leeway = leeway;
        self
    }

    /// Disable expiry validation.
    ///
    /// # Warning
    ///
    /// Only use this for testing or when you handle expiry yourself.
    #[must_use]
    pub const fn without_expiration_validation(mut self) -> Self {
        self.validation.validate_exp = false;
        self
    }

    /// Override the name of the session cookie.
    #[must_use]
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    fn raw_token(&self, request: &Request) -> Option<String> {
        // HTTP/2 clients may split cookies across several Cookie headers.
        for value in request.headers().get_all(header::COOKIE) {
            if let Ok(value) = value.to_str() {
                for cookie in Cookie::split_parse_encoded(value).flatten() {
                    if cookie.name() == self.cookie_name {
                        return Some(cookie.value().to_owned());
                    }
                }
            }
        }

        let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
        value.strip_prefix("Bearer ").map(str::to_owned)
    }

    /// Verify the token on a request, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] when no token is presented or the presented
    /// token does not verify.
    pub fn check(&self, request: &Request) -> Result<SessionClaims, VerifyError> {
        let token = self.raw_token(request).ok_or(VerifyError::Missing)?;
        let data = decode::<SessionClaims>(&token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify the token on a request, failing closed.
    ///
    /// Never errors: a missing, malformed, expired, or forged token all
    /// produce [`SessionState::Anonymous`].
    #[must_use]
    pub fn verify(&self, request: &Request) -> SessionState {
        match self.check(request) {
            Ok(claims) => SessionState::Authenticated(claims),
            Err(VerifyError::Missing) => SessionState::Anonymous,
            Err(error) => {
                tracing::debug!(%error, "rejected session token");
                SessionState::Anonymous
            }
        }
    }
}

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No token was presented in the cookie or the Authorization header.
    #[error("no session token on the request")]
    Missing,
    /// The token signature does not match the signing key.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The token has expired.
    #[error("token has expired")]
    Expired,
    /// The token payload is malformed or carries unacceptable claims.
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::{AUTHORIZATION, COOKIE};
    use http_kit::{Body, Request};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    use super::{SessionVerifier, VerifyError, SESSION_COOKIE};
    use crate::session::{Role, SessionClaims, SessionState};

    const SECRET: &[u8] = b"test-signing-key";

    fn sign(claims: &impl Serialize, secret: &[u8]) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn request_with_cookie(token: &str) -> Request {
        let mut request = Request::new(Body::empty());
        request.headers_mut().insert(
            COOKIE,
            format!("{SESSION_COOKIE}={token}").parse().unwrap(),
        );
        request
    }

    #[test]
    fn cookie_token_verifies() {
        let claims = SessionClaims::new("user-1", Role::User, Some("player-9".to_owned()));
        let request = request_with_cookie(&sign(&claims, SECRET));

        let state = SessionVerifier::with_secret(SECRET).verify(&request);
        assert_eq!(state, SessionState::Authenticated(claims));
    }

    #[test]
    fn bearer_token_verifies() {
        let claims = SessionClaims::new("user-1", Role::Admin, None);
        let token = sign(&claims, SECRET);

        let mut request = Request::new(Body::empty());
        request
            .headers_mut()
            .insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

        let state = SessionVerifier::with_secret(SECRET).verify(&request);
        assert!(state.is_admin());
    }

    #[test]
    fn cookie_wins_over_header() {
        let cookie_claims = SessionClaims::new("cookie-user", Role::User, None);
        let header_claims = SessionClaims::new("header-user", Role::Admin, None);

        let mut request = request_with_cookie(&sign(&cookie_claims, SECRET));
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Bearer {}", sign(&header_claims, SECRET))
                .parse()
                .unwrap(),
        );

        let state = SessionVerifier::with_secret(SECRET).verify(&request);
        assert_eq!(state.claims().map(|c| c.sub.as_str()), Some("cookie-user"));
    }

    #[test]
    fn session_cookie_in_a_later_cookie_header_verifies() {
        let claims = SessionClaims::new("user-1", Role::User, None);
        let token = sign(&claims, SECRET);

        let mut request = Request::new(Body::empty());
        request
            .headers_mut()
            .append(COOKIE, "theme=dark".parse().unwrap());
        request.headers_mut().append(
            COOKIE,
            format!("{SESSION_COOKIE}={token}").parse().unwrap(),
        );

        let state = SessionVerifier::with_secret(SECRET).verify(&request);
        assert_eq!(state, SessionState::Authenticated(claims));
    }

    #[test]
    fn missing_token_is_anonymous() {
        let verifier = SessionVerifier::with_secret(SECRET);
        let request = Request::new(Body::empty());

        assert_eq!(verifier.check(&request), Err(VerifyError::Missing));
        assert_eq!(verifier.verify(&request), SessionState::Anonymous);
    }

    #[test]
    fn non_bearer_scheme_is_anonymous() {
        let mut request = Request::new(Body::empty());
        request
            .headers_mut()
            .insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(verifier.check(&request), Err(VerifyError::Missing));
    }

    #[test]
    fn forged_signature_fails_closed() {
        let claims = SessionClaims::new("user-1", Role::Admin, None);
        let request = request_with_cookie(&sign(&claims, b"some-other-key"));

        let verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(verifier.check(&request), Err(VerifyError::InvalidSignature));
        assert_eq!(verifier.verify(&request), SessionState::Anonymous);
    }

    #[test]
    fn expired_token_fails_closed() {
        let mut claims = SessionClaims::new("user-1", Role::User, None);
        claims.iat = 0;
        claims.exp = 1;
        let request = request_with_cookie(&sign(&claims, SECRET));

        let verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(verifier.check(&request), Err(VerifyError::Expired));
        assert_eq!(verifier.verify(&request), SessionState::Anonymous);
    }

    #[test]
    fn expired_token_passes_without_expiration_validation() {
        let mut claims = SessionClaims::new("user-1", Role::User, None);
        claims.iat = 0;
        claims.exp = 1;
        let request = request_with_cookie(&sign(&claims, SECRET));

        let verifier = SessionVerifier::with_secret(SECRET).without_expiration_validation();
        assert!(verifier.verify(&request).is_authenticated());
    }

    #[test]
    fn unknown_role_fails_closed() {
        #[derive(Serialize)]
        struct ForeignClaims {
            sub: String,
            role: String,
            iat: u64,
            exp: u64,
        }

        let claims = ForeignClaims {
            sub: "user-1".to_owned(),
            role: "REFEREE".to_owned(),
            iat: 0,
            exp: u64::MAX,
        };
        let request = request_with_cookie(&sign(&claims, SECRET));

        let verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(verifier.check(&request), Err(VerifyError::Malformed));
        assert_eq!(verifier.verify(&request), SessionState::Anonymous);
    }

    #[test]
    fn garbage_token_fails_closed() {
        let request = request_with_cookie("not-a-jwt");

        let verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(verifier.check(&request), Err(VerifyError::Malformed));
        assert_eq!(verifier.verify(&request), SessionState::Anonymous);
    }

    #[test]
    fn custom_cookie_name_is_honored() {
        let claims = SessionClaims::new("user-1", Role::User, None);
        let token = sign(&claims, SECRET);

        let mut request = Request::new(Body::empty());
        request
            .headers_mut()
            .insert(COOKIE, format!("session-token={token}").parse().unwrap());

        let verifier = SessionVerifier::with_secret(SECRET).cookie_name("session-token");
        assert!(verifier.verify(&request).is_authenticated());

        // The default name no longer matches anything on this request.
        let default_verifier = SessionVerifier::with_secret(SECRET);
        assert_eq!(default_verifier.verify(&request), SessionState::Anonymous);
    }
}
