//! Static route classification.
//!
//! Every URL path belongs to exactly one policy tier. Classification is
//! derived from a fixed ordered rule table, not from stored state: public
//! rules are checked first, then the admin rules, and anything left over is
//! treated as requiring authentication. That default errs on the side of
//! locking unknown paths down rather than exposing them.

/// Policy tier a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session.
    Public,
    /// Requires any valid session.
    Authenticated,
    /// Requires a session with the admin role.
    AdminOnly,
}

#[derive(Debug, Clone)]
struct PublicRule {
    pattern: String,
    exact: bool,
}

impl PublicRule {
    fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            exact: true,
        }
    }

    fn prefix(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            exact: false,
        }
    }

    fn matches(&self, path: &str) -> bool {
        if self.exact {
            path == self.pattern
        } else {
            path.starts_with(&self.pattern)
        }
    }
}

/// Ordered rule table mapping paths to a [`RouteClass`].
///
/// The default table covers the league application's surface: the landing
/// page is public by exact match, the login, registration, and auth API
/// surfaces are public by prefix, and the whole `/admin` area is admin-only.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<PublicRule>,
    admin: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: vec![
                PublicRule::exact("/"),
                PublicRule::prefix("/login"),
                PublicRule::prefix("/registar"),
                PublicRule::prefix("/api/auth"),
            ],
            admin: vec!["/admin".to_owned()],
        }
    }
}

impl RouteTable {
    /// The default table for the league application.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match public path.
    #[must_use]
    pub fn public_path(mut self, path: impl Into<String>) -> Self {
        self.public.push(PublicRule::exact(path));
        self
    }

    /// Add a public path prefix.
    #[must_use]
    pub fn public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public.push(PublicRule::prefix(prefix));
        self
    }

    /// Add an admin-only path prefix.
    #[must_use]
    pub fn admin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.admin.push(prefix.into());
        self
    }

    /// Classify a request path.
    ///
    /// Rule order is significant: public rules are checked before admin
    /// rules, and the first match wins.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.public.iter().any(|rule| rule.matches(path)) {
            return RouteClass::Public;
        }
        if self.admin.iter().any(|prefix| path.starts_with(prefix)) {
            return RouteClass::AdminOnly;
        }
        RouteClass::Authenticated
    }
}
