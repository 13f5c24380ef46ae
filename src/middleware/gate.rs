//! The request authorization gate.

use http::{header::LOCATION, HeaderValue, StatusCode};
use http_kit::{
    http_error,
    middleware::MiddlewareError,
    Body, Endpoint, Middleware, Request, Response,
};

use crate::policy::{decide, Decision};
use crate::routes::RouteTable;
use crate::session::{CurrentSession, SessionVerifier};

http_error!(
    /// The gate could not assemble a redirect response.
    pub GateError,
    StatusCode::INTERNAL_SERVER_ERROR,
    "Authorization gate failed"
);

/// Middleware gating every request on session state and route class.
///
/// The gate verifies the session token, classifies the requested path, and
/// either passes the request through (storing the session state in request
/// extensions as [`CurrentSession`]) or answers with a 302 redirect to the
/// login page or the dashboard. Authorization itself never errors; every
/// request maps to exactly one outcome.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: SessionVerifier,
    routes: RouteTable,
    login_path: String,
    dashboard_path: String,
}

impl AuthGate {
    /// Create a gate with the default route table, redirecting to `/login`
    /// and `/dashboard`.
    #[must_use]
    pub fn new(verifier: SessionVerifier) -> Self {
        Self {
            verifier,
            routes: RouteTable::default(),
            login_path: "/login".to_owned(),
            dashboard_path: "/dashboard".to_owned(),
        }
    }

    /// Replace the route table.
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Override the login page anonymous requests are redirected to.
    #[must_use]
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Override the page non-admins are redirected to.
    #[must_use]
    pub fn dashboard_path(mut self, path: impl Into<String>) -> Self {
        self.dashboard_path = path.into();
        self
    }

    fn login_redirect(&self, callback: &str) -> Result<Response, GateError> {
        let query = serde_urlencoded::to_string([("callbackUrl", callback)])
            .map_err(|_| GateError::new())?;
        // The configured login path may already carry a query string.
        let separator = if self.login_path.contains('?') { '&' } else { '?' };
        redirect(&format!("{}{separator}{query}", self.login_path))
    }
}

fn redirect(location: &str) -> Result<Response, GateError> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    let location = HeaderValue::try_from(location).map_err(|_| GateError::new())?;
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}

impl Middleware for AuthGate {
    type Error = GateError;

    async fn handle<N: Endpoint>(
        &mut self,
        request: &mut Request,
        mut next: N,
    ) -> Result<Response, MiddlewareError<N::Error, Self::Error>> {
        let session = self.verifier.verify(request);
        let path = request.uri().path().to_owned();
        let class = self.routes.classify(&path);

        match decide(class, &session, &path) {
            Decision::Allow => {
                tracing::debug!(%path, ?class, "request allowed");
                request.extensions_mut().insert(CurrentSession(session));
                next.respond(request)
                    .await
                    .map_err(MiddlewareError::Endpoint)
            }
            Decision::RedirectLogin { callback } => {
                tracing::debug!(%path, "redirecting anonymous request to login");
                self.login_redirect(&callback)
                    .map_err(MiddlewareError::Middleware)
            }
            Decision::RedirectDashboard => {
                tracing::debug!(%path, "redirecting non-admin away from admin area");
                redirect(&self.dashboard_path).map_err(MiddlewareError::Middleware)
            }
        }
    }
}
