//! Route-level access policy.
//!
//! - No I/O
//! - No panics
//! - No state of its own (callers re-evaluate on every navigation and on
//!   every session change)

use crate::Role;

/// Route where unauthenticated traffic is sent (history-replace, not push).
pub const LOGIN_ROUTE: &str = "/login";

/// Fallback route when an authenticated session has no usable role.
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// The slice of session state the guard consumes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GuardState {
    /// True until the boot-time silent refresh has settled. While set, the
    /// guard refuses to make a pass/fail decision.
    pub initializing: bool,
    pub authenticated: bool,
    pub role: Option<Role>,
}

/// Outcome of a guard evaluation — exactly one per navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Still booting: render a loading placeholder, decide nothing.
    Loading,
    /// Not authenticated: replace-redirect to [`LOGIN_ROUTE`].
    RedirectLogin,
    /// Authenticated but not allowed here: send to the role's own landing.
    RedirectHome(Role),
    /// Authenticated, not allowed, and no usable role to land on.
    RedirectUnauthorized,
    /// Render the requested route.
    Render,
}

impl RouteAccess {
    /// The redirect target, when the decision is a redirect.
    pub fn target_route(&self) -> Option<&'static str> {
        match self {
            RouteAccess::Loading | RouteAccess::Render => None,
            RouteAccess::RedirectLogin => Some(LOGIN_ROUTE),
            RouteAccess::RedirectHome(role) => Some(landing_route(*role)),
            RouteAccess::RedirectUnauthorized => Some(UNAUTHORIZED_ROUTE),
        }
    }
}

/// Default landing route per role.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Admin => "/",
        Role::Distributer => "/distribution",
        Role::Publisher => "/posts",
        Role::Deliverer => "/delivery",
    }
}

/// Decide access for a route with an optional role allow-list.
///
/// An empty `allowed` slice means the route only requires authentication.
pub fn route_access(state: &GuardState, allowed: &[Role]) -> RouteAccess {
    if state.initializing {
        return RouteAccess::Loading;
    }
    if !state.authenticated {
        return RouteAccess::RedirectLogin;
    }
    if allowed.is_empty() {
        return RouteAccess::Render;
    }
    match state.role {
        Some(role) if allowed.contains(&role) => RouteAccess::Render,
        Some(role) => RouteAccess::RedirectHome(role),
        None => RouteAccess::RedirectUnauthorized,
    }
}
