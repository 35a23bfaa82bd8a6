//! Navigation guard decisions.
//!
//! These are pure functions over a session snapshot. Performing the redirect
//! and refreshing the identity are the caller's job.

use crate::session::Session;

/// What a navigation requires from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteRequirements {
    pub requires_auth: bool,
    pub requires_privileged: bool,
}

impl RouteRequirements {
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        requires_privileged: false,
    };

    pub const AUTHENTICATED: Self = Self {
        requires_auth: true,
        requires_privileged: false,
    };

    /// Privileged views are only reachable by logged-in users.
    pub const PRIVILEGED: Self = Self {
        requires_auth: true,
        requires_privileged: true,
    };
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested content.
    Allowed,
    /// Send the user to the login view; `return_to` is the location that
    /// was requested so a successful login can come back to it.
    RedirectLogin { return_to: String },
    /// Send the user to the home view.
    RedirectHome,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides a protected navigation.
///
/// Rules are evaluated in order against the one snapshot passed in:
/// 1. authentication required but not logged in: redirect to login
/// 2. privileged role required but not privileged: redirect home
/// 3. otherwise allowed, even if the identity is still being fetched
pub fn decide(requirements: RouteRequirements, session: &Session, location: &str) -> GuardDecision {
    if requirements.requires_auth && !session.is_authenticated() {
        return GuardDecision::RedirectLogin {
            return_to: location.to_string(),
        };
    }

    if requirements.requires_privileged && !session.is_privileged() {
        return GuardDecision::RedirectHome;
    }

    GuardDecision::Allowed
}

/// Decides a guest-only navigation (login, registration).
pub fn decide_guest(session: &Session) -> GuardDecision {
    if session.is_authenticated() {
        GuardDecision::RedirectHome
    } else {
        GuardDecision::Allowed
    }
}
