//! Navigation: resolves a location to its access level and runs the guard
//! for it.

use std::sync::Arc;

use tutorhub_core::config::{RootConfig, RouteSettings};
use tutorhub_core::guard::GuardDecision;
use tutorhub_core::route::{RouteAccess, RouteTable};

use crate::refresher::IdentityRefresher;
use crate::route_guard::{GuestGuard, RouteGuard};

/// Result of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The view at `location` may render.
    Render {
        location: String,
        access: RouteAccess,
    },
    /// Go to `to` instead. For login redirects `return_to` is the location
    /// to come back to after a successful login.
    Redirect {
        to: String,
        return_to: Option<String>,
    },
}

/// Keeps the guard of the currently displayed view mounted.
pub struct Navigator {
    table: RouteTable,
    home_path: String,
    login_path: String,
    refresher: Arc<IdentityRefresher>,
    current: Option<RouteGuard>,
    /// Guard that redirected away while its identity refresh was running.
    /// Held until that refresh settles so the redirect does not cancel it.
    redirected: Option<RouteGuard>,
}

impl Navigator {
    pub fn new(
        table: RouteTable,
        settings: &RouteSettings,
        refresher: Arc<IdentityRefresher>,
    ) -> Self {
        Self {
            table,
            home_path: settings.home_path.clone(),
            login_path: settings.login_path.clone(),
            refresher,
            current: None,
            redirected: None,
        }
    }

    /// Marketplace table with the configured rules checked first.
    pub fn from_config(config: &RootConfig, refresher: Arc<IdentityRefresher>) -> Self {
        Self::new(
            RouteTable::marketplace_with(&config.routes.rules),
            &config.routes,
            refresher,
        )
    }

    pub fn refresher(&self) -> &Arc<IdentityRefresher> {
        &self.refresher
    }

    /// Navigates to `location`.
    ///
    /// The new view's guard is mounted before the previous one is dropped, so
    /// an identity refresh started by the previous view keeps running. A
    /// refresh started by an evaluation that redirected also keeps running
    /// until it settles, so following the redirect does not cancel it.
    pub fn navigate(&mut self, location: &str) -> NavigationOutcome {
        if self.redirected.is_some() && !self.refresher.is_in_flight() {
            self.redirected = None;
        }

        let access = self.table.resolve(location);

        let decision = match access {
            RouteAccess::Public => {
                self.current = None;
                GuardDecision::Allowed
            }
            RouteAccess::GuestOnly => {
                self.current = None;
                GuestGuard::mount(self.refresher.store().clone()).evaluate()
            }
            RouteAccess::Authenticated | RouteAccess::Privileged => {
                let guard = RouteGuard::mount(access.requirements(), self.refresher.clone());
                let decision = guard.evaluate(location);
                if !decision.is_allowed() && guard.refresh_requested() {
                    self.redirected = Some(guard);
                    self.current = None;
                } else {
                    self.current = Some(guard);
                }
                decision
            }
        };

        match decision {
            GuardDecision::Allowed => NavigationOutcome::Render {
                location: location.to_string(),
                access,
            },
            GuardDecision::RedirectLogin { return_to } => NavigationOutcome::Redirect {
                to: self.login_path.clone(),
                return_to: Some(return_to),
            },
            GuardDecision::RedirectHome => NavigationOutcome::Redirect {
                to: self.home_path.clone(),
                return_to: None,
            },
        }
    }

    /// Where to go after a successful login.
    pub fn login_target(&self, return_to: Option<&str>) -> String {
        match return_to {
            Some(location) if !location.is_empty() && location != self.login_path => {
                location.to_string()
            }
            _ => self.home_path.clone(),
        }
    }

    /// Unmounts the current view's guard, cancelling any refresh nothing
    /// else waits for.
    pub fn leave(&mut self) {
        self.current = None;
        self.redirected = None;
    }
}
