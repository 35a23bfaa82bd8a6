//! Session state and route guards for the tutorhub marketplace client.
//!
//! [`SessionStore`] owns the session, [`IdentityRefresher`] re-fetches the
//! identity after a cold start, and [`RouteGuard`] / [`GuestGuard`] decide
//! navigations. [`Navigator`] wires them to the route table.

pub mod navigator;
pub mod refresher;
pub mod route_guard;
pub mod session_store;

pub use navigator::{NavigationOutcome, Navigator};
pub use refresher::{IdentityRefresher, RefreshTicket};
pub use route_guard::{GuestGuard, RouteGuard};
pub use session_store::{RefreshOutcome, SessionStore};
