//! View routing for the admin client.
//!
//! - `routes`: the static route table and path helpers
//! - `NavigationGuard`: the admit/redirect decision for one transition
//! - `Navigator`: current location, redirect following and forced
//!   navigation on session events

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{Decision, NavigationGuard};
pub use navigator::{Navigation, NavigationError, Navigator};
pub use routes::{RouteDescriptor, HOME_PATH, LANDING_PATH, LOGIN_PATH, ROUTES};
