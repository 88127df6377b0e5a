//! Core library for the kate-admin back office client.
//!
//! The interesting part of this crate is the authenticated request pipeline
//! and the navigation guard:
//!
//! - [`auth`]: the `CredentialStore` holding the single session token, backed
//!   by a pluggable durable [`auth::Storage`] (JSON file, OS keychain, memory).
//! - [`api`]: the request `Gateway` that decorates every call with the stored
//!   bearer token and de-authenticates on `403`, plus the typed `AdminClient`
//!   accessors for users, products, orders and notifications.
//! - [`router`]: the static route table, the `NavigationGuard` admit/redirect
//!   decision and the `Navigator` that applies it.
//!
//! Presentation (views, forms, theming) lives outside this crate and talks to
//! it only through these types.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

pub use api::{AdminClient, ApiError, Gateway, OutboundRequest, SessionEvent};
pub use auth::{CredentialStore, Session, Storage, StorageBackend};
pub use config::Config;
pub use router::{Decision, Navigation, NavigationError, NavigationGuard, Navigator};
