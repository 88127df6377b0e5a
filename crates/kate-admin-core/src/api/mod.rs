//! REST API access for the admin service.
//!
//! `Gateway` is the single choke point for HTTP: it attaches the session
//! token, applies the request timeout and turns a `403` into a cleared
//! session plus a `SessionEvent`. `AdminClient` layers the typed resource
//! accessors and login/logout on top of it.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::AdminClient;
pub use error::ApiError;
pub use gateway::{Gateway, OutboundRequest, SessionEvent};
