//! Authentication state for the admin client.
//!
//! This module provides:
//! - `Session`: the optional opaque bearer token
//! - `CredentialStore`: the single owner of the session, read before every
//!   request and navigation, written by login, logout and the `403` path
//! - `Storage`: durable key-value backends the store writes through
//!
//! The token lives under the fixed key `admin_token` and survives restarts
//! when a durable backend is used.

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::{CredentialStore, SESSION_KEY};
pub use session::Session;
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, Storage, StorageBackend, StorageError};
