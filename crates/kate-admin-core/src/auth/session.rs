use serde::{Deserialize, Serialize};

/// Client-side authentication state: at most one opaque token.
///
/// An empty stored string counts as absent, the same way a blank value in
/// browser storage is falsy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// The unauthenticated session.
    pub fn absent() -> Self {
        Self { token: None }
    }

    /// Build a session from whatever the storage backend returned.
    pub fn from_stored(value: Option<String>) -> Self {
        Self {
            token: value.filter(|t| !t.is_empty()),
        }
    }

    /// True when a token is held
    pub fn present(&self) -> bool {
        self.token.is_some()
    }

    /// Get the bearer token if present
    pub fn value(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
