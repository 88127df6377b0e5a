//! Applies guard decisions to the current location.
//!
//! Every transition, including the forced ones triggered by a session event,
//! goes through the guard. Redirects are followed and re-evaluated until the
//! guard admits.

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::api::SessionEvent;

use super::guard::{Decision, NavigationGuard};
use super::routes::{self, HOME_PATH};

/// Upper bound on redirect hops for a single navigation
const MAX_REDIRECTS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Redirect loop navigating to {target}: {}", .hops.join(" -> "))]
    RedirectLoop { target: String, hops: Vec<String> },
}

/// Result of a completed transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub location: String,
    /// Redirect targets in the order they were followed
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

pub struct Navigator {
    guard: NavigationGuard,
    location: String,
    events: Option<broadcast::Receiver<SessionEvent>>,
}

impl Navigator {
    /// Start at the public landing page
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            guard,
            location: HOME_PATH.to_string(),
            events: None,
        }
    }

    /// Consume session events from the gateway
    pub fn with_events(mut self, events: broadcast::Receiver<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current location
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn navigate(&mut self, path: &str) -> Result<Navigation, NavigationError> {
        let requested = routes::normalize(path).to_string();
        let mut target = requested.clone();
        let mut redirects = Vec::new();

        loop {
            match self.guard.evaluate(&target) {
                Decision::Admit => {
                    debug!(from = %self.location, to = %target, "Navigation admitted");
                    self.location = target.clone();
                    return Ok(Navigation {
                        requested,
                        location: target,
                        redirects,
                    });
                }
                Decision::Redirect(to) => {
                    redirects.push(to.to_string());
                    if redirects.len() > MAX_REDIRECTS {
                        return Err(NavigationError::RedirectLoop {
                            target: requested,
                            hops: redirects,
                        });
                    }
                    target = to.to_string();
                }
            }
        }
    }

    /// Perform the navigation a session event asks for
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<Navigation, NavigationError> {
        match event {
            SessionEvent::Invalidated { redirect_to } => {
                info!(from = %self.location, to = redirect_to, "Session invalidated, leaving protected view");
                self.navigate(redirect_to)
            }
        }
    }

    /// Apply every pending session event without waiting
    pub fn drain_events(&mut self) -> Result<Vec<Navigation>, NavigationError> {
        let mut pending = Vec::new();
        if let Some(events) = self.events.as_mut() {
            loop {
                match events.try_recv() {
                    Ok(event) => pending.push(event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed session events");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        pending.into_iter().map(|event| self.handle_event(event)).collect()
    }

    /// Wait for the next session event and apply it.
    /// Returns `None` once the gateway side is gone or no receiver is attached.
    pub async fn next_event(&mut self) -> Option<Result<Navigation, NavigationError>> {
        let event = {
            let events = self.events.as_mut()?;
            loop {
                match events.recv().await {
                    Ok(event) => break event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed session events");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        };
        Some(self.handle_event(event))
    }
}
