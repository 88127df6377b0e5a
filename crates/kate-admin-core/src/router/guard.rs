use tracing::debug;

use crate::auth::CredentialStore;

use super::routes::{self, RouteDescriptor, LANDING_PATH, LOGIN_PATH};

/// Outcome of a single guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Redirect(&'static str),
}

/// Admits or redirects route transitions based on the session.
///
/// The guard only ever reads the credential store.
#[derive(Clone)]
pub struct NavigationGuard {
    store: CredentialStore,
}

impl NavigationGuard {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Evaluate a transition to `target`. The session is read exactly once.
    pub fn evaluate(&self, target: &str) -> Decision {
        let path = routes::normalize(target);
        let session_present = self.store.get().present();
        let decision = Self::decide(routes::find(path), path == LOGIN_PATH, session_present);
        debug!(target = path, session_present, ?decision, "Guard evaluated");
        decision
    }

    /// The transition table. Unknown routes are treated as unprotected.
    pub fn decide(
        route: Option<&RouteDescriptor>,
        to_login: bool,
        session_present: bool,
    ) -> Decision {
        let requires_auth = route.map(|r| r.requires_auth()).unwrap_or(false);
        match (requires_auth, session_present) {
            (true, false) => Decision::Redirect(LOGIN_PATH),
            (true, true) => Decision::Admit,
            (false, true) if to_login => Decision::Redirect(LANDING_PATH),
            (false, _) => Decision::Admit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::ROUTES;

    #[test]
    fn test_protected_routes_admit_iff_session() {
        for route in ROUTES.iter().filter(|r| r.requires_auth()) {
            assert_eq!(
                NavigationGuard::decide(Some(route), false, true),
                Decision::Admit,
                "{}",
                route.path()
            );
            assert_eq!(
                NavigationGuard::decide(Some(route), false, false),
                Decision::Redirect(LOGIN_PATH),
                "{}",
                route.path()
            );
        }
    }

    #[test]
    fn test_guard_reads_store() {
        let store = CredentialStore::in_memory();
        let guard = NavigationGuard::new(store.clone());

        assert_eq!(guard.evaluate("/admin/users"), Decision::Redirect("/admin/login"));
        assert_eq!(guard.evaluate("/admin/login"), Decision::Admit);
        assert_eq!(guard.evaluate("/"), Decision::Admit);

        store.set("admin_1");
        assert_eq!(guard.evaluate("/admin/users"), Decision::Admit);
        assert_eq!(guard.evaluate("/admin/login"), Decision::Redirect("/admin"));
        assert_eq!(guard.evaluate("/admin/login/"), Decision::Redirect("/admin"));
        assert_eq!(guard.evaluate("/"), Decision::Admit);

        // Reading never changes the session
        assert_eq!(store.get().value(), Some("admin_1"));
    }

    #[test]
    fn test_unknown_paths_are_unprotected() {
        let store = CredentialStore::in_memory();
        let guard = NavigationGuard::new(store);
        assert_eq!(guard.evaluate("/admin/settings"), Decision::Admit);
        assert_eq!(guard.evaluate("/promo"), Decision::Admit);
    }
}
