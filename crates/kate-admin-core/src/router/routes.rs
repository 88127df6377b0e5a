/// Public landing page
pub const HOME_PATH: &str = "/";

/// Authenticated landing page (dashboard)
pub const LANDING_PATH: &str = "/admin";

/// Unauthenticated entry point
pub const LOGIN_PATH: &str = "/admin/login";

/// A navigable view and whether it needs a session.
///
/// Descriptors only exist in the static [`ROUTES`] table, so the protection
/// flag cannot change after it is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    path: &'static str,
    name: &'static str,
    requires_auth: bool,
}

impl RouteDescriptor {
    const fn new(path: &'static str, name: &'static str, requires_auth: bool) -> Self {
        Self {
            path,
            name,
            requires_auth,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

pub static ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor::new(HOME_PATH, "Home", false),
    RouteDescriptor::new(LANDING_PATH, "Admin", true),
    RouteDescriptor::new(LOGIN_PATH, "AdminLogin", false),
    RouteDescriptor::new("/admin/users", "AdminUsers", true),
    RouteDescriptor::new("/admin/products", "AdminProducts", true),
    RouteDescriptor::new("/admin/orders", "AdminOrders", true),
    RouteDescriptor::new("/admin/notifications", "AdminNotifications", true),
];

/// Strip query string, fragment and trailing slashes: `/admin/?x=1` -> `/admin`
pub fn normalize(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        HOME_PATH
    } else {
        trimmed
    }
}

/// Look up the route for a path
pub fn find(path: &str) -> Option<&'static RouteDescriptor> {
    let path = normalize(path);
    ROUTES.iter().find(|r| r.path == path)
}

pub fn by_name(name: &str) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|r| r.name == name)
}

/// Path for a route name, or `target` unchanged when it names no route
pub fn resolve(target: &str) -> &str {
    by_name(target).map_or(target, |r| r.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/admin/"), "/admin");
        assert_eq!(normalize("/admin/users?page=2"), "/admin/users");
        assert_eq!(normalize("/admin#top"), "/admin");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/?ref=ad"), "/");
    }

    #[test]
    fn test_protection_flags() {
        let protected: Vec<&str> = ROUTES
            .iter()
            .filter(|r| r.requires_auth())
            .map(|r| r.path())
            .collect();
        assert_eq!(
            protected,
            vec!["/admin", "/admin/users", "/admin/products", "/admin/orders", "/admin/notifications"]
        );
        assert!(!find(HOME_PATH).unwrap().requires_auth());
        assert!(!find(LOGIN_PATH).unwrap().requires_auth());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(find("/admin/orders/").unwrap().name(), "AdminOrders");
        assert_eq!(by_name("AdminLogin").unwrap().path(), LOGIN_PATH);
        assert!(find("/admin/settings").is_none());
        assert!(by_name("Settings").is_none());
    }

    #[test]
    fn test_resolve_names_and_paths() {
        assert_eq!(resolve("AdminUsers"), "/admin/users");
        assert_eq!(resolve("/admin/orders?page=2"), "/admin/orders?page=2");
        assert_eq!(resolve("Settings"), "Settings");
    }
}
