//! Route table for the app's screens.
//!
//! Screens are addressed by URL-like paths. `Route::resolve` applies the
//! auth guard so a logged-out user never lands on `/home` and a logged-in
//! user skips `/login`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/` - the welcome screen
    Index,
    /// `/login` - the login form
    Login,
    /// `/home` - the signed-in home screen
    Home,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Index, Route::Login, Route::Home];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Login => "/login",
            Route::Home => "/home",
        }
    }

    /// Look up a route by path. Trailing slashes and a missing leading
    /// slash are tolerated.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| route.path().trim_matches('/') == trimmed)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Index => "Welcome",
            Route::Login => "Sign in",
            Route::Home => "Home",
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home)
    }

    /// Where a request for this route actually lands.
    pub fn resolve(self, authenticated: bool) -> Self {
        match self {
            route if route.requires_auth() && !authenticated => Route::Login,
            Route::Login if authenticated => Route::Home,
            route => route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_from_path_tolerates_slashes() {
        assert_eq!(Route::from_path("home"), Some(Route::Home));
        assert_eq!(Route::from_path("/login/"), Some(Route::Login));
        assert_eq!(Route::from_path(""), Some(Route::Index));
        assert_eq!(Route::from_path("/settings"), None);
    }

    #[test]
    fn test_guard_redirects_logged_out_home() {
        assert_eq!(Route::Home.resolve(false), Route::Login);
        assert_eq!(Route::Home.resolve(true), Route::Home);
    }

    #[test]
    fn test_guard_skips_login_when_signed_in() {
        assert_eq!(Route::Login.resolve(true), Route::Home);
        assert_eq!(Route::Login.resolve(false), Route::Login);
    }

    #[test]
    fn test_index_is_always_reachable() {
        assert_eq!(Route::Index.resolve(false), Route::Index);
        assert_eq!(Route::Index.resolve(true), Route::Index);
    }
}
