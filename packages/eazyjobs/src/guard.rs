//! Routing and the authentication gate in front of dashboard views.

use std::fmt;

use crate::auth::{AuthSession, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    /// Resolve a path. `/` and unknown paths land on the login view.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/dashboard" => Route::Dashboard,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Admission<T> {
    Granted(T),
    Redirect(Route),
}

/// Render `view` for the signed-in user, or redirect to the login view.
pub fn guard<T>(session: &AuthSession, view: impl FnOnce(&User) -> T) -> Admission<T> {
    match session.user() {
        Some(user) => Admission::Granted(view(user)),
        None => Admission::Redirect(Route::Login),
    }
}

/// Where a navigation to `path` actually ends up.
pub fn navigate(session: &AuthSession, path: &str) -> Route {
    let route = Route::from_path(path);
    if route.is_protected() && !session.is_authenticated() {
        Route::Login
    } else {
        route
    }
}
