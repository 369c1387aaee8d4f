//! Redirect targets and route guards.
//!
//! Deciding where a user belongs is kept apart from actually navigating
//! there; everything here is a pure function of the role or auth state.

use crate::entities::{AuthState, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    AdminDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::AdminDashboard => "/admin/dashboard",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Landing page after a successful login.
pub fn redirect_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::User => Route::Dashboard,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session check still running; render nothing, not even a fallback.
    Pending,
    Render,
    Redirect(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Any logged-in user
    Authenticated,
    /// Administrators only
    Admin,
}

impl RouteGuard {
    /// Guard protecting `path`, or `None` for public pages.
    pub fn for_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        if under(path, "/admin") {
            Some(RouteGuard::Admin)
        } else if under(path, "/dashboard") {
            Some(RouteGuard::Authenticated)
        } else {
            None
        }
    }

    pub fn evaluate(&self, state: &AuthState) -> GuardOutcome {
        match (self, state) {
            (_, AuthState::Unresolved) => GuardOutcome::Pending,
            (_, AuthState::Anonymous) => GuardOutcome::Redirect(Route::Login),
            (RouteGuard::Admin, AuthState::Authenticated(user)) if !user.is_admin() => {
                GuardOutcome::Redirect(Route::Dashboard)
            }
            (_, AuthState::Authenticated(_)) => GuardOutcome::Render,
        }
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;

    fn signed_in(role: Role) -> AuthState {
        AuthState::Authenticated(User::new("1", "Ada", "ada@example.com", role))
    }

    #[test]
    fn admins_land_on_admin_dashboard() {
        assert_eq!(redirect_for(Role::Admin).path(), "/admin/dashboard");
        assert_eq!(redirect_for(Role::User).path(), "/dashboard");
    }

    #[test]
    fn guards_wait_for_bootstrap() {
        for guard in [RouteGuard::Authenticated, RouteGuard::Admin] {
            assert_eq!(guard.evaluate(&AuthState::Unresolved), GuardOutcome::Pending);
        }
    }

    #[test]
    fn anonymous_visitors_go_to_login() {
        for guard in [RouteGuard::Authenticated, RouteGuard::Admin] {
            assert_eq!(
                guard.evaluate(&AuthState::Anonymous),
                GuardOutcome::Redirect(Route::Login)
            );
        }
    }

    #[test]
    fn admin_guard_turns_away_regular_users() {
        assert_eq!(
            RouteGuard::Admin.evaluate(&signed_in(Role::User)),
            GuardOutcome::Redirect(Route::Dashboard)
        );
        assert_eq!(
            RouteGuard::Admin.evaluate(&signed_in(Role::Admin)),
            GuardOutcome::Render
        );
        assert_eq!(
            RouteGuard::Authenticated.evaluate(&signed_in(Role::User)),
            GuardOutcome::Render
        );
    }

    #[test]
    fn paths_map_to_guards() {
        assert_eq!(RouteGuard::for_path("/admin/customers"), Some(RouteGuard::Admin));
        assert_eq!(RouteGuard::for_path("/admin"), Some(RouteGuard::Admin));
        assert_eq!(
            RouteGuard::for_path("/dashboard/billing?tab=invoices"),
            Some(RouteGuard::Authenticated)
        );
        assert_eq!(RouteGuard::for_path("/dashboard/"), Some(RouteGuard::Authenticated));
        assert_eq!(RouteGuard::for_path("/administrator"), None);
        assert_eq!(RouteGuard::for_path("/login"), None);
        assert_eq!(RouteGuard::for_path("/"), None);
    }
}
