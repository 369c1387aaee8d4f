//! Session manager: the single source of truth for who is logged in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::effects::{Navigator, Notifier};
use crate::client::AuthApi;
use crate::entities::{AuthState, User};
use crate::routing::{redirect_for, GuardOutcome, Route, RouteGuard};
use crate::storage::{TokenScope, TokenStore};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, SessionResult};
use crate::utils::{validate_login, validate_registration};

const DEFAULT_LOGOUT_REDIRECT_DELAY: Duration = Duration::from_millis(100);

const LOGIN_SUCCESS: &str = "Logged in successfully";
const REGISTER_SUCCESS: &str =
    "Registration successful! Please check your email to verify your account.";
const LOGOUT_SUCCESS: &str = "Logged out successfully";

/// Owns the client's authentication state and mediates all token storage.
///
/// Each manager is an isolated instance: build one per application (or per
/// test) and share it by reference. State changes are published on a watch
/// channel, see [`SessionManager::subscribe`].
pub struct SessionManager<A> {
    api: A,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<AuthState>,
    bootstrapped: AtomicBool,
    logout_redirect_delay: Duration,
}

impl<A> SessionManager<A>
where
    A: AuthApi,
{
    pub fn new(
        api: A,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unresolved);

        Self {
            api,
            tokens,
            navigator,
            notifier,
            state,
            bootstrapped: AtomicBool::new(false),
            logout_redirect_delay: DEFAULT_LOGOUT_REDIRECT_DELAY,
        }
    }

    pub fn with_logout_redirect_delay(mut self, delay: Duration) -> Self {
        self.logout_redirect_delay = delay;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn guard(&self, guard: RouteGuard) -> GuardOutcome {
        guard.evaluate(&self.state.borrow())
    }

    /// Resolve the initial auth state from a stored token.
    ///
    /// Runs once per manager; later calls return the current state untouched.
    /// A token the API no longer accepts is removed from both scopes without
    /// telling the user.
    pub async fn bootstrap(&self) -> AuthState {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let stored = match self.tokens.load() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "could not read stored session token");
                None
            }
        };

        let Some((token, scope)) = stored else {
            debug!("no stored session token");
            self.resolve(AuthState::Anonymous);
            return self.state();
        };

        match self.api.current_user(&token).await {
            Ok(response) => {
                info!(user = %response.user.id, ?scope, "restored session");
                self.resolve(AuthState::Authenticated(response.user));
            }
            Err(err) => {
                debug!(error = %err, ?scope, "stored session token rejected");
                // a login that finished meanwhile owns the token scopes now
                if self.is_loading() {
                    self.clear_tokens();
                }
                self.resolve(AuthState::Anonymous);
            }
        }

        self.state()
    }

    /// Log in and land the user on the dashboard matching their role.
    ///
    /// On failure the error is shown, returned to the caller, and the auth
    /// state is left as it was so the form can be retried.
    pub async fn login(&self, request: &LoginRequest) -> SessionResult<User> {
        let response = match self.authenticate(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(email = %request.email, error = %err, "login failed");
                self.notifier.error(&err.to_string());
                return Err(err);
            }
        };

        let user = response.user;
        let target = redirect_for(user.role);
        info!(user = %user.id, role = %user.role, remember_me = request.remember_me, "logged in");

        self.state.send_replace(AuthState::Authenticated(user.clone()));
        self.notifier.success(LOGIN_SUCCESS);
        self.navigator.navigate(target);

        Ok(user)
    }

    async fn authenticate(&self, request: &LoginRequest) -> SessionResult<LoginResponse> {
        validate_login(request)?;
        let response = self.api.login(request).await?;
        self.tokens
            .store(&response.token, TokenScope::from_remember_me(request.remember_me))?;
        Ok(response)
    }

    /// Create an account. The user still has to verify their email and log in.
    pub async fn register(&self, request: &RegisterRequest) -> SessionResult<()> {
        let result = match validate_registration(request) {
            Ok(()) => self.api.register(request).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!(email = %request.email, error = %err, "registration failed");
            self.notifier.error(&err.to_string());
            return Err(err);
        }

        info!(email = %request.email, "registered account");
        self.notifier.success(REGISTER_SUCCESS);
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    /// Forget the session locally and return to the login page.
    ///
    /// Never fails: API and storage errors are logged and the local state is
    /// cleared regardless.
    pub async fn logout(&self) {
        let token = match self.tokens.load() {
            Ok(stored) => stored.map(|(token, _)| token),
            Err(err) => {
                warn!(error = %err, "could not read stored session token");
                None
            }
        };

        if let Err(err) = self.api.logout(token.as_deref()).await {
            warn!(error = %err, "auth api logout failed");
        }

        self.clear_tokens();
        self.state.send_replace(AuthState::Anonymous);
        info!("logged out");

        // let observers see the anonymous state before the route changes
        if !self.logout_redirect_delay.is_zero() {
            tokio::time::sleep(self.logout_redirect_delay).await;
        }

        self.navigator.navigate(Route::Login);
        self.notifier.success(LOGOUT_SUCCESS);
    }

    fn clear_tokens(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "could not clear stored session token");
        }
    }

    fn resolve(&self, next: AuthState) {
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

impl<A> std::fmt::Debug for SessionManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("logout_redirect_delay", &self.logout_redirect_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAuthApi;
    use crate::entities::Role;
    use crate::services::effects::{MockNavigator, MockNotifier};
    use mockall::predicate::eq;

    fn manager(
        api: MockAuthApi,
        navigator: MockNavigator,
        notifier: MockNotifier,
    ) -> SessionManager<MockAuthApi> {
        SessionManager::new(
            api,
            TokenStore::in_memory(),
            Arc::new(navigator),
            Arc::new(notifier),
        )
        .with_logout_redirect_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn logout_navigates_to_login_once_and_confirms() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Login))
            .times(1)
            .return_const(());
        let mut notifier = MockNotifier::new();
        notifier
            .expect_success()
            .withf(|message| message == LOGOUT_SUCCESS)
            .times(1)
            .return_const(());
        notifier.expect_error().never();

        let manager = manager(MockAuthApi::new(), navigator, notifier);
        manager.logout().await;

        assert_eq!(manager.state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn admin_login_navigates_to_admin_dashboard() {
        let api = MockAuthApi::new();
        api.seed_account("Root", "root@example.com", "secret1", Role::Admin)
            .await;

        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::AdminDashboard))
            .times(1)
            .return_const(());
        let mut notifier = MockNotifier::new();
        notifier.expect_success().times(1).return_const(());

        let manager = manager(api, navigator, notifier);
        let user = manager
            .login(&LoginRequest::new("root@example.com", "secret1", false))
            .await
            .unwrap();

        assert!(user.is_admin());
        assert!(manager.state().is_authenticated());
    }

    #[tokio::test]
    async fn invalid_login_form_never_reaches_the_api() {
        let api = MockAuthApi::new();
        let navigator = MockNavigator::new();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|message| message == "Invalid email address")
            .times(1)
            .return_const(());

        let manager = manager(api, navigator, notifier);
        let result = manager
            .login(&LoginRequest::new("not-an-email", "secret1", true))
            .await;

        assert!(result.is_err());
        assert_eq!(manager.api().request_count(), 0);
    }

    #[tokio::test]
    async fn bootstrap_runs_only_once() {
        let api = MockAuthApi::new();
        api.seed_account("Ada", "ada@example.com", "secret1", Role::User)
            .await;
        let token = api.issue_token("ada@example.com").await.unwrap();

        let manager = manager(api, MockNavigator::new(), MockNotifier::new());
        manager
            .tokens()
            .store(&token, TokenScope::Persistent)
            .unwrap();

        assert!(manager.bootstrap().await.is_authenticated());
        assert!(manager.bootstrap().await.is_authenticated());
        assert_eq!(manager.api().request_count(), 1);
    }
}
