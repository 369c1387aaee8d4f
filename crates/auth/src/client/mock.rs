//! In-memory authentication backend.
//!
//! The dashboard's data is mocked client-side; this type plays the auth API
//! for demos and tests. It tracks how many requests it served and can be
//! switched to fail every call as if the network were down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::debug;

use super::AuthApi;
use crate::entities::{Role, User};
use crate::types::{
    CurrentUserResponse, LoginRequest, LoginResponse, RegisterRequest, SessionError,
    SessionResult,
};
use crate::utils::validate_registration;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Clone)]
struct MockAccount {
    user: User,
    password: String,
}

#[derive(Debug, Clone)]
struct MockSession {
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MockState {
    // keyed by lowercased email
    accounts: HashMap<String, MockAccount>,
    sessions: HashMap<String, MockSession>,
}

#[derive(Debug, Clone)]
pub struct MockAuthApi {
    state: Arc<RwLock<MockState>>,
    token_ttl: Duration,
    requests: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::with_token_ttl(Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS))
    }

    pub fn with_token_ttl(token_ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            token_ttl,
            requests: Arc::new(AtomicUsize::new(0)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add an account directly, bypassing registration rules.
    pub async fn seed_account(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let user = User::new(CUID.create_id(), name, email, role);
        let mut state = self.state.write().await;
        state.accounts.insert(
            email.to_lowercase(),
            MockAccount {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Issue a token for an existing account without counting a request.
    pub async fn issue_token(&self, email: &str) -> Option<String> {
        let mut state = self.state.write().await;
        let user_id = state.accounts.get(&email.to_lowercase())?.user.id.clone();
        Some(self.open_session(&mut state, user_id))
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.state.write().await.sessions.remove(token).is_some()
    }

    pub async fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.state
            .read()
            .await
            .sessions
            .values()
            .filter(|session| session.expires_at > now)
            .count()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a network error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn begin_request(&self) -> SessionResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SessionError::Network("auth service unavailable".to_string()));
        }
        Ok(())
    }

    fn open_session(&self, state: &mut MockState, user_id: String) -> String {
        let token = generate_token();
        state.sessions.insert(
            token.clone(),
            MockSession {
                user_id,
                expires_at: Utc::now() + self.token_ttl,
            },
        );
        token
    }
}

impl AuthApi for MockAuthApi {
    async fn current_user(&self, token: &str) -> SessionResult<CurrentUserResponse> {
        self.begin_request()?;
        let mut state = self.state.write().await;

        let session = state
            .sessions
            .get(token)
            .cloned()
            .ok_or(SessionError::Unauthorized)?;

        if session.expires_at <= Utc::now() {
            state.sessions.remove(token);
            return Err(SessionError::SessionExpired);
        }

        state
            .accounts
            .values()
            .find(|account| account.user.id == session.user_id)
            .map(|account| CurrentUserResponse {
                user: account.user.clone(),
            })
            .ok_or(SessionError::Unauthorized)
    }

    async fn login(&self, request: &LoginRequest) -> SessionResult<LoginResponse> {
        self.begin_request()?;
        let mut state = self.state.write().await;

        let account = state
            .accounts
            .get(&request.email.trim().to_lowercase())
            .filter(|account| account.password == request.password)
            .cloned()
            .ok_or(SessionError::InvalidCredentials)?;

        let token = self.open_session(&mut state, account.user.id.clone());
        debug!(user = %account.user.id, "mock api issued session");

        Ok(LoginResponse {
            token,
            user: account.user,
        })
    }

    async fn register(&self, request: &RegisterRequest) -> SessionResult<()> {
        self.begin_request()?;
        validate_registration(request)?;

        let email = request.email.trim().to_lowercase();
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&email) {
            return Err(SessionError::AccountExists);
        }

        let user = User::new(CUID.create_id(), request.name.trim(), email.clone(), Role::User);
        state.accounts.insert(
            email,
            MockAccount {
                user,
                password: request.password.clone(),
            },
        );
        Ok(())
    }

    async fn logout(&self, token: Option<&str>) -> SessionResult<()> {
        self.begin_request()?;
        if let Some(token) = token {
            self.state.write().await.sessions.remove(token);
        }
        Ok(())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_issues_distinct_tokens() {
        let api = MockAuthApi::new();
        api.seed_account("Ada", "ada@example.com", "secret1", Role::Admin)
            .await;

        let request = LoginRequest::new("ADA@example.com", "secret1", false);
        let first = api.login(&request).await.unwrap();
        let second = api.login(&request).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(first.user.role, Role::Admin);
        assert_eq!(api.request_count(), 2);
        assert_eq!(api.active_sessions().await, 2);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let api = MockAuthApi::new();
        api.seed_account("Ada", "ada@example.com", "secret1", Role::User)
            .await;

        let err = api
            .login(&LoginRequest::new("ada@example.com", "nope", false))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn expired_tokens_are_refused_and_dropped() {
        let api = MockAuthApi::with_token_ttl(Duration::seconds(-1));
        api.seed_account("Ada", "ada@example.com", "secret1", Role::User)
            .await;
        let token = api.issue_token("ada@example.com").await.unwrap();

        let err = api.current_user(&token).await.unwrap_err();

        assert!(matches!(err, SessionError::SessionExpired));
        assert!(!api.revoke(&token).await);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let api = MockAuthApi::new();
        let request = RegisterRequest::new("Ada", "ada@example.com", "secret1", "secret1");

        api.register(&request).await.unwrap();
        let err = api.register(&request).await.unwrap_err();

        assert!(matches!(err, SessionError::AccountExists));
    }

    #[tokio::test]
    async fn registered_accounts_can_log_in_as_users() {
        let api = MockAuthApi::new();
        api.register(&RegisterRequest::new("Bo", "bo@example.com", "secret1", "secret1"))
            .await
            .unwrap();

        let response = api
            .login(&LoginRequest::new("bo@example.com", "secret1", true))
            .await
            .unwrap();

        assert_eq!(response.user.role, Role::User);
        assert_eq!(response.user.name, "Bo");
    }

    #[tokio::test]
    async fn unavailable_switch_fails_every_call() {
        let api = MockAuthApi::new();
        api.set_unavailable(true);

        let err = api.current_user("anything").await.unwrap_err();

        assert!(matches!(err, SessionError::Network(_)));
        assert_eq!(api.request_count(), 1);
    }
}
