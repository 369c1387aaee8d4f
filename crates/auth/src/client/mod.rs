//! Clients for the dashboard's authentication API.

pub mod http;
pub mod mock;

pub use http::HttpAuthApi;
pub use mock::MockAuthApi;

use crate::types::{
    CurrentUserResponse, LoginRequest, LoginResponse, RegisterRequest, SessionResult,
};

/// Operations the session layer needs from the authentication backend.
pub trait AuthApi {
    /// Look up the user owning `token`. Fails when the token is missing, invalid or expired.
    async fn current_user(&self, token: &str) -> SessionResult<CurrentUserResponse>;

    async fn login(&self, request: &LoginRequest) -> SessionResult<LoginResponse>;

    async fn register(&self, request: &RegisterRequest) -> SessionResult<()>;

    /// Drop any server-side state for `token`. Not required to touch the network.
    async fn logout(&self, token: Option<&str>) -> SessionResult<()> {
        let _ = token;
        Ok(())
    }
}
