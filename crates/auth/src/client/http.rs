use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use hostpanel_config::ApiConfig;

use super::AuthApi;
use crate::types::{
    CurrentUserResponse, ErrorResponse, LoginRequest, LoginResponse, RegisterRequest,
    SessionError, SessionResult,
};

/// `AuthApi` over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    http: Client,
    base_url: String,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Login,
    Register,
    CurrentUser,
    Logout,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/auth/login",
            Endpoint::Register => "/auth/register",
            Endpoint::CurrentUser => "/auth/me",
            Endpoint::Logout => "/auth/logout",
        }
    }
}

impl HttpAuthApi {
    pub fn new(config: &ApiConfig) -> SessionResult<Self> {
        let http = Client::builder()
            .user_agent("hostpanel-dashboard")
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: Endpoint,
        response: Response,
    ) -> SessionResult<T> {
        let response = Self::check(endpoint, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| SessionError::Network(format!("malformed response: {err}")))
    }

    async fn check(endpoint: Endpoint, response: Response) -> SessionResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_default();

        debug!(endpoint = endpoint.path(), status = status.as_u16(), "auth api rejected request");
        Err(map_status(endpoint, status, message))
    }
}

fn map_status(endpoint: Endpoint, status: StatusCode, message: String) -> SessionError {
    match (status, endpoint) {
        (StatusCode::UNAUTHORIZED, Endpoint::Login) => SessionError::InvalidCredentials,
        (StatusCode::UNAUTHORIZED, _) => SessionError::Unauthorized,
        (StatusCode::CONFLICT, _) => SessionError::AccountExists,
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            if message.is_empty() {
                SessionError::Validation("Request was rejected".to_string())
            } else {
                SessionError::Validation(message)
            }
        }
        _ => SessionError::Api {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("unexpected status").to_string()
            } else {
                message
            },
        },
    }
}

impl AuthApi for HttpAuthApi {
    async fn current_user(&self, token: &str) -> SessionResult<CurrentUserResponse> {
        let response = self
            .http
            .get(self.url(Endpoint::CurrentUser))
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(Endpoint::CurrentUser, response).await
    }

    async fn login(&self, request: &LoginRequest) -> SessionResult<LoginResponse> {
        let response = self
            .http
            .post(self.url(Endpoint::Login))
            .json(request)
            .send()
            .await?;

        Self::decode(Endpoint::Login, response).await
    }

    async fn register(&self, request: &RegisterRequest) -> SessionResult<()> {
        let response = self
            .http
            .post(self.url(Endpoint::Register))
            .json(request)
            .send()
            .await?;

        Self::check(Endpoint::Register, response).await?;
        Ok(())
    }

    async fn logout(&self, token: Option<&str>) -> SessionResult<()> {
        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.url(Endpoint::Logout))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check(Endpoint::Logout, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_login_means_bad_credentials() {
        let err = map_status(Endpoint::Login, StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, SessionError::InvalidCredentials));

        let err = map_status(Endpoint::CurrentUser, StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, SessionError::Unauthorized));
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = map_status(
            Endpoint::Register,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Email is invalid".into(),
        );
        assert_eq!(err.to_string(), "Email is invalid");
    }

    #[test]
    fn server_errors_keep_status() {
        let err = map_status(Endpoint::Login, StatusCode::BAD_GATEWAY, String::new());
        assert!(matches!(err, SessionError::Api { status: 502, .. }));
    }

    #[test]
    fn base_url_is_normalised() {
        let api = HttpAuthApi::with_client(Client::new(), "http://localhost:8080/api/");
        assert_eq!(api.url(Endpoint::CurrentUser), "http://localhost:8080/api/auth/me");
    }
}
