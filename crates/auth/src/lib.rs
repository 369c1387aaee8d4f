//! # HostPanel Auth Crate
//!
//! Client-side session management for the HostPanel hosting dashboard. The
//! crate owns "who is logged in": it keeps the bearer token in one of two
//! storage scopes, talks to the authentication API, publishes the auth state
//! to observers, and decides where the user goes after login and logout.
//!
//! ## Architecture
//!
//! - **Entities**: `User`, `Role`, `AuthState`
//! - **Services**: `SessionManager` plus the navigation and notification effects
//! - **Client**: the `AuthApi` seam with HTTP and in-memory implementations
//! - **Storage**: persistent and ephemeral token scopes
//! - **Routing**: redirect targets and route guards
//! - **Types**: requests, responses and errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hostpanel_auth::{LoginRequest, SessionManager};
//!
//! let manager = SessionManager::new(api, tokens, navigator, notifier);
//! manager.bootstrap().await;
//! let user = manager.login(LoginRequest::new("a@b.com", "secret1", true)).await?;
//! ```

pub mod client;
pub mod entities;
pub mod routing;
pub mod services;
pub mod storage;
pub mod types;
pub mod utils;

pub use client::{AuthApi, HttpAuthApi, MockAuthApi};
pub use entities::{AuthState, Role, User};
pub use routing::{redirect_for, GuardOutcome, Route, RouteGuard};
pub use services::{
    Navigator, Notice, Notifier, RecordingNavigator, RecordingNotifier, SessionManager,
    TracingNavigator, TracingNotifier,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TokenScope, TokenStore, AUTH_TOKEN_KEY};
pub use types::{
    CurrentUserResponse, ErrorKind, LoginRequest, LoginResponse, RegisterRequest, SessionError,
    SessionResult, StorageError, StorageResult,
};
