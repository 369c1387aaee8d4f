//! Shared request, response and error types.

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{ErrorKind, SessionError, SessionResult, StorageError, StorageResult};
pub use requests::{LoginRequest, RegisterRequest};
pub use responses::{CurrentUserResponse, ErrorResponse, LoginResponse};
