//! Domain entities owned by the session layer.
//!
//! These are plain data types without storage or transport concerns.

pub mod state;
pub mod user;

pub use state::AuthState;
pub use user::{Role, User};
