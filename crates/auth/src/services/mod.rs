//! Session services.
//!
//! `SessionManager` coordinates the auth API, the token scopes and the two
//! UI effects (navigation and notifications).

pub mod effects;
pub mod session_manager;

pub use effects::{
    Navigator, Notice, Notifier, RecordingNavigator, RecordingNotifier, TracingNavigator,
    TracingNotifier,
};
pub use session_manager::SessionManager;
