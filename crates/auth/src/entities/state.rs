use super::user::{Role, User};

/// Process-wide authentication state.
///
/// Starts `Unresolved` while the stored token is being checked, then cycles
/// between `Anonymous` and `Authenticated` for the life of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unresolved,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Unresolved)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Unresolved => f.write_str("unresolved"),
            AuthState::Anonymous => f.write_str("anonymous"),
            AuthState::Authenticated(user) => {
                write!(f, "authenticated as {} ({})", user.display_name(), user.role)
            }
        }
    }
}
