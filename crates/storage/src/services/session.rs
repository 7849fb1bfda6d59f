use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A user identifier vouched for by an [`IdentityProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AuthenticatedUser {
    user_id: Uuid,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// Resolves the caller of a request to a stable user identifier.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, bearer_token: Option<&str>) -> Result<AuthenticatedUser, SessionError>;

    /// Like [`IdentityProvider::authenticate`], but absence of credentials is
    /// not an error. Credentials that are present and wrong still are.
    fn current_user(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<Option<AuthenticatedUser>, SessionError> {
        match self.authenticate(bearer_token) {
            Ok(user) => Ok(Some(user)),
            Err(SessionError::MissingCredentials) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
