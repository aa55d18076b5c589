//! Caller identity as seen by the engine.

use serde::Serialize;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::UserId;

/// Who is calling: a known guest or nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Requester {
    /// No credentials were presented.
    Anonymous,
    /// A guest authenticated by the identity provider.
    Authenticated(UserId),
}

impl Requester {
    /// The requester ID, if any.
    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }

    /// The requester ID, or an authorization error for anonymous callers.
    pub fn require(&self) -> AppResult<UserId> {
        self.id()
            .ok_or_else(|| AppError::authorization("Sign in to continue"))
    }

    /// Whether no credentials were presented.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}
