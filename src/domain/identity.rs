use uuid::Uuid;

use super::errors::DomainError;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    /// Elevated callers may read every user's purchases.
    pub is_elevated: bool,
}

/// Per-request caller context passed explicitly into every service call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { current_user: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            current_user: Some(identity),
        }
    }

    pub fn require_user(&self) -> Result<&Identity, DomainError> {
        self.current_user.as_ref().ok_or(DomainError::Unauthorized)
    }
}
