//! Authentication collaborator contract.
//!
//! The real sign-in flow lives outside this crate. Core code only needs to
//! know which user's partition to address; absence of a user means "no
//! data available" and is never an error.

/// Identifier of a signed-in user's data partition.
pub type UserId = String;

/// Collaborator interface exposed by the surrounding auth layer.
pub trait AuthProvider {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed single-user provider for the CLI probe and tests.
#[derive(Debug, Clone, Default)]
pub struct SingleUserAuth {
    user: Option<UserId>,
}

impl SingleUserAuth {
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthProvider for SingleUserAuth {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
