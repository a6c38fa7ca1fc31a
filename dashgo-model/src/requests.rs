//! Wire envelopes for the users endpoints.
//!
//! The backend wraps single records in `{ "user": ... }` and collections in
//! `{ "users": [...] }`; creation posts the same `user` envelope.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::user::User;

/// Body of `POST users`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateUserRequest {
    pub user: NewUser,
}

impl CreateUserRequest {
    pub fn new(user: NewUser) -> Self {
        Self { user }
    }
}

/// A validated user ready to be created.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Wiped from memory on drop
    pub password: Zeroizing<String>,
    pub password_confirmation: Zeroizing<String>,
    /// Client-side creation timestamp, stamped at submit time
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Response of `POST users`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserEnvelope {
    pub user: User,
}

/// Response of `GET users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsersEnvelope {
    #[cfg_attr(feature = "serde", serde(default))]
    pub users: Vec<User>,
}
