//! Core data model definitions shared across dashgo crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod error;
pub mod ids;
pub mod pagination;
pub mod prelude;
pub mod requests;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::UserId;
pub use pagination::{PageRequest, UsersPage};
pub use requests::{CreateUserRequest, NewUser, UserEnvelope, UsersEnvelope};
pub use user::User;
