//! Client/UI focused snapshot of the types surface.
//! Prefer importing from this module instead of individual tree nodes when
//! working in dashgo-admin or other presentation layers.

pub use super::ids::UserId;
pub use super::pagination::{PageRequest, UsersPage};
pub use super::requests::{
    CreateUserRequest, NewUser, UserEnvelope, UsersEnvelope,
};
pub use super::user::User;
