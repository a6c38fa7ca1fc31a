//! Service traits and their HTTP adapters

pub mod user_management;

pub use user_management::{UserAdminApiAdapter, UserAdminService};
