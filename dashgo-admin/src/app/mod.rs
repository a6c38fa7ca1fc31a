pub mod bootstrap;
pub mod runtime;

pub use bootstrap::{AppConfig, ConfigError, base_state};
pub use runtime::Runtime;
