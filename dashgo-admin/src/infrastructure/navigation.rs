//! Route model and the navigation collaborator.
//!
//! The router state itself lives in [`crate::state::State::route`]; a
//! [`Navigator`] is told about every transition so a rendering layer (or the
//! CLI) can follow along.

use std::fmt;

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    UserList,
    CreateUser,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::UserList => "/users",
            Route::CreateUser => "/users/create",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives route transitions after the router state has been updated.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator used when nothing renders the routes; it only logs them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!("[Navigator] -> {}", route);
    }
}
