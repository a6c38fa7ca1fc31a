//! Application state: the single owned value every handler mutates

use std::sync::Arc;

use dashgo_model::prelude::UsersPage;

use crate::domains::user_management::{UserManagementDomain, UserManagementDomainState};
use crate::infrastructure::navigation::{LogNavigator, Navigator, Route};
use crate::infrastructure::query_cache::{CacheInvalidator, QueryCache};
use crate::infrastructure::services::user_management::UserAdminService;

#[derive(Debug, Default)]
pub struct DomainRegistry {
    pub user_management: UserManagementDomain,
}

pub struct State {
    /// Current router location
    pub route: Route,
    pub domains: DomainRegistry,
    pub query_cache: QueryCache<UsersPage>,
    pub cache_invalidator: Arc<dyn CacheInvalidator>,
    pub navigator: Arc<dyn Navigator>,
}

impl State {
    pub fn new(
        user_admin_service: Arc<dyn UserAdminService>,
        query_cache: QueryCache<UsersPage>,
    ) -> Self {
        Self {
            route: Route::default(),
            domains: DomainRegistry {
                user_management: UserManagementDomain::new(
                    UserManagementDomainState::with_service(user_admin_service),
                ),
            },
            cache_invalidator: Arc::new(query_cache.clone()),
            query_cache,
            navigator: Arc::new(LogNavigator),
        }
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_cache_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.cache_invalidator = invalidator;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.domains.user_management.state.per_page = per_page;
        self
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("route", &self.route)
            .field("domains", &self.domains)
            .field("cached_queries", &self.query_cache.len())
            .finish_non_exhaustive()
    }
}
