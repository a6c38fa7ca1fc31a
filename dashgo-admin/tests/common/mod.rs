//! Shared harness: the real runtime wired to in-memory collaborators

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dashgo_admin::app::Runtime;
use dashgo_admin::domains::user_management::form::{CreateUserForm, Field};
use dashgo_admin::domains::user_management::messages::Message;
use dashgo_admin::infrastructure::query_cache::QueryCache;
use dashgo_admin::infrastructure::services::user_management::UserAdminService;
use dashgo_admin::infrastructure::testing::{
    CollaboratorLog, RecordingInvalidator, RecordingNavigator, TestUserAdminService,
};
use dashgo_admin::state::State;
use dashgo_model::prelude::UsersPage;

pub struct Harness {
    pub runtime: Runtime,
    pub service: TestUserAdminService,
    pub log: CollaboratorLog,
    pub cache: QueryCache<UsersPage>,
}

pub fn harness(seed_users: usize) -> Harness {
    harness_with_stale_time(seed_users, Duration::from_secs(60))
}

pub fn harness_with_stale_time(seed_users: usize, stale_time: Duration) -> Harness {
    let service = TestUserAdminService::with_users(seed_users);
    let admin = Arc::new(service.clone());
    build(service, admin, stale_time)
}

/// Route calls through `admin`, which is expected to wrap `service`
pub fn harness_with_service(
    service: TestUserAdminService,
    admin: Arc<dyn UserAdminService>,
) -> Harness {
    build(service, admin, Duration::from_secs(60))
}

fn build(
    service: TestUserAdminService,
    admin: Arc<dyn UserAdminService>,
    stale_time: Duration,
) -> Harness {
    let log = CollaboratorLog::new();
    let cache = QueryCache::new(stale_time);

    let state = State::new(admin, cache.clone())
        .with_navigator(Arc::new(RecordingNavigator::new(log.clone())))
        .with_cache_invalidator(Arc::new(RecordingInvalidator::new(
            Arc::new(cache.clone()),
            log.clone(),
        )));

    Harness {
        runtime: Runtime::new(state),
        service,
        log,
        cache,
    }
}

impl Harness {
    pub fn form(&self) -> Option<&CreateUserForm> {
        self.runtime
            .state()
            .domains
            .user_management
            .state
            .create_form
            .as_ref()
    }

    pub fn open_form(&mut self) {
        self.runtime.dispatch(Message::CreateUser);
    }

    pub fn fill(&mut self, name: &str, email: &str, password: &str, confirmation: &str) {
        for (field, value) in [
            (Field::Name, name),
            (Field::Email, email),
            (Field::Password, password),
            (Field::PasswordConfirmation, confirmation),
        ] {
            self.runtime
                .dispatch(Message::CreateUserFormUpdate(field, value.to_string()));
        }
    }

    pub fn submit(&mut self) {
        self.runtime.dispatch(Message::CreateUserFormSubmit);
    }
}
