//! User management domain
//!
//! Contains the user listing and the create-user form, plus the handlers
//! that drive them

pub mod form;
pub mod messages;
pub mod update;
pub mod validation;

use std::sync::Arc;

use dashgo_model::prelude::{PageRequest, User, UsersPage};
use log::debug;

use self::form::{CreateUserForm, FormId};
use self::messages::Message as UserManagementMessage;
use crate::common::messages::{CrossDomainEvent, DomainMessage};
use crate::common::task::Task;
use crate::infrastructure::navigation::Route;
use crate::infrastructure::services::user_management::UserAdminService;

/// A listing fetch in flight, tagged with the cache generation it started under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoad {
    pub page: u32,
    pub generation: u64,
}

/// What the listing view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListState {
    pub current_page: u32,
    pub page: Option<UsersPage>,
    /// Shown data is known to be out of date and a refetch is due
    pub is_stale: bool,
    pub loading: Option<PendingLoad>,
    pub error: Option<String>,
}

impl Default for UserListState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page: None,
            is_stale: false,
            loading: None,
            error: None,
        }
    }
}

impl UserListState {
    pub fn users(&self) -> &[User] {
        self.page
            .as_ref()
            .map(|page| page.users.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }
}

/// User management domain state
pub struct UserManagementDomainState {
    pub user_admin_service: Option<Arc<dyn UserAdminService>>,
    /// Present only while the create-user screen is shown
    pub create_form: Option<CreateUserForm>,
    pub user_list: UserListState,
    pub per_page: u32,
    /// Most recent successful creation, for confirmation messages
    pub last_created: Option<User>,
    next_form_id: u64,
}

impl Default for UserManagementDomainState {
    fn default() -> Self {
        Self {
            user_admin_service: None,
            create_form: None,
            user_list: UserListState::default(),
            per_page: PageRequest::DEFAULT_PER_PAGE,
            last_created: None,
            next_form_id: 0,
        }
    }
}

impl UserManagementDomainState {
    pub fn with_service(service: Arc<dyn UserAdminService>) -> Self {
        Self {
            user_admin_service: Some(service),
            ..Self::default()
        }
    }

    /// Replace any existing form with a fresh, empty one
    pub fn mount_create_form(&mut self) -> FormId {
        self.next_form_id += 1;
        let id = FormId(self.next_form_id);
        self.create_form = Some(CreateUserForm::new(id));
        id
    }

    pub fn unmount_create_form(&mut self) -> Option<CreateUserForm> {
        self.create_form.take()
    }
}

impl std::fmt::Debug for UserManagementDomainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserManagementDomainState")
            .field(
                "has_user_admin_service",
                &self.user_admin_service.as_ref().map(|_| true),
            )
            .field("create_form", &self.create_form)
            .field("user_list", &self.user_list)
            .field("per_page", &self.per_page)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct UserManagementDomain {
    pub state: UserManagementDomainState,
}

impl UserManagementDomain {
    pub fn new(state: UserManagementDomainState) -> Self {
        Self { state }
    }

    /// React to events raised by any domain
    pub fn handle_event(&mut self, event: &CrossDomainEvent) -> Task<DomainMessage> {
        match event {
            CrossDomainEvent::NavigateTo(Route::CreateUser) => {
                if self.state.create_form.is_none() {
                    let id = self.state.mount_create_form();
                    debug!("Mounted create user {}", id);
                }
                Task::none()
            }
            CrossDomainEvent::NavigateTo(Route::UserList) => {
                if let Some(form) = self.state.unmount_create_form() {
                    debug!("Dropped create user {} ({:?})", form.id(), form.status());
                }
                Task::done(DomainMessage::from(UserManagementMessage::LoadUsers(
                    self.state.user_list.current_page,
                )))
            }
            CrossDomainEvent::InvalidateQueries(_) => Task::none(),
        }
    }
}
