use anyhow::Result;
use async_trait::async_trait;
use dashgo_model::prelude::{
    CreateUserRequest, PageRequest, User, UserEnvelope, UsersEnvelope, UsersPage,
};
use std::sync::Arc;

use crate::infrastructure::api_client::{ApiClient, ApiResult};

/// Users collection path, relative to the API base URL
pub const USERS_PATH: &str = "users";

#[async_trait]
pub trait UserAdminService: Send + Sync {
    async fn list_users(&self, page: PageRequest) -> Result<UsersPage>;
    /// Typed error so server-side field rejections survive the trip back
    async fn create_user(&self, request: CreateUserRequest) -> ApiResult<User>;
}

#[derive(Clone, Debug)]
pub struct UserAdminApiAdapter {
    client: Arc<ApiClient>,
}

impl UserAdminApiAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserAdminService for UserAdminApiAdapter {
    async fn list_users(&self, page: PageRequest) -> Result<UsersPage> {
        let query = [
            ("page", page.page.to_string()),
            ("per_page", page.per_page.to_string()),
        ];
        let (envelope, total): (UsersEnvelope, _) =
            self.client.get_with_total(USERS_PATH, &query).await?;

        // Without the header, the page itself is all we know about
        let total = total.unwrap_or(envelope.users.len() as u64);
        Ok(UsersPage::new(envelope.users, total, page))
    }

    async fn create_user(&self, request: CreateUserRequest) -> ApiResult<User> {
        let envelope: UserEnvelope = self.client.post(USERS_PATH, &request).await?;
        Ok(envelope.user)
    }
}
