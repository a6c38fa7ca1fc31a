use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dashgo_model::prelude::{CreateUserRequest, PageRequest, User, UserId, UsersPage};
use reqwest::StatusCode;

use crate::infrastructure::api_client::{ApiError, ApiResult};
use crate::infrastructure::services::user_management::UserAdminService;

/// Failure to hand out on the next `create_user` call
#[derive(Debug, Clone)]
enum InjectedFailure {
    Status(StatusCode, String),
    Rejected(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Default)]
struct InnerUserAdminState {
    users: Vec<User>,
    next_id: u64,
    create_requests: Vec<CreateUserRequest>,
    list_requests: Vec<PageRequest>,
    next_create_failure: Option<InjectedFailure>,
    next_list_failure: Option<String>,
}

/// In-memory user backend; clones share state
#[derive(Debug, Clone, Default)]
pub struct TestUserAdminService {
    inner: Arc<RwLock<InnerUserAdminState>>,
}

impl TestUserAdminService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with `count` generated users
    pub fn with_users(count: usize) -> Self {
        let service = Self::new();
        for n in 1..=count {
            service.push_user(sample_user(n as u64));
        }
        service
    }

    pub fn push_user(&self, user: User) {
        if let Ok(mut guard) = self.inner.write() {
            guard.next_id = guard.next_id.max(user.id.as_str().parse().unwrap_or(0));
            guard.users.push(user);
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.inner
            .read()
            .map(|guard| guard.users.clone())
            .unwrap_or_default()
    }

    /// Fail the next `create_user` with an opaque server error
    pub fn fail_next_create(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.next_create_failure = Some(InjectedFailure::Status(
                StatusCode::INTERNAL_SERVER_ERROR,
                message.into(),
            ));
        }
    }

    /// Reject the next `create_user` with per-field messages, as a 422 would
    pub fn reject_next_create<I, F, M>(&self, errors: I)
    where
        I: IntoIterator<Item = (F, M)>,
        F: Into<String>,
        M: Into<String>,
    {
        let mut by_field: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, message) in errors {
            by_field.entry(field.into()).or_default().push(message.into());
        }
        if let Ok(mut guard) = self.inner.write() {
            guard.next_create_failure = Some(InjectedFailure::Rejected(by_field));
        }
    }

    pub fn fail_next_list(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.next_list_failure = Some(message.into());
        }
    }

    pub fn create_calls(&self) -> usize {
        self.inner
            .read()
            .map(|guard| guard.create_requests.len())
            .unwrap_or(0)
    }

    pub fn create_requests(&self) -> Vec<CreateUserRequest> {
        self.inner
            .read()
            .map(|guard| guard.create_requests.clone())
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.inner
            .read()
            .map(|guard| guard.list_requests.len())
            .unwrap_or(0)
    }

    pub fn list_requests(&self) -> Vec<PageRequest> {
        self.inner
            .read()
            .map(|guard| guard.list_requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserAdminService for TestUserAdminService {
    async fn list_users(&self, page: PageRequest) -> anyhow::Result<UsersPage> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow!("user store lock poisoned"))?;
        guard.list_requests.push(page);

        if let Some(message) = guard.next_list_failure.take() {
            return Err(anyhow!(message));
        }

        let start = (page.page as usize - 1).saturating_mul(page.per_page as usize);
        let users = guard
            .users
            .iter()
            .skip(start)
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok(UsersPage::new(users, guard.users.len() as u64, page))
    }

    async fn create_user(&self, request: CreateUserRequest) -> ApiResult<User> {
        let mut guard = self.inner.write().map_err(|_| ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "user store lock poisoned".to_string(),
        })?;
        guard.create_requests.push(request.clone());

        match guard.next_create_failure.take() {
            Some(InjectedFailure::Status(status, body)) => {
                return Err(ApiError::Status { status, body });
            }
            Some(InjectedFailure::Rejected(errors)) => {
                return Err(ApiError::Rejected { errors });
            }
            None => {}
        }

        guard.next_id += 1;
        let user = User {
            id: UserId::from(guard.next_id),
            name: request.user.name,
            email: request.user.email,
            created_at: request.user.created_at,
        };
        guard.users.push(user.clone());
        Ok(user)
    }
}

/// Deterministic user `n`, registered at noon on January `n % 28 + 1`, 2023
pub fn sample_user(n: u64) -> User {
    let day = (n % 28 + 1) as u32;
    User {
        id: UserId::from(n),
        name: format!("User {n}"),
        email: format!("user{n}@example.com"),
        created_at: Utc
            .with_ymd_and_hms(2023, 1, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn sample_dates_wrap_within_january() {
        assert_eq!(sample_user(1).created_at.day(), 2);
        assert_eq!(sample_user(27).created_at.day(), 28);
        assert_eq!(sample_user(28).created_at.day(), 1);
        assert!((0..100).all(|n| sample_user(n).created_at.month() == 1));
    }
}
