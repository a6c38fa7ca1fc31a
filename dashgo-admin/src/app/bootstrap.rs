use std::sync::Arc;
use std::time::Duration;

use dashgo_model::prelude::PageRequest;
use log::{debug, info};
use thiserror::Error;

use crate::infrastructure::api_client::{ApiClient, ApiError};
use crate::infrastructure::query_cache::QueryCache;
use crate::infrastructure::services::user_management::{UserAdminApiAdapter, UserAdminService};
use crate::infrastructure::testing::TestUserAdminService;
use crate::state::State;

pub const API_URL_VAR: &str = "DASHGO_API_URL";
pub const API_TOKEN_VAR: &str = "DASHGO_API_TOKEN";
pub const REQUEST_TIMEOUT_VAR: &str = "DASHGO_REQUEST_TIMEOUT";
pub const USERS_STALE_TIME_VAR: &str = "DASHGO_USERS_STALE_TIME";
pub const USERS_PER_PAGE_VAR: &str = "DASHGO_USERS_PER_PAGE";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var} '{value}'")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid {var} '{value}'")]
    InvalidDuration {
        var: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: Arc<str>,
    pub api_token: Option<Arc<str>>,
    pub request_timeout: Duration,
    pub users_stale_time: Duration,
    pub users_per_page: u32,
    pub use_test_stubs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl AppConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Arc::from(api_url.into()),
            api_token: None,
            request_timeout: ApiClient::DEFAULT_TIMEOUT,
            users_stale_time: QueryCache::<()>::DEFAULT_STALE_TIME,
            users_per_page: PageRequest::DEFAULT_PER_PAGE,
            use_test_stubs: false,
        }
    }

    /// Load `.env` if present, then read `DASHGO_*` variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        let env_file_loaded = dotenvy::dotenv().map(|_| true).or_else(|err| match err {
            dotenvy::Error::Io(_) => Ok(false),
            _ => Err(err),
        })?;
        debug!("Loaded .env file: {}", env_file_loaded);

        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset or blank means default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(value) = read(API_URL_VAR) {
            url::Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
                var: API_URL_VAR,
                value: value.clone(),
                source,
            })?;
            config.api_url = Arc::from(value);
        }

        config.api_token = read(API_TOKEN_VAR).map(Arc::from);

        if let Some(value) = read(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = parse_duration(REQUEST_TIMEOUT_VAR, value)?;
        }

        if let Some(value) = read(USERS_STALE_TIME_VAR) {
            config.users_stale_time = parse_duration(USERS_STALE_TIME_VAR, value)?;
        }

        if let Some(value) = read(USERS_PER_PAGE_VAR) {
            config.users_per_page = match value.parse::<u32>() {
                Ok(per_page) if per_page > 0 => per_page,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: USERS_PER_PAGE_VAR,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn use_test_stubs(&self) -> bool {
        self.use_test_stubs
    }

    pub fn with_test_stubs(mut self, enabled: bool) -> Self {
        self.use_test_stubs = enabled;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Arc::from(api_url.into());
        self
    }
}

fn parse_duration(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    humantime::parse_duration(&value)
        .map_err(|source| ConfigError::InvalidDuration { var, value, source })
}

/// HTTP-backed user service for `config`
pub fn user_admin_service(config: &AppConfig) -> Result<Arc<dyn UserAdminService>, ApiError> {
    if config.use_test_stubs() {
        info!("Using in-memory user service");
        return Ok(Arc::new(TestUserAdminService::with_users(25)));
    }

    let client = ApiClient::new(config.api_url(), config.request_timeout)?
        .with_token(config.api_token.as_deref().map(str::to_string));
    Ok(Arc::new(UserAdminApiAdapter::new(Arc::new(client))))
}

/// Boot logic shared by the binary and tests
pub fn base_state(config: &AppConfig) -> Result<State, ApiError> {
    let service = user_admin_service(config)?;
    let cache = QueryCache::new(config.users_stale_time);
    Ok(State::new(service, cache).with_per_page(config.users_per_page))
}
