use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;

/// Header carrying the collection size on paginated endpoints
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 422 with per-field messages, keyed by wire field name
    #[error("server rejected the request: {}", summarize(.errors))]
    Rejected {
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn summarize(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessages {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RejectionBody {
    errors: BTreeMap<String, ErrorMessages>,
}

/// JSON REST client for the dashboard API
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
    token_store: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field(
                "has_token",
                &self
                    .token_store
                    .try_read()
                    .map(|t| t.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    /// Join `path` onto the base URL; absolute URLs pass through
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start with a bearer token already in place
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token_store = Arc::new(RwLock::new(token));
        self
    }

    /// Set the bearer token sent with every request
    pub async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token_store.read().await.is_some()
    }

    /// Build a request with authentication headers
    async fn build_request(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.token_store.read().await.as_ref() {
            builder.bearer_auth(token)
        } else {
            builder
        }
    }

    /// Map non-success statuses to errors, passing successful responses on
    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(rejection) = serde_json::from_str::<RejectionBody>(&body) {
                let errors = rejection
                    .errors
                    .into_iter()
                    .map(|(field, messages)| {
                        let messages = match messages {
                            ErrorMessages::One(message) => vec![message],
                            ErrorMessages::Many(messages) => messages,
                        };
                        (field, messages)
                    })
                    .collect();
                return Err(ApiError::Rejected { errors });
            }
            warn!("[ApiClient] 422 response without field errors: {}", body);
        }

        Err(ApiError::Status { status, body })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let (data, _) = self.get_with_total(path, query).await?;
        Ok(data)
    }

    /// GET request that also reports the `x-total-count` header, if any
    pub async fn get_with_total<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<(T, Option<u64>)> {
        let url = self.build_url(path);
        debug!("[ApiClient] GET {} {:?}", url, query);

        let request = self.client.get(&url).query(query);
        let request = self.build_request(request).await;
        let response = Self::check_status(request.send().await?).await?;

        let total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        Ok((Self::decode(response).await?, total))
    }

    /// POST request with a JSON body
    pub async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ApiResult<R> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST {}", url);

        let request = self.client.post(&url).json(body);
        let request = self.build_request(request).await;
        let response = Self::check_status(request.send().await?).await?;
        Self::decode(response).await
    }
}
