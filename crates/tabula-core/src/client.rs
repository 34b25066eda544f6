//! Client configuration and the shared handle every operation runs through.
//!
//! [`AirtableClient`] is the only place that knows about credentials and the
//! transport. It is built once, either from a [`ClientConfig`] (which creates
//! the reqwest transport) or from a config plus an existing [`HttpClient`],
//! and then hands out [`Table`] and [`Meta`] views. Operations never decide
//! between "live handle" and "raw key" themselves.

use std::env;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::call::validated_call;
use crate::error::{CallResult, ConfigError};
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::ids::{BaseId, TableId};
use crate::meta::Meta;
use crate::records::{RecordSchema, Table};
use crate::shape::Shape;

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";
pub const API_URL_ENV: &str = "AIRTABLE_API_URL";
pub const TIMEOUT_ENV: &str = "AIRTABLE_TIMEOUT_MS";

/// Static client settings. The API key is a personal access token sent as a
/// bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: String::from(DEFAULT_API_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: String::from(concat!("tabula/", env!("CARGO_PKG_VERSION"))),
        }
    }

    /// Reads `AIRTABLE_API_KEY` (required), `AIRTABLE_API_URL` and
    /// `AIRTABLE_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config = config.with_api_url(url);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
            config.timeout_ms = timeout_ms;
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Shared, cheaply cloneable handle holding credentials and transport.
#[derive(Clone)]
pub struct AirtableClient {
    config: Arc<ClientConfig>,
    auth: HttpAuth,
    http_client: Arc<dyn HttpClient>,
}

impl AirtableClient {
    /// Builds the production reqwest transport from `config`.
    pub fn new(config: ClientConfig) -> Self {
        let http_client = Arc::new(ReqwestHttpClient::new(&config.user_agent));
        Self::with_http_client(config, http_client)
    }

    /// Uses an already-constructed transport.
    pub fn with_http_client(config: ClientConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let auth = HttpAuth::BearerToken(config.api_key.clone());
        Self {
            config: Arc::new(config),
            auth,
            http_client,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Record operations on one table, validated against `schema`.
    pub fn table<F>(&self, base_id: BaseId, table: impl Into<String>, schema: RecordSchema) -> Table<F>
    where
        F: DeserializeOwned,
    {
        Table::new(self.clone(), base_id, table.into(), schema)
    }

    /// Same as [`table`](Self::table) for callers holding a typed table id.
    pub fn table_by_id<F>(&self, base_id: BaseId, table_id: &TableId, schema: RecordSchema) -> Table<F>
    where
        F: DeserializeOwned,
    {
        self.table(base_id, table_id.as_str(), schema)
    }

    /// Base, schema and webhook metadata operations.
    pub fn meta(&self) -> Meta {
        Meta::new(self.clone())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url, path.trim_start_matches('/'))
    }

    /// Attaches credentials and timeout, then executes on the transport.
    pub(crate) fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send + '_ {
        let request = request
            .with_auth(&self.auth)
            .with_timeout_ms(self.config.timeout_ms);
        self.http_client.execute(request)
    }

    /// [`validated_call`] over this client's transport.
    pub(crate) async fn call<A, T, B>(
        &self,
        operation: &str,
        arg: &A,
        arg_shape: &Shape,
        build_request: B,
        result_shape: &Shape,
    ) -> CallResult<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
        B: FnOnce() -> HttpRequest,
    {
        validated_call(
            operation,
            arg,
            arg_shape,
            || self.execute(build_request()),
            result_shape,
        )
        .await
    }
}

impl Debug for AirtableClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
