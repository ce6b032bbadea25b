//! HTTP plumbing shared by both client generations.

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::mask;
use crate::params::Params;
use crate::request::{ApiRequest, Method, Scope};
use crate::{Error, Result};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.convertkit.com";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const USER_AGENT_VALUE: &str = concat!("convertkit-client/", env!("CARGO_PKG_VERSION"));

/// Authentication material for one client instance.
///
/// The variant decides the API version, how requests are authorized and
/// which headers are sent.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// API key and secret, sent as request parameters to `v3`.
    Legacy { api_key: String, api_secret: String },
    /// OAuth application credentials and a bearer token for `v4`.
    OAuth {
        client_id: String,
        client_secret: String,
        access_token: String,
    },
}

impl Credentials {
    pub fn version(&self) -> &'static str {
        match self {
            Credentials::Legacy { .. } => "v3",
            Credentials::OAuth { .. } => "v4",
        }
    }

    /// Add legacy credential parameters. Bearer credentials travel in headers.
    fn authorize(&self, params: &mut Params, scope: Scope) {
        if let Credentials::Legacy { api_key, api_secret } = self {
            match scope {
                Scope::Public => params.insert("api_key", api_key.as_str()),
                Scope::Secret => params.insert("api_secret", api_secret.as_str()),
            };
        }
    }

    fn headers(&self, user_agent: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Credentials::OAuth { access_token, .. } = self {
            let mut value = HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| Error::invalid("access token contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Legacy { api_key, api_secret } => f
                .debug_struct("Legacy")
                .field("api_key", &mask::mask_secret(api_key))
                .field("api_secret", &mask::mask_secret(api_secret))
                .finish(),
            Credentials::OAuth {
                client_id,
                client_secret,
                access_token,
            } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &mask::mask_secret(client_secret))
                .field("access_token", &mask::mask_secret(access_token))
                .finish(),
        }
    }
}

/// Connection settings shared by the client builders.
#[derive(Debug, Clone)]
pub(crate) struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT_VALUE.to_string(),
            proxy: None,
        }
    }
}

impl HttpConfig {
    pub(crate) fn build_http(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        Ok(builder.build()?)
    }
}

/// Sends composed requests and decodes their JSON bodies.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    credentials: Credentials,
}

impl Transport {
    pub(crate) fn new(config: &HttpConfig, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            http: config.build_http()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            credentials,
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    pub(crate) fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Absolute URL of an endpoint under this generation's version root.
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.credentials.version(),
            path.trim_start_matches('/')
        )
    }

    /// Send one request and decode the response.
    ///
    /// Blank parameters are stripped first. GET and DELETE carry parameters
    /// in the query string, POST and PUT as a JSON body.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let ApiRequest {
            method,
            path,
            mut params,
            scope,
        } = request;
        params.strip_blank();
        self.credentials.authorize(&mut params, scope);
        debug!(params = %mask::masked_params(&params), "sending request");

        let url = self.url(&path);
        let builder = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        let builder = if method.uses_query() {
            builder.query(&params.to_query_pairs())
        } else {
            builder.json(&params)
        };

        let headers = self.credentials.headers(&self.user_agent)?;
        let response = match builder.headers(headers).send().await {
            Ok(response) => response,
            Err(err) => {
                // Legacy credentials ride in the query string.
                let err = err.without_url();
                warn!(error = %err, "request could not be sent");
                return Err(err.into());
            }
        };
        read_json(response).await
    }
}

/// Decode a response, treating any status outside 2xx/3xx as a failure.
///
/// An empty success body decodes to `Value::Null`. A body that is not JSON is
/// an error, never a partial value.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            let err = err.without_url();
            warn!(%status, error = %err, "failed to read response body");
            return Err(err.into());
        }
    };

    if !(status.is_success() || status.is_redirection()) {
        warn!(%status, body = %mask::mask_text(&body), "API returned an error status");
        return Err(Error::Api { status, body });
    }
    debug!(%status, "received response");

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|err| {
        warn!(%status, error = %err, "response body is not valid JSON");
        Error::Json(err)
    })
}
