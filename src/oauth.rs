//! OAuth 2 authorization-code flow for v4 applications.

use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::mask::{mask_secret, masked_params};
use crate::params::Params;
use crate::transport::{self, HttpConfig, USER_AGENT_VALUE};
use crate::{Error, Result};

pub(crate) const AUTHORIZE_URL: &str = "https://app.convertkit.com/oauth/authorize";
pub(crate) const TOKEN_URL: &str = "https://api.convertkit.com/oauth/token";

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub created_at: Option<u64>,
    pub scope: Option<String>,
}

/// Authorization-code grant against the ConvertKit OAuth endpoints.
#[derive(Clone)]
pub struct OAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    authorize_url: String,
    token_url: String,
    user_agent: String,
}

impl fmt::Debug for OAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl OAuth {
    /// Create a flow for the given application credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        let http = HttpConfig::default().build_http()?;
        Ok(Self::with_http(
            http,
            client_id.into(),
            client_secret.into(),
            USER_AGENT_VALUE.to_string(),
        ))
    }

    pub(crate) fn with_http(
        http: reqwest::Client,
        client_id: String,
        client_secret: String,
        user_agent: String,
    ) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            user_agent,
        }
    }

    /// Override the authorization and token endpoints.
    pub fn endpoints(mut self, authorize_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Random value for the `state` parameter.
    pub fn generate_state() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    /// URL to send the user to for granting access.
    pub fn authorization_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&self.authorize_url)
            .map_err(|err| Error::invalid(format!("invalid authorize URL: {err}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("response_type", "code");
            if let Some(state) = state.filter(|s| !s.is_empty()) {
                query.append_pair("state", state);
            }
        }
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let params = Params::new()
            .with("code", code)
            .with("client_id", self.client_id.as_str())
            .with("client_secret", self.client_secret.as_str())
            .with("grant_type", "authorization_code")
            .with("redirect_uri", redirect_uri);
        self.token_request(params).await
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let params = Params::new()
            .with("refresh_token", refresh_token)
            .with("client_id", self.client_id.as_str())
            .with("client_secret", self.client_secret.as_str())
            .with("grant_type", "refresh_token")
            .with("redirect_uri", redirect_uri);
        self.token_request(params).await
    }

    async fn token_request(&self, params: Params) -> Result<TokenResponse> {
        debug!(
            url = %self.token_url,
            params = %masked_params(&params),
            "requesting OAuth token"
        );
        let response = self
            .http
            .post(&self.token_url)
            .headers(self.headers())
            .json(&params)
            .send()
            .await
            .map_err(|err| {
                let err = err.without_url();
                warn!(error = %err, "token request could not be sent");
                err
            })?;

        let body = transport::read_json(response).await?;
        serde_json::from_value(body).map_err(|err| {
            warn!(error = %err, "token response is missing access_token");
            Error::ResponseParse(format!("token response: {err}"))
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_has_expected_query() {
        let oauth = OAuth::new("my-client", "shh").unwrap();
        let url = oauth
            .authorization_url("https://example.com/callback?x=1", None)
            .unwrap();
        assert_eq!(
            url,
            "https://app.convertkit.com/oauth/authorize?client_id=my-client\
             &redirect_uri=https%3A%2F%2Fexample.com%2Fcallback%3Fx%3D1&response_type=code"
        );
    }

    #[test]
    fn authorization_url_appends_state() {
        let oauth = OAuth::new("id", "secret").unwrap();
        let url = oauth.authorization_url("https://example.com/cb", Some("xyz")).unwrap();
        assert!(url.ends_with("&response_type=code&state=xyz"));
    }

    #[test]
    fn generated_state_is_alphanumeric() {
        let state = OAuth::generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, OAuth::generate_state());
    }
}
