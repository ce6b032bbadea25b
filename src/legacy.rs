//! ConvertKit v3 client, authorized with an API key and secret.
//!
//! The v3 API pages by number rather than cursor and serves forms and
//! landing pages from one unfiltered collection, so this client does the
//! split and the archived filtering itself.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Purchase, ResourceKind, validate_email};
use crate::normalize::{self, FormsAndLandingPages};
use crate::params::Params;
use crate::request::ApiRequest;
use crate::transport::{Credentials, HttpConfig, Transport};
use crate::{Error, Result};

/// Default cap on pages walked by [`LegacyClient::get_subscriber_id`].
pub const DEFAULT_MAX_SUBSCRIBER_PAGES: u32 = 100;

/// Async client for the legacy ConvertKit v3 API.
#[derive(Debug, Clone)]
pub struct LegacyClient {
    transport: Transport,
    max_subscriber_pages: u32,
}

impl LegacyClient {
    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>, api_secret: impl Into<String>) -> LegacyClientBuilder {
        LegacyClientBuilder::new(api_key, api_secret)
    }

    /// Create a client with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::LegacyClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = LegacyClient::new("api-key", "api-secret")?;
    /// let account = client.get_account().await?;
    /// println!("{}", account["primary_email_address"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        LegacyClientBuilder::new(api_key, api_secret).build()
    }

    /// Send a hand-built request, for endpoints without a dedicated method.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        self.transport.execute(request).await
    }

    /// `GET account` (secret-authorized).
    pub async fn get_account(&self) -> Result<Value> {
        self.execute(ApiRequest::get("account").secret()).await
    }

    async fn get_forms_collection(&self) -> Result<FormsAndLandingPages> {
        let payload = self.execute(ApiRequest::get("forms")).await?;
        Ok(normalize::split_forms(&payload))
    }

    /// Active forms, landing pages excluded.
    pub async fn get_forms(&self) -> Result<Vec<Value>> {
        Ok(self.get_forms_collection().await?.forms)
    }

    /// Active landing pages.
    pub async fn get_landing_pages(&self) -> Result<Vec<Value>> {
        Ok(self.get_forms_collection().await?.landing_pages)
    }

    /// Subscription-form ID to form ID, archived entries excluded.
    pub async fn get_subscription_forms(&self) -> Result<BTreeMap<u64, u64>> {
        let payload = self.execute(ApiRequest::get("subscription_forms")).await?;
        Ok(normalize::subscription_form_map(&payload))
    }

    /// List one named resource collection.
    ///
    /// Unknown names fail with [`Error::InvalidArgument`] before a request
    /// is made.
    pub async fn get_resources(&self, resource: &str) -> Result<Vec<Value>> {
        let kind: ResourceKind = resource.parse()?;
        Ok(match kind {
            ResourceKind::Forms => self.get_forms().await?,
            ResourceKind::LandingPages => self.get_landing_pages().await?,
            ResourceKind::Tags => self.get_tags().await?,
            ResourceKind::Sequences => self.get_sequences().await?,
            ResourceKind::CustomFields => self.get_custom_fields().await?,
        })
    }

    /// Subscribe an address to a form.
    ///
    /// # Arguments
    /// * `form_id` - The form to subscribe to
    /// * `email` - Subscriber address, validated before sending
    /// * `first_name` - Optional first name
    ///
    /// # Returns
    /// The `subscription` payload from `POST forms/{id}/subscribe`
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::LegacyClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = LegacyClient::new("api-key", "api-secret")?;
    /// client.form_subscribe(123, "jane@example.com", Some("Jane")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn form_subscribe(
        &self,
        form_id: u64,
        email: &str,
        first_name: Option<&str>,
    ) -> Result<Value> {
        validate_email(email)?;
        self.execute(
            ApiRequest::post(format!("forms/{form_id}/subscribe"))
                .param("email", email)
                .param_opt("first_name", first_name),
        )
        .await
    }

    /// Sequences, served by v3 under their old name `courses`.
    pub async fn get_sequences(&self) -> Result<Vec<Value>> {
        let payload = self.execute(ApiRequest::get("sequences")).await?;
        Ok(normalize::collection(&payload, "courses"))
    }

    /// `POST sequences/{id}/subscribe`.
    pub async fn add_subscriber_to_sequence(&self, sequence_id: u64, email: &str) -> Result<Value> {
        validate_email(email)?;
        self.execute(ApiRequest::post(format!("sequences/{sequence_id}/subscribe")).param("email", email))
            .await
    }

    /// `GET tags`.
    pub async fn get_tags(&self) -> Result<Vec<Value>> {
        let payload = self.execute(ApiRequest::get("tags")).await?;
        Ok(normalize::collection(&payload, "tags"))
    }

    /// `POST tags` with the name nested under `tag`.
    pub async fn create_tag(&self, name: &str) -> Result<Value> {
        self.execute(
            ApiRequest::post("tags")
                .param("tag", Params::new().with("name", name))
                .secret(),
        )
        .await
    }

    /// `POST tags/{id}/subscribe`.
    pub async fn tag_subscriber(&self, tag_id: u64, email: &str) -> Result<Value> {
        validate_email(email)?;
        self.execute(
            ApiRequest::post(format!("tags/{tag_id}/subscribe"))
                .param("email", email)
                .secret(),
        )
        .await
    }

    /// `DELETE subscribers/{subscriber_id}/tags/{tag_id}`.
    pub async fn remove_tag_from_subscriber(&self, tag_id: u64, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::delete(format!("subscribers/{subscriber_id}/tags/{tag_id}")).secret())
            .await
    }

    /// Find a subscriber's ID by walking the filtered listing page by page.
    ///
    /// The first match wins, in the API's page order. `Ok(None)` means every
    /// page was scanned without a match; [`Error::PageLimit`] means the scan
    /// stopped at the configured page cap first.
    pub async fn get_subscriber_id(&self, email: &str) -> Result<Option<u64>> {
        validate_email(email)?;
        let mut page: u32 = 1;
        loop {
            let payload = self
                .execute(
                    ApiRequest::get("subscribers")
                        .param("email_address", email)
                        .param("page", page)
                        .secret(),
                )
                .await?;

            if let Some(id) = normalize::first_subscriber_id(&payload, email) {
                return Ok(Some(id));
            }

            let total_pages = normalize::total_pages(&payload);
            if page >= total_pages {
                debug!(pages = page, email = %crate::mask::mask_email(email), "no subscriber found");
                return Ok(None);
            }
            if page >= self.max_subscriber_pages {
                warn!(pages = page, total_pages, "subscriber scan hit its page limit");
                return Err(Error::PageLimit(page));
            }
            page += 1;
        }
    }

    /// `GET subscribers/{id}`.
    pub async fn get_subscriber(&self, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("subscribers/{subscriber_id}")).secret())
            .await
    }

    /// `GET subscribers/{id}/tags`, unwrapped to the tag list.
    pub async fn get_subscriber_tags(&self, subscriber_id: u64) -> Result<Vec<Value>> {
        let payload = self
            .execute(ApiRequest::get(format!("subscribers/{subscriber_id}/tags")).secret())
            .await?;
        Ok(normalize::collection(&payload, "tags"))
    }

    /// `PUT unsubscribe`: unsubscribe an address from everything.
    pub async fn unsubscribe(&self, email: &str) -> Result<Value> {
        validate_email(email)?;
        self.execute(ApiRequest::put("unsubscribe").param("email", email).secret())
            .await
    }

    /// `GET custom_fields`, unwrapped to the field list.
    pub async fn get_custom_fields(&self) -> Result<Vec<Value>> {
        let payload = self.execute(ApiRequest::get("custom_fields")).await?;
        Ok(normalize::collection(&payload, "custom_fields"))
    }

    /// Record a purchase; v3 nests the fields under `purchase`.
    pub async fn create_purchase(&self, purchase: &Purchase) -> Result<Value> {
        let fields = purchase.to_params()?;
        self.execute(ApiRequest::post("purchases").param("purchase", fields).secret())
            .await
    }
}

/// Builder for configuring a [`LegacyClient`].
#[derive(Debug, Clone)]
pub struct LegacyClientBuilder {
    api_key: String,
    api_secret: String,
    max_subscriber_pages: u32,
    http: HttpConfig,
}

impl LegacyClientBuilder {
    /// Create a new builder with defaults:
    /// - `https://api.convertkit.com` base URL
    /// - 10 second timeout
    /// - No proxy
    /// - `convertkit-client/<version>` user agent
    /// - 100-page cap on subscriber lookups
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            max_subscriber_pages: DEFAULT_MAX_SUBSCRIBER_PAGES,
            http: HttpConfig::default(),
        }
    }

    /// Override the API root (the version segment is appended).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http.base_url = base_url.into();
        self
    }

    /// Maximum time to wait for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http.proxy = Some(proxy.into());
        self
    }

    /// Upper bound on pages scanned when looking up a subscriber by e-mail.
    ///
    /// Values below 1 are treated as 1.
    pub fn max_subscriber_pages(mut self, pages: u32) -> Self {
        self.max_subscriber_pages = pages.max(1);
        self
    }

    /// Build the client. No request is made.
    pub fn build(self) -> Result<LegacyClient> {
        if self.api_key.is_empty() && self.api_secret.is_empty() {
            return Err(Error::invalid("an API key or API secret is required"));
        }
        let credentials = Credentials::Legacy {
            api_key: self.api_key,
            api_secret: self.api_secret,
        };
        Ok(LegacyClient {
            transport: Transport::new(&self.http, credentials)?,
            max_subscriber_pages: self.max_subscriber_pages,
        })
    }
}
