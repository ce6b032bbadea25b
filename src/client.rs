//! ConvertKit v4 async client.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::models::{
    Broadcast, FormAddition, NewSubscriber, Purchase, ResourceKind, SubscriberUpdate, Tagging,
    WebhookEvent, bulk_params, require_items, validate_email,
};
use crate::normalize::{self, FormsAndLandingPages};
use crate::oauth::{self, OAuth, TokenResponse};
use crate::pagination::{
    FormStatus, Pagination, SubscriberQuery, SubscriberState, SubscriptionFilter, format_date,
};
use crate::params::{ParamValue, Params};
use crate::request::ApiRequest;
use crate::transport::{Credentials, HttpConfig, Transport};
use crate::{Error, Result};

/// Async client for the ConvertKit v4 API, authorized with an OAuth bearer
/// token.
///
/// Every method sends exactly one request and returns the decoded JSON
/// payload. List methods take a [`Pagination`]; the next page's cursor is in
/// the response's `pagination.end_cursor` (see
/// [`PageInfo`](crate::PageInfo)).
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
    authorize_url: String,
    token_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(client_id, client_secret, access_token)
    }

    /// Create a client with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = Client::new("client-id", "client-secret", "access-token")?;
    /// let account = client.get_account().await?;
    /// println!("{}", account["account"]["name"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new(client_id, client_secret, access_token).build()
    }

    /// OAuth flow for this client's application credentials.
    pub fn oauth(&self) -> OAuth {
        let (client_id, client_secret) = match self.transport.credentials() {
            Credentials::OAuth {
                client_id,
                client_secret,
                ..
            } => (client_id.clone(), client_secret.clone()),
            // ClientBuilder only ever installs OAuth credentials.
            Credentials::Legacy { .. } => (String::new(), String::new()),
        };
        OAuth::with_http(
            self.transport.http().clone(),
            client_id,
            client_secret,
            self.transport.user_agent().to_string(),
        )
        .endpoints(self.authorize_url.as_str(), self.token_url.as_str())
    }

    /// Replace the bearer token used for subsequent requests.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        if let Credentials::OAuth { access_token, .. } = self.transport.credentials_mut() {
            *access_token = token.into();
        }
    }

    /// Refresh the access token and start using the new one.
    pub async fn refresh_access_token(
        &mut self,
        refresh_token: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        let tokens = self.oauth().refresh_token(refresh_token, redirect_uri).await?;
        self.set_access_token(tokens.access_token.clone());
        debug!("access token refreshed");
        Ok(tokens)
    }

    /// Send a hand-built request, for endpoints without a dedicated method.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        self.transport.execute(request).await
    }

    // Account

    /// `GET account`: the account's name, plan and primary e-mail.
    pub async fn get_account(&self) -> Result<Value> {
        self.execute(ApiRequest::get("account")).await
    }

    /// `GET account/colors`: the saved color palette.
    pub async fn get_account_colors(&self) -> Result<Value> {
        self.execute(ApiRequest::get("account/colors")).await
    }

    /// Replace the account's saved colors (hex strings).
    pub async fn update_account_colors(&self, colors: &[&str]) -> Result<Value> {
        self.execute(ApiRequest::put("account/colors").param("colors", colors.to_vec()))
            .await
    }

    /// `GET account/creator_profile`.
    pub async fn get_creator_profile(&self) -> Result<Value> {
        self.execute(ApiRequest::get("account/creator_profile")).await
    }

    /// `GET account/email_stats`: send and open totals for the last 90 days.
    pub async fn get_email_stats(&self) -> Result<Value> {
        self.execute(ApiRequest::get("account/email_stats")).await
    }

    /// Growth stats between two dates; the API defaults to the last 90 days.
    pub async fn get_growth_stats(
        &self,
        starting: Option<NaiveDate>,
        ending: Option<NaiveDate>,
    ) -> Result<Value> {
        self.execute(
            ApiRequest::get("account/growth_stats")
                .param_opt("starting", starting.map(format_date))
                .param_opt("ending", ending.map(format_date)),
        )
        .await
    }

    // Forms and landing pages

    /// `GET forms` restricted to embedded forms.
    pub async fn get_forms(&self, status: FormStatus, pagination: &Pagination) -> Result<Value> {
        self.execute(
            ApiRequest::get("forms")
                .param("type", "embed")
                .param("status", status.as_str())
                .paginate(pagination),
        )
        .await
    }

    /// `GET forms` restricted to hosted landing pages.
    pub async fn get_landing_pages(
        &self,
        status: FormStatus,
        pagination: &Pagination,
    ) -> Result<Value> {
        self.execute(
            ApiRequest::get("forms")
                .param("type", "hosted")
                .param("status", status.as_str())
                .paginate(pagination),
        )
        .await
    }

    /// Fetch the shared `forms` collection once and split it client-side.
    pub async fn get_forms_and_landing_pages(
        &self,
        pagination: &Pagination,
    ) -> Result<FormsAndLandingPages> {
        let payload = self
            .execute(
                ApiRequest::get("forms")
                    .param("status", FormStatus::Active.as_str())
                    .paginate(pagination),
            )
            .await?;
        Ok(normalize::split_forms(&payload))
    }

    /// `GET forms/{id}/subscribers`, filtered by state and `added_*` dates.
    pub async fn get_form_subscriptions(
        &self,
        form_id: u64,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Value> {
        let mut params = Params::new();
        filter.apply(&mut params, "added");
        self.execute(
            ApiRequest::get(format!("forms/{form_id}/subscribers"))
                .params(params)
                .paginate(pagination),
        )
        .await
    }

    /// `POST forms/{form_id}/subscribers/{subscriber_id}`.
    pub async fn add_subscriber_to_form(
        &self,
        form_id: u64,
        subscriber_id: u64,
        referrer: Option<&str>,
    ) -> Result<Value> {
        self.execute(
            ApiRequest::post(format!("forms/{form_id}/subscribers/{subscriber_id}"))
                .param_opt("referrer", referrer),
        )
        .await
    }

    /// Add a subscriber to a form by e-mail address.
    ///
    /// # Arguments
    /// * `form_id` - The form to subscribe to
    /// * `email_address` - Subscriber address, validated before sending
    /// * `referrer` - Optional referring URL, used for attribution
    ///
    /// # Returns
    /// The `subscriber` payload from `POST forms/{id}/subscribers`
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = Client::new("client-id", "client-secret", "access-token")?;
    /// let added = client
    ///     .add_subscriber_to_form_by_email(123, "jane@example.com", None)
    ///     .await?;
    /// println!("{}", added["subscriber"]["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_subscriber_to_form_by_email(
        &self,
        form_id: u64,
        email_address: &str,
        referrer: Option<&str>,
    ) -> Result<Value> {
        validate_email(email_address)?;
        self.execute(
            ApiRequest::post(format!("forms/{form_id}/subscribers"))
                .param("email_address", email_address)
                .param_opt("referrer", referrer),
        )
        .await
    }

    /// Add existing subscribers to forms in one request.
    pub async fn add_subscribers_to_forms(
        &self,
        additions: &[FormAddition],
        callback_url: Option<&str>,
    ) -> Result<Value> {
        require_items(additions, "form addition")?;
        let items: Vec<ParamValue> = additions.iter().map(ParamValue::from).collect();
        self.execute(
            ApiRequest::post("bulk/forms/subscribers")
                .params(bulk_params("additions", items, callback_url)),
        )
        .await
    }

    // Sequences

    /// `GET sequences`.
    pub async fn get_sequences(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("sequences").paginate(pagination))
            .await
    }

    /// `GET sequences/{id}/subscribers`, filtered by state and `added_*` dates.
    pub async fn get_sequence_subscriptions(
        &self,
        sequence_id: u64,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Value> {
        let mut params = Params::new();
        filter.apply(&mut params, "added");
        self.execute(
            ApiRequest::get(format!("sequences/{sequence_id}/subscribers"))
                .params(params)
                .paginate(pagination),
        )
        .await
    }

    /// `POST sequences/{sequence_id}/subscribers/{subscriber_id}`.
    pub async fn add_subscriber_to_sequence(
        &self,
        sequence_id: u64,
        subscriber_id: u64,
    ) -> Result<Value> {
        self.execute(ApiRequest::post(format!(
            "sequences/{sequence_id}/subscribers/{subscriber_id}"
        )))
        .await
    }

    /// `POST sequences/{id}/subscribers` with the subscriber's address.
    pub async fn add_subscriber_to_sequence_by_email(
        &self,
        sequence_id: u64,
        email_address: &str,
    ) -> Result<Value> {
        validate_email(email_address)?;
        self.execute(
            ApiRequest::post(format!("sequences/{sequence_id}/subscribers"))
                .param("email_address", email_address),
        )
        .await
    }

    // Tags

    /// `GET tags`.
    pub async fn get_tags(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("tags").paginate(pagination)).await
    }

    /// `POST tags`: create one tag, returned under `tag`.
    pub async fn create_tag(&self, name: &str) -> Result<Value> {
        self.execute(ApiRequest::post("tags").param("name", name)).await
    }

    /// `POST bulk/tags`. Large batches are processed asynchronously and
    /// reported to `callback_url`.
    pub async fn create_tags(&self, names: &[&str], callback_url: Option<&str>) -> Result<Value> {
        require_items(names, "tag name")?;
        let items: Vec<ParamValue> = names
            .iter()
            .map(|name| ParamValue::from(Params::new().with("name", *name)))
            .collect();
        self.execute(ApiRequest::post("bulk/tags").params(bulk_params("tags", items, callback_url)))
            .await
    }

    /// `PUT tags/{id}`: rename a tag.
    pub async fn update_tag_name(&self, tag_id: u64, name: &str) -> Result<Value> {
        self.execute(ApiRequest::put(format!("tags/{tag_id}")).param("name", name))
            .await
    }

    /// `POST tags/{tag_id}/subscribers/{subscriber_id}`.
    pub async fn tag_subscriber(&self, tag_id: u64, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::post(format!(
            "tags/{tag_id}/subscribers/{subscriber_id}"
        )))
        .await
    }

    /// Tag a subscriber by e-mail address.
    ///
    /// # Arguments
    /// * `tag_id` - The tag to apply
    /// * `email_address` - Subscriber address, validated before sending
    ///
    /// # Returns
    /// The tagged `subscriber` payload
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = Client::new("client-id", "client-secret", "access-token")?;
    /// client.tag_subscriber_by_email(42, "jane@example.com").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn tag_subscriber_by_email(&self, tag_id: u64, email_address: &str) -> Result<Value> {
        validate_email(email_address)?;
        self.execute(
            ApiRequest::post(format!("tags/{tag_id}/subscribers"))
                .param("email_address", email_address),
        )
        .await
    }

    /// `POST bulk/tags/subscriptions`: apply tags to subscribers in one request.
    pub async fn tag_subscribers(
        &self,
        taggings: &[Tagging],
        callback_url: Option<&str>,
    ) -> Result<Value> {
        require_items(taggings, "tagging")?;
        let items: Vec<ParamValue> = taggings.iter().map(ParamValue::from).collect();
        self.execute(
            ApiRequest::post("bulk/tags/subscribers")
                .params(bulk_params("taggings", items, callback_url)),
        )
        .await
    }

    /// `DELETE tags/{tag_id}/subscribers/{subscriber_id}`.
    pub async fn remove_tag_from_subscriber(
        &self,
        tag_id: u64,
        subscriber_id: u64,
    ) -> Result<Value> {
        self.execute(ApiRequest::delete(format!(
            "tags/{tag_id}/subscribers/{subscriber_id}"
        )))
        .await
    }

    /// `DELETE tags/{id}/subscribers` with the address in the query string.
    pub async fn remove_tag_from_subscriber_by_email(
        &self,
        tag_id: u64,
        email_address: &str,
    ) -> Result<Value> {
        validate_email(email_address)?;
        self.execute(
            ApiRequest::delete(format!("tags/{tag_id}/subscribers"))
                .param("email_address", email_address),
        )
        .await
    }

    /// `GET tags/{id}/subscribers`, filtered by state and `tagged_*` dates.
    pub async fn get_tag_subscriptions(
        &self,
        tag_id: u64,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Value> {
        let mut params = Params::new();
        filter.apply(&mut params, "tagged");
        self.execute(
            ApiRequest::get(format!("tags/{tag_id}/subscribers"))
                .params(params)
                .paginate(pagination),
        )
        .await
    }

    // Email templates

    /// `GET email_templates`.
    pub async fn get_email_templates(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("email_templates").paginate(pagination))
            .await
    }

    // Subscribers

    /// List subscribers matching `query`.
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::{Client, Pagination, SubscriberQuery};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = Client::new("client-id", "client-secret", "access-token")?;
    /// let page = client
    ///     .get_subscribers(&SubscriberQuery::default(), &Pagination::new().per_page(50))
    ///     .await?;
    /// for subscriber in page["subscribers"].as_array().into_iter().flatten() {
    ///     println!("{}", subscriber["email_address"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_subscribers(
        &self,
        query: &SubscriberQuery,
        pagination: &Pagination,
    ) -> Result<Value> {
        let mut params = Params::new();
        query.apply(&mut params);
        self.execute(ApiRequest::get("subscribers").params(params).paginate(pagination))
            .await
    }

    /// `POST subscribers`: create or update a subscriber by address.
    pub async fn create_subscriber(&self, subscriber: &NewSubscriber) -> Result<Value> {
        self.execute(ApiRequest::post("subscribers").params(subscriber.to_params()?))
            .await
    }

    /// `POST bulk/subscribers`.
    pub async fn create_subscribers(
        &self,
        subscribers: &[NewSubscriber],
        callback_url: Option<&str>,
    ) -> Result<Value> {
        require_items(subscribers, "subscriber")?;
        let items = subscribers
            .iter()
            .map(|s| s.to_params().map(ParamValue::from))
            .collect::<Result<Vec<_>>>()?;
        self.execute(
            ApiRequest::post("bulk/subscribers")
                .params(bulk_params("subscribers", items, callback_url)),
        )
        .await
    }

    /// Look up a subscriber's ID by e-mail address.
    ///
    /// Returns `Ok(None)` when no subscriber in any state has that address.
    pub async fn get_subscriber_id(&self, email_address: &str) -> Result<Option<u64>> {
        validate_email(email_address)?;
        let query = SubscriberQuery {
            subscriber_state: Some(SubscriberState::All),
            email_address: Some(email_address.to_string()),
            ..Default::default()
        };
        let payload = self.get_subscribers(&query, &Pagination::default()).await?;
        let id = normalize::collection(&payload, "subscribers")
            .first()
            .and_then(|s| s.get("id"))
            .and_then(Value::as_u64);
        if id.is_none() {
            debug!(email = %crate::mask::mask_email(email_address), "no subscriber found");
        }
        Ok(id)
    }

    /// `GET subscribers/{id}`.
    pub async fn get_subscriber(&self, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("subscribers/{subscriber_id}")))
            .await
    }

    /// `PUT subscribers/{id}`.
    pub async fn update_subscriber(
        &self,
        subscriber_id: u64,
        update: &SubscriberUpdate,
    ) -> Result<Value> {
        self.execute(ApiRequest::put(format!("subscribers/{subscriber_id}")).params(update.to_params()?))
            .await
    }

    /// `POST subscribers/{id}/unsubscribe`.
    pub async fn unsubscribe(&self, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::post(format!(
            "subscribers/{subscriber_id}/unsubscribe"
        )))
        .await
    }

    /// Unsubscribe by address. `Ok(None)` when no such subscriber exists.
    pub async fn unsubscribe_by_email(&self, email_address: &str) -> Result<Option<Value>> {
        match self.get_subscriber_id(email_address).await? {
            Some(id) => self.unsubscribe(id).await.map(Some),
            None => Ok(None),
        }
    }

    /// `GET subscribers/{id}/tags`.
    pub async fn get_subscriber_tags(
        &self,
        subscriber_id: u64,
        pagination: &Pagination,
    ) -> Result<Value> {
        self.execute(ApiRequest::get(format!("subscribers/{subscriber_id}/tags")).paginate(pagination))
            .await
    }

    /// `GET subscribers/{id}/stats`: e-mail engagement for one subscriber.
    pub async fn get_subscriber_stats(&self, subscriber_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("subscribers/{subscriber_id}/stats")))
            .await
    }

    // Broadcasts

    /// `GET broadcasts`.
    pub async fn get_broadcasts(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("broadcasts").paginate(pagination))
            .await
    }

    /// Create a broadcast (`POST broadcasts`).
    ///
    /// Fields that only apply to public broadcasts are dropped when
    /// `broadcast.public` is false.
    ///
    /// # Examples
    /// ```no_run
    /// # use convertkit_client::{{Broadcast, Client}};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), convertkit_client::Error> {
    /// let client = Client::new("client-id", "client-secret", "access-token")?;
    /// let draft = Broadcast {
    ///     subject: "Launch day".to_string(),
    ///     content: "<p>We're live.</p>".to_string(),
    ///     ..Default::default()
    /// };
    /// let created = client.create_broadcast(&draft).await?;
    /// println!("{}", created["broadcast"]["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_broadcast(&self, broadcast: &Broadcast) -> Result<Value> {
        self.execute(ApiRequest::post("broadcasts").params(broadcast.to_params()))
            .await
    }

    /// `GET broadcasts/{id}`.
    pub async fn get_broadcast(&self, broadcast_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("broadcasts/{broadcast_id}")))
            .await
    }

    /// `GET broadcasts/{id}/stats`.
    pub async fn get_broadcast_stats(&self, broadcast_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("broadcasts/{broadcast_id}/stats")))
            .await
    }

    /// `PUT broadcasts/{id}`, with the same field rules as [`Client::create_broadcast`].
    pub async fn update_broadcast(&self, broadcast_id: u64, broadcast: &Broadcast) -> Result<Value> {
        self.execute(ApiRequest::put(format!("broadcasts/{broadcast_id}")).params(broadcast.to_params()))
            .await
    }

    /// `DELETE broadcasts/{id}`. An empty 204 body comes back as `Value::Null`.
    pub async fn delete_broadcast(&self, broadcast_id: u64) -> Result<Value> {
        self.execute(ApiRequest::delete(format!("broadcasts/{broadcast_id}")))
            .await
    }

    // Webhooks

    /// `GET webhooks`.
    pub async fn get_webhooks(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("webhooks").paginate(pagination))
            .await
    }

    /// `POST webhooks`: deliver `event` to `target_url`.
    pub async fn create_webhook(&self, target_url: &str, event: &WebhookEvent) -> Result<Value> {
        if target_url.is_empty() {
            return Err(Error::invalid("webhook target_url is required"));
        }
        self.execute(
            ApiRequest::post("webhooks")
                .param("target_url", target_url)
                .param("event", event.to_params()),
        )
        .await
    }

    /// `DELETE webhooks/{id}`.
    pub async fn delete_webhook(&self, webhook_id: u64) -> Result<Value> {
        self.execute(ApiRequest::delete(format!("webhooks/{webhook_id}")))
            .await
    }

    // Custom fields

    /// `GET custom_fields`.
    pub async fn get_custom_fields(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("custom_fields").paginate(pagination))
            .await
    }

    /// `POST custom_fields`.
    pub async fn create_custom_field(&self, label: &str) -> Result<Value> {
        self.execute(ApiRequest::post("custom_fields").param("label", label))
            .await
    }

    /// `POST bulk/custom_fields`.
    pub async fn create_custom_fields(
        &self,
        labels: &[&str],
        callback_url: Option<&str>,
    ) -> Result<Value> {
        require_items(labels, "custom field label")?;
        let items: Vec<ParamValue> = labels
            .iter()
            .map(|label| ParamValue::from(Params::new().with("label", *label)))
            .collect();
        self.execute(
            ApiRequest::post("bulk/custom_fields")
                .params(bulk_params("custom_fields", items, callback_url)),
        )
        .await
    }

    /// `PUT custom_fields/{id}`: change a field's label.
    pub async fn update_custom_field(&self, custom_field_id: u64, label: &str) -> Result<Value> {
        self.execute(ApiRequest::put(format!("custom_fields/{custom_field_id}")).param("label", label))
            .await
    }

    /// `DELETE custom_fields/{id}`.
    pub async fn delete_custom_field(&self, custom_field_id: u64) -> Result<Value> {
        self.execute(ApiRequest::delete(format!("custom_fields/{custom_field_id}")))
            .await
    }

    // Purchases

    /// `GET purchases`.
    pub async fn get_purchases(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("purchases").paginate(pagination))
            .await
    }

    /// `GET purchases/{id}`.
    pub async fn get_purchase(&self, purchase_id: u64) -> Result<Value> {
        self.execute(ApiRequest::get(format!("purchases/{purchase_id}")))
            .await
    }

    /// `POST purchases`. The purchase is validated before sending.
    pub async fn create_purchase(&self, purchase: &Purchase) -> Result<Value> {
        self.execute(ApiRequest::post("purchases").params(purchase.to_params()?))
            .await
    }

    // Segments

    /// `GET segments`.
    pub async fn get_segments(&self, pagination: &Pagination) -> Result<Value> {
        self.execute(ApiRequest::get("segments").paginate(pagination))
            .await
    }

    /// List one named resource collection.
    ///
    /// `resource` is one of `forms`, `landing_pages`, `tags`, `sequences` or
    /// `custom_fields`; anything else fails with [`Error::InvalidArgument`]
    /// before a request is made.
    pub async fn get_resources(&self, resource: &str, pagination: &Pagination) -> Result<Vec<Value>> {
        let kind: ResourceKind = resource.parse()?;
        Ok(match kind {
            ResourceKind::Forms => self.get_forms_and_landing_pages(pagination).await?.forms,
            ResourceKind::LandingPages => {
                self.get_forms_and_landing_pages(pagination)
                    .await?
                    .landing_pages
            }
            ResourceKind::Tags => normalize::collection(&self.get_tags(pagination).await?, "tags"),
            ResourceKind::Sequences => {
                normalize::collection(&self.get_sequences(pagination).await?, "sequences")
            }
            ResourceKind::CustomFields => {
                normalize::collection(&self.get_custom_fields(pagination).await?, "custom_fields")
            }
        })
    }
}

/// Builder for configuring a v4 [`Client`].
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    access_token: String,
    http: HttpConfig,
    authorize_url: String,
    token_url: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Base URL `https://api.convertkit.com`
    /// - 10 second timeout
    /// - No proxy
    /// - `convertkit-client/<version>` user agent
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            http: HttpConfig::default(),
            authorize_url: oauth::AUTHORIZE_URL.to_string(),
            token_url: oauth::TOKEN_URL.to_string(),
        }
    }

    /// Override the API root (the version segment is appended).
    ///
    /// Useful for testing against a mock server.
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

    /// Override the OAuth authorization and token endpoints.
    pub fn oauth_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Build the client. No request is made.
    pub fn build(self) -> Result<Client> {
        if self.access_token.is_empty() {
            return Err(Error::invalid("access token is required"));
        }
        let credentials = Credentials::OAuth {
            client_id: self.client_id,
            client_secret: self.client_secret,
            access_token: self.access_token,
        };
        Ok(Client {
            transport: Transport::new(&self.http, credentials)?,
            authorize_url: self.authorize_url,
            token_url: self.token_url,
        })
    }
}
