//! # ConvertKit Client
//! Asynchronous wrapper around the ConvertKit email-marketing REST API: forms, landing pages, sequences, tags, subscribers, broadcasts, webhooks, custom fields, purchases, segments and email templates, through [`Client`] (v4, OAuth) and [`LegacyClient`] (v3, API key and secret).
//!
//! ## Audience and uses
//! For Rust services that manage a ConvertKit audience: subscribe people to forms, tag them, record purchases, schedule broadcasts. Methods take typed inputs, compose the endpoint and parameters, and return the decoded JSON payload.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest` with a 10 second default timeout. Request and failure summaries are emitted as `tracing` events with credentials and e-mail addresses masked; install a subscriber to see them.
//!
//! ## Out of scope
//! No caching, retries or rate-limit handling. Every call is a fresh request and every failure is reported once.
//!
//! ## Errors
//! Non-2xx responses become [`Error::Api`] with the status and raw body; undecodable bodies become [`Error::Json`]; rejected inputs become [`Error::InvalidArgument`] before anything is sent. A lookup that finds nothing returns `Ok(None)`, not an error. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use convertkit_client::{Client, Pagination};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), convertkit_client::Error> {
//!     let client = Client::new("client-id", "client-secret", "access-token")?;
//!     client.add_subscriber_to_form_by_email(123, "jane@example.com", None).await?;
//!
//!     let tags = client.get_tags(&Pagination::new().per_page(50)).await?;
//!     for tag in tags["tags"].as_array().into_iter().flatten() {
//!         println!("{}: {}", tag["id"], tag["name"]);
//!     }
//!
//!     if let Some(id) = client.get_subscriber_id("jane@example.com").await? {
//!         client.tag_subscriber(42, id).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod legacy;
mod mask;
mod models;
mod normalize;
mod oauth;
mod pagination;
mod params;
mod request;
mod transport;

pub use client::{Client, ClientBuilder};
pub use error::Error;
pub use legacy::{DEFAULT_MAX_SUBSCRIBER_PAGES, LegacyClient, LegacyClientBuilder};
pub use mask::{mask_email, mask_secret};
pub use models::{
    Broadcast, FormAddition, NewSubscriber, Purchase, PurchaseProduct, ResourceKind,
    SubscriberUpdate, Tagging, WebhookEvent,
};
pub use normalize::{FormsAndLandingPages, PageInfo};
pub use oauth::{OAuth, TokenResponse};
pub use pagination::{
    DEFAULT_PER_PAGE, FormStatus, Pagination, SortField, SortOrder, SubscriberQuery,
    SubscriberState, SubscriptionFilter, format_date, format_timestamp,
};
pub use params::{ParamValue, Params};
pub use request::{ApiRequest, Method, Scope};
pub use transport::Credentials;

/// Result type alias for ConvertKit operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
