//! Typed inputs for write operations and their parameter encoding.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::pagination::{SubscriberState, format_timestamp};
use crate::params::{ParamValue, Params};
use crate::{Error, Result};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Reject addresses that cannot be valid before anything is sent.
pub(crate) fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(Error::invalid(format!("malformed email address: {email:?}")))
    }
}

pub(crate) fn require_items<T>(items: &[T], what: &str) -> Result<()> {
    if items.is_empty() {
        Err(Error::invalid(format!("at least one {what} is required")))
    } else {
        Ok(())
    }
}

/// Resource collections accepted by `get_resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Forms,
    LandingPages,
    Tags,
    Sequences,
    CustomFields,
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "forms" => Ok(ResourceKind::Forms),
            "landing_pages" => Ok(ResourceKind::LandingPages),
            "tags" => Ok(ResourceKind::Tags),
            "sequences" => Ok(ResourceKind::Sequences),
            "custom_fields" => Ok(ResourceKind::CustomFields),
            other => Err(Error::invalid(format!("unsupported resource: {other:?}"))),
        }
    }
}

/// A subscriber to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSubscriber {
    pub email_address: String,
    pub first_name: Option<String>,
    pub state: Option<SubscriberState>,
    /// Custom field values keyed by field key.
    pub fields: Vec<(String, String)>,
}

impl NewSubscriber {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            ..Default::default()
        }
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn state(mut self, state: SubscriberState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub(crate) fn to_params(&self) -> Result<Params> {
        validate_email(&self.email_address)?;
        let mut params = Params::new();
        params
            .insert("email_address", self.email_address.as_str())
            .insert_opt("first_name", self.first_name.as_deref())
            .insert_opt("state", self.state.map(SubscriberState::as_str));
        if !self.fields.is_empty() {
            params.insert("fields", fields_map(&self.fields));
        }
        Ok(params)
    }
}

fn fields_map(fields: &[(String, String)]) -> Params {
    let mut map = Params::new();
    for (key, value) in fields {
        map.insert_required(key.as_str(), value.as_str());
    }
    map
}

/// Changes to an existing subscriber.
///
/// `Some("")` for `first_name` clears the name; `None` leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriberUpdate {
    pub first_name: Option<String>,
    pub email_address: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl SubscriberUpdate {
    pub(crate) fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        if let Some(first_name) = &self.first_name {
            params.insert_required("first_name", first_name.as_str());
        }
        if let Some(email) = &self.email_address {
            validate_email(email)?;
            params.insert("email_address", email.as_str());
        }
        if !self.fields.is_empty() {
            params.insert("fields", fields_map(&self.fields));
        }
        Ok(params)
    }
}

/// One item of a bulk tagging request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagging {
    pub tag_id: u64,
    pub subscriber_id: u64,
}

/// One item of a bulk form-subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormAddition {
    pub form_id: u64,
    pub subscriber_id: u64,
    pub referrer: Option<String>,
}

impl From<&Tagging> for ParamValue {
    fn from(tagging: &Tagging) -> Self {
        Params::new()
            .with("tag_id", tagging.tag_id)
            .with("subscriber_id", tagging.subscriber_id)
            .into()
    }
}

impl From<&FormAddition> for ParamValue {
    fn from(addition: &FormAddition) -> Self {
        let mut params = Params::new()
            .with("form_id", addition.form_id)
            .with("subscriber_id", addition.subscriber_id);
        if let Some(referrer) = addition.referrer.as_deref().filter(|r| !r.is_empty()) {
            params.insert("referrer", referrer);
        }
        params.into()
    }
}

/// Body shared by the bulk endpoints: an ordered item list plus an optional
/// completion callback.
pub(crate) fn bulk_params(key: &str, items: Vec<ParamValue>, callback_url: Option<&str>) -> Params {
    let mut params = Params::new().with(key, items);
    params.insert_opt("callback_url", callback_url.filter(|u| !u.is_empty()));
    params
}

/// A broadcast to create or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Broadcast {
    pub subject: String,
    pub content: String,
    pub description: String,
    pub public: bool,
    pub published_at: Option<NaiveDateTime>,
    pub send_at: Option<NaiveDateTime>,
    pub email_address: String,
    pub email_template_id: Option<u64>,
    pub thumbnail_alt: String,
    pub thumbnail_url: String,
    pub preview_text: String,
    /// Audience filter groups, e.g. `[{"all": [{"type": "tag", "ids": [1]}]}]`.
    pub subscriber_filter: Option<ParamValue>,
}

impl Broadcast {
    /// Encode as a request body.
    ///
    /// Blank strings are dropped. A broadcast that is not public never sends
    /// `published_at`, `thumbnail_alt` or `thumbnail_url`.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert_opt("email_template_id", self.email_template_id)
            .insert("email_address", self.email_address.as_str())
            .insert("content", self.content.as_str())
            .insert("description", self.description.as_str())
            .insert("public", self.public)
            .insert_opt("published_at", self.published_at.map(format_timestamp))
            .insert_opt("send_at", self.send_at.map(format_timestamp))
            .insert("thumbnail_alt", self.thumbnail_alt.as_str())
            .insert("thumbnail_url", self.thumbnail_url.as_str())
            .insert("preview_text", self.preview_text.as_str())
            .insert("subject", self.subject.as_str())
            .insert_opt("subscriber_filter", self.subscriber_filter.clone());

        if !self.public {
            params.remove("published_at");
            params.remove("thumbnail_alt");
            params.remove("thumbnail_url");
        }
        params.strip_blank();
        params
    }
}

/// A product line on a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseProduct {
    pub name: String,
    /// Product ID in the seller's system.
    pub pid: String,
    /// Line-item ID, unique within the purchase.
    pub lid: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub sku: Option<String>,
}

impl From<&PurchaseProduct> for ParamValue {
    fn from(product: &PurchaseProduct) -> Self {
        let mut params = Params::new()
            .with("name", product.name.as_str())
            .with("pid", product.pid.as_str())
            .with("lid", product.lid.as_str())
            .with("quantity", product.quantity)
            .with("unit_price", product.unit_price);
        params.insert_opt("sku", product.sku.as_deref());
        params.into()
    }
}

/// A purchase to record against a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub email_address: String,
    pub first_name: Option<String>,
    pub transaction_id: String,
    pub status: Option<String>,
    pub currency: String,
    pub transaction_time: Option<NaiveDateTime>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub discount: f64,
    pub total: f64,
    pub products: Vec<PurchaseProduct>,
}

impl Purchase {
    /// A purchase in USD with zeroed totals.
    pub fn new(
        email_address: impl Into<String>,
        transaction_id: impl Into<String>,
        products: Vec<PurchaseProduct>,
    ) -> Self {
        Self {
            email_address: email_address.into(),
            first_name: None,
            transaction_id: transaction_id.into(),
            status: None,
            currency: "USD".to_string(),
            transaction_time: None,
            subtotal: 0.0,
            tax: 0.0,
            shipping: 0.0,
            discount: 0.0,
            total: 0.0,
            products,
        }
    }

    pub(crate) fn to_params(&self) -> Result<Params> {
        validate_email(&self.email_address)?;
        require_items(&self.products, "product")?;

        let products: Vec<ParamValue> = self.products.iter().map(ParamValue::from).collect();
        let mut params = Params::new();
        params
            .insert("email_address", self.email_address.as_str())
            .insert_opt("first_name", self.first_name.as_deref())
            .insert("transaction_id", self.transaction_id.as_str())
            .insert_opt("status", self.status.as_deref())
            .insert("currency", self.currency.as_str())
            .insert_opt(
                "transaction_time",
                self.transaction_time.map(format_timestamp),
            )
            .insert("subtotal", self.subtotal)
            .insert("tax", self.tax)
            .insert("shipping", self.shipping)
            .insert("discount", self.discount)
            .insert("total", self.total)
            .insert("products", products);
        params.strip_blank();
        Ok(params)
    }
}

/// Events a webhook can subscribe to, with the parameter each one needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    SubscriberActivate,
    SubscriberUnsubscribe,
    SubscriberBounce,
    SubscriberComplain,
    FormSubscribe { form_id: u64 },
    SequenceSubscribe { sequence_id: u64 },
    SequenceComplete { sequence_id: u64 },
    LinkClick { initiator_value: String },
    ProductPurchase { product_id: u64 },
    TagAdd { tag_id: u64 },
    TagRemove { tag_id: u64 },
    PurchaseCreate,
}

impl WebhookEvent {
    /// Build an event from its API name and optional parameter.
    ///
    /// Fails on unknown names and on events whose parameter is missing or
    /// not numeric where an ID is expected.
    pub fn from_name(name: &str, parameter: Option<&str>) -> Result<Self> {
        let id = |key: &str| -> Result<u64> {
            let raw = parameter
                .filter(|p| !p.is_empty())
                .ok_or_else(|| Error::invalid(format!("webhook event {name} requires {key}")))?;
            raw.parse()
                .map_err(|_| Error::invalid(format!("{key} must be numeric, got {raw:?}")))
        };

        Ok(match name {
            "subscriber.subscriber_activate" => WebhookEvent::SubscriberActivate,
            "subscriber.subscriber_unsubscribe" => WebhookEvent::SubscriberUnsubscribe,
            "subscriber.subscriber_bounce" => WebhookEvent::SubscriberBounce,
            "subscriber.subscriber_complain" => WebhookEvent::SubscriberComplain,
            "purchase.purchase_create" => WebhookEvent::PurchaseCreate,
            "subscriber.form_subscribe" => WebhookEvent::FormSubscribe { form_id: id("form_id")? },
            "subscriber.course_subscribe" => WebhookEvent::SequenceSubscribe {
                sequence_id: id("sequence_id")?,
            },
            "subscriber.course_complete" => WebhookEvent::SequenceComplete {
                sequence_id: id("sequence_id")?,
            },
            "subscriber.product_purchase" => WebhookEvent::ProductPurchase {
                product_id: id("product_id")?,
            },
            "subscriber.tag_add" => WebhookEvent::TagAdd { tag_id: id("tag_id")? },
            "subscriber.tag_remove" => WebhookEvent::TagRemove { tag_id: id("tag_id")? },
            "subscriber.link_click" => WebhookEvent::LinkClick {
                initiator_value: parameter
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        Error::invalid("webhook event subscriber.link_click requires initiator_value")
                    })?
                    .to_string(),
            },
            other => return Err(Error::invalid(format!("unsupported webhook event: {other:?}"))),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            WebhookEvent::SubscriberActivate => "subscriber.subscriber_activate",
            WebhookEvent::SubscriberUnsubscribe => "subscriber.subscriber_unsubscribe",
            WebhookEvent::SubscriberBounce => "subscriber.subscriber_bounce",
            WebhookEvent::SubscriberComplain => "subscriber.subscriber_complain",
            WebhookEvent::FormSubscribe { .. } => "subscriber.form_subscribe",
            WebhookEvent::SequenceSubscribe { .. } => "subscriber.course_subscribe",
            WebhookEvent::SequenceComplete { .. } => "subscriber.course_complete",
            WebhookEvent::LinkClick { .. } => "subscriber.link_click",
            WebhookEvent::ProductPurchase { .. } => "subscriber.product_purchase",
            WebhookEvent::TagAdd { .. } => "subscriber.tag_add",
            WebhookEvent::TagRemove { .. } => "subscriber.tag_remove",
            WebhookEvent::PurchaseCreate => "purchase.purchase_create",
        }
    }

    pub(crate) fn to_params(&self) -> Params {
        let params = Params::new().with("name", self.name());
        match self {
            WebhookEvent::FormSubscribe { form_id } => params.with("form_id", *form_id),
            WebhookEvent::SequenceSubscribe { sequence_id }
            | WebhookEvent::SequenceComplete { sequence_id } => {
                params.with("sequence_id", *sequence_id)
            }
            WebhookEvent::LinkClick { initiator_value } => {
                params.with("initiator_value", initiator_value.as_str())
            }
            WebhookEvent::ProductPurchase { product_id } => params.with("product_id", *product_id),
            WebhookEvent::TagAdd { tag_id } | WebhookEvent::TagRemove { tag_id } => {
                params.with("tag_id", *tag_id)
            }
            _ => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn private_broadcast_drops_publishing_fields() {
        let broadcast = Broadcast {
            subject: "Spring sale".to_string(),
            content: "<p>Hello</p>".to_string(),
            public: false,
            published_at: Some(at(8)),
            send_at: Some(at(9)),
            thumbnail_alt: "A flower".to_string(),
            thumbnail_url: "https://example.com/flower.png".to_string(),
            ..Default::default()
        };

        let body = serde_json::to_value(broadcast.to_params()).unwrap();
        assert_eq!(
            body,
            json!({
                "content": "<p>Hello</p>",
                "public": false,
                "send_at": "2024-05-01 09:30:00",
                "subject": "Spring sale",
            })
        );
    }

    #[test]
    fn public_broadcast_keeps_publishing_fields() {
        let broadcast = Broadcast {
            subject: "News".to_string(),
            public: true,
            published_at: Some(at(8)),
            thumbnail_url: "https://example.com/t.png".to_string(),
            email_template_id: Some(9),
            ..Default::default()
        };

        let params = broadcast.to_params();
        assert_eq!(params.get("published_at"), Some(&ParamValue::from("2024-05-01 08:30:00")));
        assert_eq!(params.get("thumbnail_url"), Some(&ParamValue::from("https://example.com/t.png")));
        assert!(!params.contains_key("thumbnail_alt"));
        assert!(!params.contains_key("send_at"));
        assert_eq!(params.get("email_template_id"), Some(&ParamValue::Int(9)));
    }

    #[test]
    fn unknown_resource_kind_is_rejected() {
        assert_eq!("landing_pages".parse::<ResourceKind>().unwrap(), ResourceKind::LandingPages);
        let err = "posts".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn webhook_events_validate_parameters() {
        let event = WebhookEvent::from_name("subscriber.tag_add", Some("42")).unwrap();
        assert_eq!(
            serde_json::to_value(event.to_params()).unwrap(),
            json!({"name": "subscriber.tag_add", "tag_id": 42})
        );

        assert!(WebhookEvent::from_name("subscriber.tag_add", None).is_err());
        assert!(WebhookEvent::from_name("subscriber.tag_add", Some("vip")).is_err());
        assert!(WebhookEvent::from_name("subscriber.teleported", None).is_err());
        assert_eq!(
            WebhookEvent::from_name("purchase.purchase_create", None).unwrap(),
            WebhookEvent::PurchaseCreate
        );
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("spaces in@b.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn purchase_requires_products() {
        let purchase = Purchase::new("buyer@example.com", "txn-1", vec![]);
        assert!(matches!(purchase.to_params(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn purchase_body_keeps_product_order() {
        let product = |lid: &str| PurchaseProduct {
            name: format!("Item {lid}"),
            pid: "p-1".to_string(),
            lid: lid.to_string(),
            quantity: 1,
            unit_price: 5.0,
            sku: None,
        };
        let mut purchase = Purchase::new("buyer@example.com", "txn-2", vec![product("b"), product("a")]);
        purchase.total = 10.0;

        let body = serde_json::to_value(purchase.to_params().unwrap()).unwrap();
        assert_eq!(body["products"][0]["lid"], "b");
        assert_eq!(body["products"][1]["lid"], "a");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["total"], 10.0);
        assert!(body.get("first_name").is_none());
    }

    #[test]
    fn subscriber_update_can_clear_first_name() {
        let update = SubscriberUpdate {
            first_name: Some(String::new()),
            ..Default::default()
        };
        let mut params = update.to_params().unwrap();
        params.strip_blank();
        assert_eq!(params.get("first_name"), Some(&ParamValue::from("")));
    }
}
