//! Pagination and list-filter parameters shared by every list operation.

use chrono::{NaiveDate, NaiveDateTime};

use crate::params::Params;

/// Default page size requested from the API.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Format a date filter as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Cursor pagination controls for v4 list endpoints.
///
/// Cursors are opaque: they are copied verbatim from a previous response's
/// `pagination.end_cursor` / `start_cursor` and never inspected. Supplying
/// both is allowed; the API decides which one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub include_total_count: bool,
    pub after_cursor: Option<String>,
    pub before_cursor: Option<String>,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            include_total_count: false,
            after_cursor: None,
            before_cursor: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_total_count(mut self, include: bool) -> Self {
        self.include_total_count = include;
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after_cursor = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before_cursor = Some(cursor.into());
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Merge these controls into `params`.
    ///
    /// `include_total_count` is always present, cursors only when non-empty
    /// and `per_page` only when non-zero.
    pub fn apply(&self, params: &mut Params) {
        params.insert("include_total_count", self.include_total_count);
        if let Some(after) = self.after_cursor.as_deref().filter(|c| !c.is_empty()) {
            params.insert("after", after);
        }
        if let Some(before) = self.before_cursor.as_deref().filter(|c| !c.is_empty()) {
            params.insert("before", before);
        }
        if self.per_page > 0 {
            params.insert("per_page", self.per_page);
        }
    }
}

/// Subscriber state used as a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriberState {
    #[default]
    Active,
    Bounced,
    Cancelled,
    Complained,
    Inactive,
    /// Every state. Only accepted as a list filter.
    All,
}

impl SubscriberState {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriberState::Active => "active",
            SubscriberState::Bounced => "bounced",
            SubscriberState::Cancelled => "cancelled",
            SubscriberState::Complained => "complained",
            SubscriberState::Inactive => "inactive",
            SubscriberState::All => "all",
        }
    }
}

/// Status filter for forms and landing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Active,
    Archived,
    Trashed,
    All,
}

impl FormStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FormStatus::Active => "active",
            FormStatus::Archived => "archived",
            FormStatus::Trashed => "trashed",
            FormStatus::All => "all",
        }
    }
}

/// Filters for listing the subscribers of a form, sequence or tag.
///
/// `added_after` / `added_before` are sent as `added_*` for forms and
/// sequences and as `tagged_*` for tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub subscriber_state: SubscriberState,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub added_after: Option<NaiveDate>,
    pub added_before: Option<NaiveDate>,
}

impl SubscriptionFilter {
    pub(crate) fn apply(&self, params: &mut Params, added_prefix: &str) {
        params.insert("status", self.subscriber_state.as_str());
        params.insert_opt("created_after", self.created_after.map(format_date));
        params.insert_opt("created_before", self.created_before.map(format_date));
        params.insert_opt(
            format!("{added_prefix}_after"),
            self.added_after.map(format_date),
        );
        params.insert_opt(
            format!("{added_prefix}_before"),
            self.added_before.map(format_date),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    UpdatedAt,
    CancelledAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::UpdatedAt => "updated_at",
            SortField::CancelledAt => "cancelled_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for `GET subscribers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberQuery {
    /// `None` omits `status`, which the API treats as `active`. Use
    /// [`SubscriberState::All`] to match every state.
    pub subscriber_state: Option<SubscriberState>,
    pub email_address: Option<String>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for SubscriberQuery {
    fn default() -> Self {
        Self {
            subscriber_state: Some(SubscriberState::Active),
            email_address: None,
            created_after: None,
            created_before: None,
            updated_after: None,
            updated_before: None,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SubscriberQuery {
    pub(crate) fn apply(&self, params: &mut Params) {
        params.insert_opt("status", self.subscriber_state.map(SubscriberState::as_str));
        params.insert_opt("email_address", self.email_address.as_deref());
        params.insert_opt("created_after", self.created_after.map(format_date));
        params.insert_opt("created_before", self.created_before.map(format_date));
        params.insert_opt("updated_after", self.updated_after.map(format_date));
        params.insert_opt("updated_before", self.updated_before.map(format_date));
        params.insert("sort_field", self.sort_field.as_str());
        params.insert("sort_order", self.sort_order.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn defaults_emit_count_flag_and_page_size_only() {
        let mut params = Params::new();
        Pagination::default().apply(&mut params);

        assert_eq!(
            params.to_query_pairs(),
            vec![
                ("include_total_count".to_string(), "false".to_string()),
                ("per_page".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn cursors_pass_through_verbatim() {
        let mut params = Params::new();
        Pagination::new()
            .after("WzE0XQ==")
            .before("WzEzXQ==")
            .include_total_count(true)
            .apply(&mut params);

        assert_eq!(params.get("after"), Some(&ParamValue::from("WzE0XQ==")));
        assert_eq!(params.get("before"), Some(&ParamValue::from("WzEzXQ==")));
        assert_eq!(params.get("include_total_count"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn empty_cursor_and_zero_page_size_are_omitted() {
        let mut params = Params::new();
        Pagination::new().after("").per_page(0).apply(&mut params);

        assert!(!params.contains_key("after"));
        assert!(!params.contains_key("per_page"));
    }

    #[test]
    fn dates_use_fixed_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "2024-03-07");

        let timestamp = date.and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_timestamp(timestamp), "2024-03-07 09:05:00");
    }

    #[test]
    fn all_state_query_sends_status_all() {
        let query = SubscriberQuery {
            subscriber_state: Some(SubscriberState::All),
            ..Default::default()
        };
        let mut params = Params::new();
        query.apply(&mut params);
        assert_eq!(params.get("status"), Some(&ParamValue::from("all")));

        let mut omitted = Params::new();
        SubscriberQuery {
            subscriber_state: None,
            ..Default::default()
        }
        .apply(&mut omitted);
        assert!(!omitted.contains_key("status"));
    }

    #[test]
    fn tag_filters_use_tagged_keys() {
        let filter = SubscriptionFilter {
            subscriber_state: SubscriberState::Cancelled,
            added_after: NaiveDate::from_ymd_opt(2023, 12, 1),
            ..Default::default()
        };
        let mut params = Params::new();
        filter.apply(&mut params, "tagged");

        assert_eq!(params.get("status"), Some(&ParamValue::from("cancelled")));
        assert_eq!(params.get("tagged_after"), Some(&ParamValue::from("2023-12-01")));
        assert!(!params.contains_key("tagged_before"));
        assert!(!params.contains_key("created_after"));
    }

    #[test]
    fn subscriber_query_without_state_lists_everyone() {
        let query = SubscriberQuery {
            subscriber_state: None,
            email_address: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        let mut params = Params::new();
        query.apply(&mut params);

        assert!(!params.contains_key("status"));
        assert_eq!(
            params.get("email_address"),
            Some(&ParamValue::from("jane@example.com"))
        );
        assert_eq!(params.get("sort_order"), Some(&ParamValue::from("desc")));
    }
}
