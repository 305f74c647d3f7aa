//! Client-side search and status filtering for list pages.
//!
//! # Design
//! - Pure predicate, re-evaluated on every render; no memoisation.
//! - Missing fields never match a search and never panic.
//! - Status comparison is exact; the sentinel `all` disables it.

use std::borrow::Cow;
use std::convert::Infallible;
use std::str::FromStr;

use fleetdesk_api_models::RecordId;
use serde_json::Value;

/// Row shape the filter and selection helpers can read.
pub trait FilterRow {
    /// Backend identifier of the row.
    fn record_id(&self) -> Option<RecordId>;

    /// Text of a named field; `None` when absent or not scalar.
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>>;
}

impl FilterRow for Value {
    /// Reads `id`, falling back to `_id`.
    fn record_id(&self) -> Option<RecordId> {
        let raw = self.get("id").or_else(|| self.get("_id"))?;
        match raw {
            Value::Number(number) => number.as_i64().map(RecordId::Int),
            Value::String(text) => Some(RecordId::Text(text.clone())),
            _ => None,
        }
    }

    /// Supports dotted paths such as `user.name`.
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        let mut current = self;
        for segment in field.split('.') {
            current = current.get(segment)?;
        }
        match current {
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Status/type dropdown value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// The `all` sentinel.
    #[default]
    All,
    /// Keep rows whose status field equals this value.
    Exactly(String),
}

impl StatusFilter {
    /// Whether `value` passes the filter.
    #[must_use]
    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(expected) => value == Some(expected.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(input))
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Exactly(value.to_string())
        }
    }
}

/// Page-defined filter: which fields search reads and which field the dropdown compares.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientSideFilter {
    search_fields: Vec<String>,
    status_field: Option<String>,
}

impl ClientSideFilter {
    /// Filter searching the given fields.
    ///
    /// Without [`Self::with_status_field`] the page has no status column and
    /// the status dropdown admits every row.
    #[must_use]
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            status_field: None,
        }
    }

    /// Compare the status dropdown against `field`.
    #[must_use]
    pub fn with_status_field(mut self, field: impl Into<String>) -> Self {
        self.status_field = Some(field.into());
        self
    }

    /// Fields read by the search box.
    #[must_use]
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Field compared by the status dropdown.
    #[must_use]
    pub fn status_field(&self) -> Option<&str> {
        self.status_field.as_deref()
    }

    /// Whether `row` passes both the search term and the status filter.
    #[must_use]
    pub fn matches<R: FilterRow + ?Sized>(
        &self,
        row: &R,
        search_term: &str,
        status: &StatusFilter,
    ) -> bool {
        self.matches_search(row, search_term) && self.matches_status(row, status)
    }

    /// Rows passing [`Self::matches`], in input order.
    #[must_use]
    pub fn apply<'a, R: FilterRow>(
        &self,
        rows: &'a [R],
        search_term: &str,
        status: &StatusFilter,
    ) -> Vec<&'a R> {
        rows.iter()
            .filter(|row| self.matches(*row, search_term, status))
            .collect()
    }

    fn matches_search<R: FilterRow + ?Sized>(&self, row: &R, search_term: &str) -> bool {
        if search_term.is_empty() {
            return true;
        }
        let needle = search_term.to_lowercase();
        self.search_fields.iter().any(|field| {
            row.field_text(field)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }

    fn matches_status<R: FilterRow + ?Sized>(&self, row: &R, status: &StatusFilter) -> bool {
        match &self.status_field {
            Some(field) => status.admits(row.field_text(field).as_deref()),
            None => true,
        }
    }
}
