//! Tabular record browser.
//!
//! A [`Browser`] turns a snapshot of records into one page of a sortable,
//! filterable, paginated table. What each table shows is described by a
//! [`TableDescriptor`]: an ordered list of [`Column`]s plus the select
//! [`Facet`]s it can be narrowed by.
//!
//! Column accessors are plain `fn` pointers taking `&R`, so rendering a cell can
//! never touch the store.
//!
//! Pipeline for a request:
//!
//! 1. facets (exact match, `all` disables one)
//! 2. text filter on the `filter_by` column (case-insensitive substring)
//! 3. stable sort, when the query names a column
//! 4. pagination, clamping out-of-range pages to the last page

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mahardika_core::{Money, group_thousands};

/// Text shown in place of rows when filters match nothing.
pub const NO_RESULTS: &str = "No results.";

/// Query parameters owned by the browser; anything else is a facet.
const RESERVED_PARAMS: [&str; 5] = ["filter", "filter_by", "sort", "dir", "page"];

/// Facet value that disables a facet's default.
pub const FACET_ALL: &str = "all";

/// Errors caused by a query that does not fit the table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("column '{0}' cannot be sorted")]
    NotSortable(String),
    #[error("column '{0}' cannot be filtered")]
    NotFilterable(String),
}

// =============================================================================
// Cells
// =============================================================================

/// Badge colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Default,
    Secondary,
    Outline,
    Success,
    Warning,
    Destructive,
}

impl Tone {
    /// CSS modifier class used by the templates.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Default => "badge-default",
            Self::Secondary => "badge-secondary",
            Self::Outline => "badge-outline",
            Self::Success => "badge-success",
            Self::Warning => "badge-warning",
            Self::Destructive => "badge-destructive",
        }
    }
}

/// One rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Text { text: String },
    Badge { text: String, tone: Tone },
    Avatar { text: String, photo_url: Option<String> },
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Self::Badge {
            text: text.into(),
            tone,
        }
    }

    pub fn avatar(name: impl Into<String>, photo_url: Option<&str>) -> Self {
        Self::Avatar {
            text: name.into(),
            photo_url: photo_url.map(ToString::to_string),
        }
    }

    #[must_use]
    pub fn money(amount: Money) -> Self {
        Self::text(amount.to_string())
    }

    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Self::text(date.format("%Y-%m-%d").to_string())
    }

    /// A whole number with thousands separators (`99,999`).
    #[must_use]
    pub fn number(value: u64) -> Self {
        Self::text(group_thousands(&value.to_string()))
    }

    /// The visible text of the cell.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Badge { text, .. } | Self::Avatar { text, .. } => text,
        }
    }
}

/// Value a column sorts by. All keys of one column use the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Sorts before everything else.
    Missing,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    /// Compared case-insensitively.
    Text(String),
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_lowercase())
    }

    #[must_use]
    pub fn money(value: Money) -> Self {
        Self::Decimal(value.amount())
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// How one field of `R` is displayed and optionally sorted or filtered.
pub struct Column<R> {
    pub key: &'static str,
    pub label: &'static str,
    sort_key: Option<fn(&R) -> SortKey>,
    filter_text: Option<fn(&R) -> String>,
    render: fn(&R) -> Cell,
}

impl<R> Column<R> {
    pub fn new(key: &'static str, label: &'static str, render: fn(&R) -> Cell) -> Self {
        Self {
            key,
            label,
            sort_key: None,
            filter_text: None,
            render,
        }
    }

    /// Enable sorting by `key`.
    #[must_use]
    pub fn sortable(mut self, key: fn(&R) -> SortKey) -> Self {
        self.sort_key = Some(key);
        self
    }

    /// Enable text filtering against `text`.
    #[must_use]
    pub fn filterable(mut self, text: fn(&R) -> String) -> Self {
        self.filter_text = Some(text);
        self
    }

    #[must_use]
    pub const fn is_sortable(&self) -> bool {
        self.sort_key.is_some()
    }

    #[must_use]
    pub const fn is_filterable(&self) -> bool {
        self.filter_text.is_some()
    }

    pub fn render(&self, record: &R) -> Cell {
        (self.render)(record)
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("sortable", &self.is_sortable())
            .field("filterable", &self.is_filterable())
            .finish_non_exhaustive()
    }
}

/// An exact-match select filter (`role`, `tier`, `status`, `type`).
pub struct Facet<R> {
    pub key: &'static str,
    value: fn(&R) -> &'static str,
    /// Value applied when the query does not mention this facet.
    pub default: Option<&'static str>,
}

impl<R> Facet<R> {
    pub fn new(key: &'static str, value: fn(&R) -> &'static str) -> Self {
        Self {
            key,
            value,
            default: None,
        }
    }

    #[must_use]
    pub fn default_to(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    fn matches(&self, record: &R, wanted: &str) -> bool {
        (self.value)(record).eq_ignore_ascii_case(wanted)
    }
}

impl<R> fmt::Debug for Facet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("key", &self.key)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Everything a browser needs to know about one table.
#[derive(Debug)]
pub struct TableDescriptor<R> {
    pub columns: Vec<Column<R>>,
    pub facets: Vec<Facet<R>>,
    /// Column the text filter applies to when the query does not say.
    pub default_filter_by: &'static str,
}

impl<R> TableDescriptor<R> {
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Filterable columns, in display order.
    pub fn filterable_columns(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter().filter(|c| c.is_filterable())
    }
}

// =============================================================================
// Query
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Active sort of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub fn ascending(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Asc,
        }
    }

    /// Next sort after clicking `column`'s header.
    ///
    /// The same column flips between ascending and descending. Any other
    /// column, or no current sort, starts at ascending.
    #[must_use]
    pub fn toggled(current: Option<&Self>, column: &str) -> Self {
        match current {
            Some(sort) if sort.column == column && sort.direction == SortDirection::Asc => Self {
                column: column.to_string(),
                direction: SortDirection::Desc,
            },
            _ => Self::ascending(column),
        }
    }
}

/// Parsed browser query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserQuery {
    pub filter: String,
    pub filter_by: Option<String>,
    pub sort: Option<Sort>,
    /// 1-based page number.
    pub page: usize,
    pub facets: BTreeMap<String, String>,
}

impl Default for BrowserQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            filter_by: None,
            sort: None,
            page: 1,
            facets: BTreeMap::new(),
        }
    }
}

impl BrowserQuery {
    /// Build from raw query parameters. Unparseable values fall back to
    /// defaults; empty values are ignored.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let direction = match get("dir") {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        Self {
            filter: get("filter").unwrap_or_default().to_string(),
            filter_by: get("filter_by").map(ToString::to_string),
            sort: get("sort").map(|column| Sort {
                column: column.to_string(),
                direction,
            }),
            page: get("page")
                .and_then(|p| p.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1),
            facets: params
                .iter()
                .filter(|(k, v)| !RESERVED_PARAMS.contains(&k.as_str()) && !v.trim().is_empty())
                .map(|(k, v)| (k.clone(), v.trim().to_string()))
                .collect(),
        }
    }

    /// Parse a raw `a=b&c=d` query string.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let params = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let decode = |s: &str| {
                    urlencoding::decode(&s.replace('+', " "))
                        .map(std::borrow::Cow::into_owned)
                        .ok()
                };
                Some((decode(key)?, decode(value)?))
            })
            .collect();
        Self::from_params(&params)
    }

    #[must_use]
    pub fn facet(&self, key: &str) -> Option<&str> {
        self.facets.get(key).map(String::as_str)
    }

    /// Query with the sort toggled on `column`, back on page 1.
    #[must_use]
    pub fn with_sort_toggled(&self, column: &str) -> Self {
        Self {
            sort: Some(Sort::toggled(self.sort.as_ref(), column)),
            page: 1,
            ..self.clone()
        }
    }

    /// Query without any sort, restoring store order.
    #[must_use]
    pub fn without_sort(&self) -> Self {
        Self {
            sort: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Encode as a query string without the leading `?`. Defaults are omitted.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if !self.filter.is_empty() {
            pairs.push(("filter".into(), self.filter.clone()));
        }
        if let Some(filter_by) = &self.filter_by {
            pairs.push(("filter_by".into(), filter_by.clone()));
        }
        for (key, value) in &self.facets {
            pairs.push((key.clone(), value.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".into(), sort.column.clone()));
            pairs.push(("dir".into(), sort.direction.as_str().into()));
        }
        if self.page > 1 {
            pairs.push(("page".into(), self.page.to_string()));
        }
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` with this query appended.
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }
}

// =============================================================================
// View state
// =============================================================================

/// Display state of a list or single-record view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Loading,
    Loaded,
    /// The table's scope has no records at all.
    Empty,
    /// The requested record does not exist.
    NotFound,
}

impl ViewState {
    /// Resolve a list view over a scope of `len` records.
    #[must_use]
    pub const fn for_list(len: usize) -> Self {
        if len == 0 { Self::Empty } else { Self::Loaded }
    }

    /// Resolve a single-record view.
    #[must_use]
    pub const fn for_detail(found: bool) -> Self {
        if found { Self::Loaded } else { Self::NotFound }
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Selected record identifiers for one table.
///
/// Independent of sort and filter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub table: String,
    ids: BTreeSet<String>,
}

impl Selection {
    #[must_use]
    pub fn for_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ids: BTreeSet::new(),
        }
    }

    /// Flip one row.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Header checkbox: select the current page when nothing is selected,
    /// otherwise clear everything.
    pub fn toggle_all<'a>(&mut self, page_ids: impl IntoIterator<Item = &'a str>) {
        if self.ids.is_empty() {
            self.ids.extend(page_ids.into_iter().map(ToString::to_string));
        } else {
            self.ids.clear();
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether every id on the page is selected (header checkbox state).
    #[must_use]
    pub fn covers<'a>(&self, page_ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for id in page_ids {
            if !self.ids.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist.
    pub fn retain(&mut self, exists: impl Fn(&str) -> bool) {
        self.ids.retain(|id| exists(id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// =============================================================================
// Browser
// =============================================================================

/// One page of a browsed table.
#[derive(Debug)]
pub struct BrowserPage<'a, R> {
    pub rows: Vec<&'a R>,
    pub state: ViewState,
    /// Clamped 1-based page number.
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub total_scope: usize,
    /// Column the text filter was applied to.
    pub filter_by: &'static str,
    /// The query with the page clamped.
    pub query: BrowserQuery,
}

impl<R> BrowserPage<'_, R> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

/// Applies a [`TableDescriptor`] to record snapshots.
#[derive(Debug)]
pub struct Browser<'d, R> {
    descriptor: &'d TableDescriptor<R>,
    page_size: usize,
}

impl<'d, R> Browser<'d, R> {
    #[must_use]
    pub fn new(descriptor: &'d TableDescriptor<R>, page_size: usize) -> Self {
        Self {
            descriptor,
            page_size: page_size.max(1),
        }
    }

    /// Browse `scope` (in store order) with `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if the query sorts by a column that is not
    /// sortable or filters by one that is not filterable.
    pub fn browse<'a>(
        &self,
        scope: &'a [R],
        query: &BrowserQuery,
    ) -> Result<BrowserPage<'a, R>, BrowserError> {
        let filter_by = self.resolve_filter_column(query)?;
        let sort_key = match &query.sort {
            Some(sort) => Some((
                self.descriptor
                    .column(&sort.column)
                    .and_then(|c| c.sort_key)
                    .ok_or_else(|| BrowserError::NotSortable(sort.column.clone()))?,
                sort.direction,
            )),
            None => None,
        };

        let mut rows: Vec<&R> = scope
            .iter()
            .filter(|record| self.passes_facets(record, query))
            .collect();

        let needle = query.filter.trim().to_lowercase();
        if let Some(text) = filter_by.filter_text {
            if !needle.is_empty() {
                rows.retain(|record| text(record).to_lowercase().contains(&needle));
            }
        }

        if let Some((key, direction)) = sort_key {
            // stable sort; descending compares reversed so ties keep store order
            let mut keyed: Vec<(SortKey, &R)> = rows.into_iter().map(|r| (key(r), r)).collect();
            match direction {
                SortDirection::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
                SortDirection::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
            }
            rows = keyed.into_iter().map(|(_, r)| r).collect();
        }

        let total_matches = rows.len();
        let page_count = total_matches.div_ceil(self.page_size).max(1);
        let page = query.page.clamp(1, page_count);
        let rows = rows
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        Ok(BrowserPage {
            rows,
            state: ViewState::for_list(scope.len()),
            page,
            page_count,
            total_matches,
            total_scope: scope.len(),
            filter_by: filter_by.key,
            query: query.with_page(page),
        })
    }

    fn resolve_filter_column(&self, query: &BrowserQuery) -> Result<&'d Column<R>, BrowserError> {
        let key = query
            .filter_by
            .as_deref()
            .unwrap_or(self.descriptor.default_filter_by);
        self.descriptor
            .column(key)
            .filter(|c| c.is_filterable())
            .ok_or_else(|| BrowserError::NotFilterable(key.to_string()))
    }

    fn passes_facets(&self, record: &R, query: &BrowserQuery) -> bool {
        self.descriptor.facets.iter().all(|facet| {
            match query.facet(facet.key).or(facet.default) {
                None => true,
                Some(value) if value.eq_ignore_ascii_case(FACET_ALL) => true,
                Some(value) => facet.matches(record, value),
            }
        })
    }
}
