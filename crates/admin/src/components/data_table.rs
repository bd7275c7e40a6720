//! Data table presentation settings.
//!
//! These types describe the chrome around a browser table: heading, search
//! box, select filters and empty state. What the rows contain is described by
//! [`super::browser::TableDescriptor`].

use serde::Serialize;

/// Option for select filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// The "show everything" option.
    #[must_use]
    pub fn all() -> Self {
        Self::new(super::browser::FACET_ALL, "All")
    }
}

/// A select filter shown above the table. `key` matches a facet key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFilter {
    /// Filter parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Available options.
    pub options: Vec<FilterOption>,
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options,
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier, also the URL segment.
    pub table_id: String,
    /// Card heading.
    pub title: String,
    /// Card description.
    pub description: String,
    /// Select filter definitions.
    pub filters: Vec<TableFilter>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Link and label of the "create" button, if the table has one.
    pub create: Option<(String, String)>,
    /// Whether rows carry selection checkboxes.
    pub selectable: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, title: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            title: title.to_string(),
            description: String::new(),
            filters: vec![],
            search_placeholder: "Search...".to_string(),
            empty_title: "No records yet".to_string(),
            empty_description: None,
            create: None,
            selectable: true,
        }
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Add a "create" button linking to `href`.
    #[must_use]
    pub fn create_button(mut self, href: &str, label: &str) -> Self {
        self.create = Some((href.to_string(), label.to_string()));
        self
    }

    /// Hide the selection checkboxes.
    #[must_use]
    pub const fn without_selection(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Look up a filter by key.
    #[must_use]
    pub fn find_filter(&self, key: &str) -> Option<&TableFilter> {
        self.filters.iter().find(|f| f.key == key)
    }
}
