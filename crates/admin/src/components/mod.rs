//! Reusable UI building blocks.
//!
//! - [`browser`] - the sortable, filterable, paginated record browser
//! - [`data_table`] - presentation settings around a browser table
//! - [`tables`] - the portal's concrete tables and their column descriptors

pub mod browser;
pub mod data_table;
pub mod tables;

pub use browser::{Browser, BrowserError, BrowserPage, BrowserQuery, Cell, Selection, ViewState};
pub use data_table::DataTableConfig;
pub use tables::Table;
