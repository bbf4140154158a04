//! Table configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::state::{DEFAULT_PAGE_SIZE, SortKey};

/// Default quiet period before a filter edit is applied.
pub const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 300;

/// Options recognised by a table instance.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
///
/// # Example
///
/// ```
/// use tabula::config::TableConfig;
///
/// let config = TableConfig::from_json(r#"{ "default_page_size": 20 }"#).unwrap();
/// assert_eq!(config.default_page_size, 20);
/// assert_eq!(config.page_size_options, vec![5, 10, 20, 50]);
/// assert_eq!(config.debounce_delay_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Page sizes offered by the page-size selector.
    ///
    /// Default: 5, 10, 20, 50
    pub page_size_options: Vec<usize>,

    /// Quiet period before a filter edit reaches the table.
    ///
    /// Default: 300 ms
    pub debounce_delay_ms: u64,

    /// Sort applied when the table is created.
    ///
    /// Default: none (source order)
    pub default_sort: Vec<SortKey>,

    /// Page size used when the table is created.
    ///
    /// Default: 10
    pub default_page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size_options: vec![5, 10, 20, 50],
            debounce_delay_ms: DEFAULT_DEBOUNCE_DELAY_MS,
            default_sort: Vec::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the page size options.
    pub fn with_page_size_options(mut self, options: impl Into<Vec<usize>>) -> Self {
        self.page_size_options = options.into();
        self
    }

    /// Sets the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Sets the default sort.
    pub fn with_default_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.default_sort = sort;
        self
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Whether `size` is one of the offered page sizes.
    pub fn offers_page_size(&self, size: usize) -> bool {
        self.page_size_options.contains(&size)
    }

    /// Check the options are usable together.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.page_size_options.is_empty() {
            return Err(TableError::InvalidConfig(
                "page_size_options must not be empty".into(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(TableError::InvalidConfig(
                "page_size_options must not contain 0".into(),
            ));
        }
        if !self.offers_page_size(self.default_page_size) {
            return Err(TableError::InvalidConfig(format!(
                "default_page_size {} is not one of page_size_options {:?}",
                self.default_page_size, self.page_size_options
            )));
        }
        Ok(())
    }
}
