//! Column descriptors and cell values.
//!
//! A [`ColumnDescriptor`] is the only sanctioned way to read a value out of
//! a record. Accessors must be pure: the same record always yields the same
//! value, which is what lets the row pipeline stay a pure function.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CellValue
// =============================================================================

/// A value read from a record by a column accessor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Check if this is the empty value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Generic ascending comparison.
    ///
    /// Empty sorts first. Two numbers compare numerically, two booleans
    /// compare `false < true`, everything else compares by its string form
    /// (byte order, no locale collation).
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Less,
            (_, CellValue::Empty) => Ordering::Greater,
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

// =============================================================================
// CellFormat
// =============================================================================

/// How a cell value is turned into display text.
///
/// One variant per kind of column; the table dispatches on the variant
/// instead of inspecting record shapes.
#[derive(Clone, Default)]
pub enum CellFormat {
    /// The value's own string form.
    #[default]
    Plain,
    /// Numbers rounded to an integer.
    Integer,
    /// Numbers with a fixed number of decimal places.
    Decimal { places: usize },
    /// Numbers prefixed with a currency symbol.
    Currency { symbol: String, places: usize },
    /// Booleans shown as one of two labels.
    Flag { yes: String, no: String },
    /// Anything else.
    Custom(Arc<dyn Fn(&CellValue) -> String + Send + Sync>),
}

impl CellFormat {
    /// Format a value for display.
    pub fn format(&self, value: &CellValue) -> String {
        match self {
            CellFormat::Plain => value.to_string(),
            CellFormat::Integer => match value.as_f64() {
                Some(x) => format!("{:.0}", x),
                None => value.to_string(),
            },
            CellFormat::Decimal { places } => match value.as_f64() {
                Some(x) => format!("{:.*}", places, x),
                None => value.to_string(),
            },
            CellFormat::Currency { symbol, places } => match value.as_f64() {
                Some(x) if x < 0.0 => format!("-{}{:.*}", symbol, places, -x),
                Some(x) => format!("{}{:.*}", symbol, places, x),
                None => value.to_string(),
            },
            CellFormat::Flag { yes, no } => match value {
                CellValue::Bool(true) => yes.clone(),
                CellValue::Bool(false) => no.clone(),
                other => other.to_string(),
            },
            CellFormat::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellFormat::Plain => f.write_str("Plain"),
            CellFormat::Integer => f.write_str("Integer"),
            CellFormat::Decimal { places } => {
                f.debug_struct("Decimal").field("places", places).finish()
            }
            CellFormat::Currency { symbol, places } => f
                .debug_struct("Currency")
                .field("symbol", symbol)
                .field("places", places)
                .finish(),
            CellFormat::Flag { yes, no } => f
                .debug_struct("Flag")
                .field("yes", yes)
                .field("no", no)
                .finish(),
            CellFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// =============================================================================
// ColumnDescriptor
// =============================================================================

type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
type FilterPredicate<T> = Arc<dyn Fn(&T, &str) -> bool + Send + Sync>;

/// One displayable, filterable and sortable facet of a record type.
///
/// # Example
///
/// ```
/// use tabula::column::{CellFormat, ColumnDescriptor};
///
/// struct Part {
///     sku: String,
///     qty: i64,
/// }
///
/// let columns = vec![
///     ColumnDescriptor::new("sku", "SKU", |p: &Part| p.sku.clone().into()),
///     ColumnDescriptor::new("qty", "Quantity", |p: &Part| p.qty.into())
///         .format(CellFormat::Integer),
///     ColumnDescriptor::action("actions", ""),
/// ];
/// assert!(!columns[2].is_sortable());
/// ```
pub struct ColumnDescriptor<T> {
    id: String,
    header: String,
    accessor: Accessor<T>,
    comparator: Option<Comparator<T>>,
    filter: Option<FilterPredicate<T>>,
    format: CellFormat,
    sortable: bool,
    filterable: bool,
}

impl<T: 'static> ColumnDescriptor<T> {
    /// Create a sortable, filterable column.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            comparator: None,
            filter: None,
            format: CellFormat::Plain,
            sortable: true,
            filterable: true,
        }
    }

    /// Create an action or selection column.
    ///
    /// Action columns have no value, are never sorted and never take part
    /// in text filtering.
    pub fn action(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            sortable: false,
            filterable: false,
            ..Self::new(id, header, |_| CellValue::Empty)
        }
    }

    /// Use a custom comparator instead of the generic one.
    pub fn compare_with(
        mut self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Use a custom predicate for column-level filters on this column.
    ///
    /// The predicate receives the record and the filter value.
    pub fn filter_with(
        mut self,
        predicate: impl Fn(&T, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Set the display format.
    pub fn format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    /// Disable sorting on this column.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Exclude this column from the global text filter.
    pub fn unfilterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Read this column's value from a record.
    pub fn value(&self, record: &T) -> CellValue {
        (self.accessor)(record)
    }

    /// Display text for this column's value.
    pub fn display(&self, record: &T) -> String {
        self.format.format(&self.value(record))
    }

    /// Ascending comparison of two records on this column.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.comparator {
            Some(cmp) => cmp(a, b),
            None => self.value(a).compare(&self.value(b)),
        }
    }

    /// The custom filter predicate, if one was declared.
    pub fn filter_predicate(&self) -> Option<&(dyn Fn(&T, &str) -> bool + Send + Sync)> {
        self.filter.as_deref()
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            comparator: self.comparator.clone(),
            filter: self.filter.clone(),
            format: self.format.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("format", &self.format)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("custom_comparator", &self.comparator.is_some())
            .field("custom_filter", &self.filter.is_some())
            .finish()
    }
}

/// Find a column by id.
pub fn find_column<'a, T>(
    columns: &'a [ColumnDescriptor<T>],
    id: &str,
) -> Option<&'a ColumnDescriptor<T>> {
    columns.iter().find(|c| c.id == id)
}
