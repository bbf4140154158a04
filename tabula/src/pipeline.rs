//! Row pipeline: filter → sort → paginate.
//!
//! A pure function of (records, columns, state). No hidden state, so a
//! caller may memoize on those inputs.

use crate::column::{ColumnDescriptor, find_column};
use crate::filter::{FuzzyQuery, matches};
use crate::pagination::{clamp_page_index, page_count};
use crate::state::{SortDirection, SortKey, TableState};

/// A row that survived filtering.
#[derive(Debug)]
pub struct PipelineRow<'a, T> {
    /// Index in the source collection (the tie-breaker for stable sorting).
    pub source_index: usize,
    pub record: &'a T,
    /// Fuzzy match score; 0 when no text query is active.
    pub rank: u32,
}

impl<T> Clone for PipelineRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PipelineRow<'_, T> {}

/// The rows to render for one page.
#[derive(Debug)]
pub struct RowPage<'a, T> {
    /// At most `page_size` rows.
    pub rows: Vec<PipelineRow<'a, T>>,
    /// Rows after filtering, before pagination.
    pub total_filtered_count: usize,
    /// The page actually shown, after clamping.
    pub page_index: usize,
    pub page_count: usize,
}

/// Filter records, keeping source order.
pub fn filter_rows<'a, T: 'static, K: Ord>(
    records: &'a [T],
    columns: &[ColumnDescriptor<T>],
    state: &TableState<K>,
) -> Vec<PipelineRow<'a, T>> {
    for filter in &state.column_filters {
        if find_column(columns, &filter.column_id).is_none() {
            log::warn!("Ignoring filter on unknown column '{}'", filter.column_id);
        }
    }

    let mut query = FuzzyQuery::new(&state.filter_text);
    records
        .iter()
        .enumerate()
        .filter_map(|(source_index, record)| {
            let m = matches(record, &mut query, &state.column_filters, columns);
            m.included.then_some(PipelineRow {
                source_index,
                record,
                rank: m.rank,
            })
        })
        .collect()
}

/// Stable sort by the given keys, first key most significant.
///
/// Keys naming unknown or unsortable columns are skipped. With no usable
/// key the order is left untouched.
pub fn sort_rows<T: 'static>(
    rows: &mut [PipelineRow<'_, T>],
    columns: &[ColumnDescriptor<T>],
    sort: &[SortKey],
) {
    let keys: Vec<(&ColumnDescriptor<T>, SortDirection)> = sort
        .iter()
        .filter_map(|key| match find_column(columns, &key.column_id) {
            Some(column) if column.is_sortable() => Some((column, key.direction)),
            Some(_) => {
                log::warn!("Ignoring sort on unsortable column '{}'", key.column_id);
                None
            }
            None => {
                log::warn!("Ignoring sort on unknown column '{}'", key.column_id);
                None
            }
        })
        .collect();

    if keys.is_empty() {
        return;
    }

    // slice::sort_by is stable, so equal rows keep source order
    rows.sort_by(|a, b| {
        for (column, direction) in &keys {
            let ord = column.compare(a.record, b.record);
            let ord = match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}

/// Run the whole pipeline and cut out the current page.
///
/// If the requested page lies past the end (the filtered set shrank), the
/// last page with rows is returned instead and `page_index` reports it; the
/// caller should write it back to the store.
///
/// # Example
///
/// ```
/// use tabula::column::ColumnDescriptor;
/// use tabula::pipeline::compute_rows;
/// use tabula::state::TableState;
///
/// let records = vec![3i64, 1, 2];
/// let columns = vec![ColumnDescriptor::new("n", "N", |n: &i64| (*n).into())];
/// let state: TableState<i64> = TableState::new(2, Vec::new()).with_sort_toggled("n");
///
/// let page = compute_rows(&records, &columns, &state);
/// let shown: Vec<i64> = page.rows.iter().map(|r| *r.record).collect();
/// assert_eq!(shown, vec![1, 2]);
/// assert_eq!(page.total_filtered_count, 3);
/// ```
pub fn compute_rows<'a, T: 'static, K: Ord>(
    records: &'a [T],
    columns: &[ColumnDescriptor<T>],
    state: &TableState<K>,
) -> RowPage<'a, T> {
    let mut rows = filter_rows(records, columns, state);
    sort_rows(&mut rows, columns, &state.sort);

    let page_size = state.pagination.page_size.max(1);
    let total_filtered_count = rows.len();
    let page_index = clamp_page_index(state.pagination.page_index, page_size, total_filtered_count);
    if page_index != state.pagination.page_index {
        log::debug!(
            "Clamped page index {} -> {} ({} rows)",
            state.pagination.page_index,
            page_index,
            total_filtered_count
        );
    }

    let start = page_index * page_size;
    let rows: Vec<PipelineRow<'a, T>> = rows.into_iter().skip(start).take(page_size).collect();

    RowPage {
        rows,
        total_filtered_count,
        page_index,
        page_count: page_count(total_filtered_count, page_size),
    }
}
