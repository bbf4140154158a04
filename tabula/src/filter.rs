//! Fuzzy filtering using nucleo-matcher.
//!
//! A record passes the global text filter when the query's characters appear,
//! in order and case-insensitively, somewhere in the space-joined values of
//! its filterable columns. nucleo scores adjacent, word-start and early
//! matches higher than scattered ones; that score is the record's rank.
//!
//! Column filters are independent and AND-ed with the text filter. A column
//! with a custom predicate uses it; any other column is fuzzy matched on its
//! own value only.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::column::{ColumnDescriptor, find_column};
use crate::state::ColumnFilter;

/// Result of filtering a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMatch {
    /// Whether the record passes every active filter.
    pub included: bool,
    /// Match score (higher is better). Zero for an empty query.
    pub rank: u32,
}

impl FilterMatch {
    const EXCLUDED: FilterMatch = FilterMatch {
        included: false,
        rank: 0,
    };
}

/// A compiled text query, reused across records.
pub struct FuzzyQuery {
    atom: Option<Atom>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl FuzzyQuery {
    /// Compile a query. Empty or whitespace-only queries match everything.
    pub fn new(query: &str) -> Self {
        let atom = if query.trim().is_empty() {
            None
        } else {
            // A single atom keeps the whole query as one ordered subsequence;
            // whitespace in the query must be matched like any other char.
            Some(Atom::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
                false,
            ))
        };
        Self {
            atom,
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    /// Whether this query filters anything out.
    pub fn is_empty(&self) -> bool {
        self.atom.is_none()
    }

    /// Score a haystack. `None` means no match.
    pub fn score(&mut self, haystack: &str) -> Option<u32> {
        let Some(atom) = &self.atom else {
            return Some(0);
        };
        self.buf.clear();
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        atom.score(haystack, &mut self.matcher).map(u32::from)
    }
}

/// Build the text the global filter matches against.
pub fn haystack<T: 'static>(record: &T, columns: &[ColumnDescriptor<T>]) -> String {
    columns
        .iter()
        .filter(|c| c.is_filterable())
        .map(|c| c.value(record).to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filter a single record against a global query and the column filters.
///
/// Column filters naming unknown columns are skipped; the caller is expected
/// to have warned about them once per pipeline run.
pub fn matches<T: 'static>(
    record: &T,
    query: &mut FuzzyQuery,
    column_filters: &[ColumnFilter],
    columns: &[ColumnDescriptor<T>],
) -> FilterMatch {
    for filter in column_filters {
        let Some(column) = find_column(columns, &filter.column_id) else {
            continue;
        };
        if !column_filter_passes(record, column, &filter.value) {
            return FilterMatch::EXCLUDED;
        }
    }

    if query.is_empty() {
        return FilterMatch {
            included: true,
            rank: 0,
        };
    }

    match query.score(&haystack(record, columns)) {
        Some(rank) => FilterMatch {
            included: true,
            rank,
        },
        None => FilterMatch::EXCLUDED,
    }
}

fn column_filter_passes<T: 'static>(record: &T, column: &ColumnDescriptor<T>, value: &str) -> bool {
    if let Some(predicate) = column.filter_predicate() {
        return predicate(record, value);
    }
    let mut query = FuzzyQuery::new(value);
    query.score(&column.value(record).to_string()).is_some()
}

/// Result of ranking plain labels.
#[derive(Debug, Clone)]
pub struct LabelMatch {
    /// Index of the matched label in the original list.
    pub index: usize,
    /// Match score (higher is better).
    pub score: u32,
}

/// Rank plain labels against a query.
///
/// Returns matches sorted by score (highest first); ties keep input order.
/// Empty query returns all labels with score 0.
///
/// # Example
///
/// ```
/// use tabula::filter::fuzzy_filter;
///
/// let labels = vec!["Quantity".to_string(), "Price".to_string()];
/// let matches = fuzzy_filter("qty", &labels);
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].index, 0);
/// ```
pub fn fuzzy_filter(query: &str, labels: &[String]) -> Vec<LabelMatch> {
    let mut query = FuzzyQuery::new(query);

    let mut matches: Vec<LabelMatch> = labels
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            query
                .score(label)
                .map(|score| LabelMatch { index, score })
        })
        .collect();

    // Stable: equal scores keep their original order
    matches.sort_by(|a, b| b.score.cmp(&a.score));

    matches
}
