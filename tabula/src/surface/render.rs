//! Plain-text rendering of a [`TableView`].

use std::fmt::Display;

use crate::pagination::PageToken;

use super::view::TableView;

const SELECTED: char = '■';
const UNSELECTED: char = '□';

/// Render a view as a text grid with a footer.
///
/// ```text
/// □ Name ▲  Qty
/// ─ ──────  ───
/// ■ bolt     12
/// □ nut       3
///
/// 1 - 2 of 2  [1]  Rows per page: 10 (5 10 20 50)
/// ```
pub fn render_text<K: Display>(view: &TableView<K>) -> String {
    let mut out = String::new();

    // Header labels carry the sort indicator
    let labels: Vec<String> = view
        .headers
        .iter()
        .map(|h| match h.indicator() {
            Some(arrow) => format!("{} {}", h.label, arrow),
            None => h.label.clone(),
        })
        .collect();

    let mut widths: Vec<usize> = labels.iter().map(|l| l.chars().count()).collect();
    for row in &view.rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let page_mark = if view.page_selected { SELECTED } else { UNSELECTED };
    push_line(&mut out, page_mark, &labels, &widths);

    let rules: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    push_line(&mut out, '─', &rules, &widths);

    if view.rows.is_empty() {
        out.push_str("  No results.\n");
    }
    for row in &view.rows {
        let mark = if row.selected { SELECTED } else { UNSELECTED };
        push_line(&mut out, mark, &row.cells, &widths);
    }

    out.push('\n');
    let footer = &view.footer;
    let window: Vec<String> = footer
        .window
        .iter()
        .map(|token| match token {
            PageToken::Page(index) if *index == footer.page_index => format!("[{}]", token),
            _ => token.to_string(),
        })
        .collect();
    let options: Vec<String> = footer
        .page_size_options
        .iter()
        .map(|size| size.to_string())
        .collect();
    out.push_str(&format!(
        "{}  {}  Rows per page: {} ({})",
        footer.summary,
        window.join(" "),
        footer.page_size,
        options.join(" ")
    ));
    if footer.selected_count > 0 {
        out.push_str(&format!("  {} selected", footer.selected_count));
    }
    out.push('\n');

    if let Some(confirmation) = &view.confirmation {
        out.push_str(&confirmation.message);
        if confirmation.busy {
            out.push_str(" (deleting…)");
        }
        out.push('\n');
    }

    out
}

fn push_line(out: &mut String, mark: char, cells: &[String], widths: &[usize]) {
    out.push(mark);
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        out.push_str(&" ".repeat(pad));
    }
    // No trailing padding
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SortDirection;
    use crate::surface::view::{ConfirmationView, FooterView, HeaderCell, RowView};

    fn view() -> TableView<u32> {
        TableView {
            headers: vec![
                HeaderCell {
                    column_id: "name".into(),
                    label: "Name".into(),
                    sortable: true,
                    sort: Some(SortDirection::Ascending),
                },
                HeaderCell {
                    column_id: "qty".into(),
                    label: "Qty".into(),
                    sortable: true,
                    sort: None,
                },
            ],
            rows: vec![
                RowView {
                    id: 1,
                    selected: true,
                    cells: vec!["bolt".into(), "12".into()],
                },
                RowView {
                    id: 2,
                    selected: false,
                    cells: vec!["nut".into(), "3".into()],
                },
            ],
            footer: FooterView {
                summary: "1 - 2 of 2".into(),
                window: vec![PageToken::Page(0)],
                page_index: 0,
                page_count: 1,
                page_size: 10,
                page_size_options: vec![5, 10],
                selected_count: 1,
            },
            page_selected: false,
            filter_draft: String::new(),
            confirmation: None,
        }
    }

    #[test]
    fn test_render_grid() {
        let text = render_text(&view());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "□ Name ▲ Qty");
        assert_eq!(lines[2], "■ bolt   12");
        assert_eq!(lines[3], "□ nut    3");
        assert_eq!(lines[5], "1 - 2 of 2  [1]  Rows per page: 10 (5 10)  1 selected");
    }

    #[test]
    fn test_render_confirmation() {
        let mut view = view();
        view.confirmation = Some(ConfirmationView {
            ids: vec![1],
            busy: true,
            message: "Delete record 1?".into(),
        });
        assert!(render_text(&view).ends_with("Delete record 1? (deleting…)\n"));
    }

    #[test]
    fn test_render_empty() {
        let mut view = view();
        view.rows.clear();
        assert!(render_text(&view).contains("No results."));
    }
}
