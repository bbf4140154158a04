use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tabula::column::find_column;
use tabula::config::TableConfig;
use tabula::delete::DeleteOutcome;
use tabula::pagination::PageToken;
use tabula::record::RecordKey;
use tabula::state::SortKey;
use tabula::surface::{TableSurface, render_text};

use crate::backend::{JsonFileMutation, StderrNotifier};
use crate::records::{JsonRecord, columns, load_records};
use crate::{DeleteArgs, ShowArgs};

fn load_config(path: Option<&Path>, page_size: Option<usize>) -> Result<TableConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            TableConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => TableConfig::default(),
    };

    // An explicit size is always offered
    if let Some(size) = page_size {
        if !config.offers_page_size(size) {
            config.page_size_options.push(size);
            config.page_size_options.sort_unstable();
        }
        config.default_page_size = size;
    }
    Ok(config)
}

fn parse_sort(arg: &str) -> SortKey {
    match arg.strip_prefix('-') {
        Some(column) => SortKey::desc(column),
        None => SortKey::asc(arg),
    }
}

pub fn show(args: ShowArgs) -> Result<()> {
    let records = load_records(&args.file)?;
    let config = load_config(args.config.as_deref(), args.page_size)?;
    let columns = columns(&records, args.columns.as_deref())?;

    let mut table = TableSurface::new(
        columns,
        records,
        config,
        JsonFileMutation::new(&args.file),
        StderrNotifier,
    )?;

    if !args.sort.is_empty() {
        let keys: Vec<SortKey> = args.sort.iter().map(|s| parse_sort(s)).collect();
        for key in &keys {
            let column = find_column(table.columns(), &key.column_id)
                .ok_or_else(|| anyhow!("unknown sort column '{}'", key.column_id))?;
            if !column.is_sortable() {
                bail!("column '{}' is not sortable", key.column_id);
            }
        }
        table.store().set_sort(keys);
    }

    for filter in &args.column_filters {
        let (column, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("column filter '{}' is not column=value", filter))?;
        table.set_column_filter(column, value)?;
    }

    if let Some(query) = &args.filter {
        table.type_filter(query.as_str());
        table.flush_filter();
    }

    for id in &args.select {
        table.toggle_row(&RecordKey::parse(id))?;
    }

    table.go_to(PageToken::Page(args.page.saturating_sub(1)));
    table.refresh();

    print!("{}", render_text(&table.view()));
    if args.dump_state {
        println!("{}", table.store().to_json()?);
    }
    Ok(())
}

fn prompt(message: &str) -> Result<bool> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{} [y/N] ", message)?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

pub async fn delete(args: DeleteArgs) -> Result<()> {
    let records = load_records(&args.file)?;
    let columns = columns(&records, None)?;
    let mut table: TableSurface<JsonRecord> = TableSurface::new(
        columns,
        records,
        TableConfig::default(),
        JsonFileMutation::new(&args.file),
        StderrNotifier,
    )?;

    let ids: Vec<RecordKey> = args.ids.iter().map(|id| RecordKey::parse(id)).collect();
    match ids.as_slice() {
        [id] => table.request_delete(id)?,
        _ => {
            for id in &ids {
                table.toggle_row(id)?;
            }
            table.request_bulk_delete()?;
        }
    }

    let confirmation = table
        .view()
        .confirmation
        .context("delete confirmation did not open")?;
    if !args.yes && !prompt(&confirmation.message)? {
        table.cancel_delete();
        println!("Cancelled");
        return Ok(());
    }

    match table.confirm_delete().await {
        DeleteOutcome::Deleted(ids) => {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            println!("Deleted {}", ids.join(", "));
            Ok(())
        }
        DeleteOutcome::Failed(err) => Err(err).context("delete failed"),
        DeleteOutcome::Ignored | DeleteOutcome::Disposed => bail!("delete did not run"),
    }
}
