//! JSON record files.
//!
//! A record file is a JSON array of objects, each with an `id` that is an
//! integer or a string. Every other field becomes a column.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tabula::column::{CellValue, ColumnDescriptor};
use tabula::record::{Record, RecordKey};

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecord {
    id: RecordKey,
    fields: Map<String, Value>,
}

impl Record for JsonRecord {
    type Id = RecordKey;

    fn id(&self) -> RecordKey {
        self.id.clone()
    }
}

impl JsonRecord {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            bail!("record is not a JSON object");
        };
        let id = match fields.get("id") {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(n) => RecordKey::Int(n),
                None => bail!("record id {} is not an integer", n),
            },
            Some(Value::String(s)) => RecordKey::Text(s.clone()),
            Some(other) => bail!("record id {} is not an integer or string", other),
            None => bail!("record has no id field"),
        };
        Ok(Self { id, fields })
    }

    /// A field as a cell value. Missing and null fields are empty.
    pub fn field(&self, name: &str) -> CellValue {
        match self.fields.get(name) {
            None | Some(Value::Null) => CellValue::Empty,
            Some(Value::Bool(b)) => CellValue::Bool(*b),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or_default(),
            },
            Some(Value::String(s)) => CellValue::Text(s.clone()),
            Some(other) => CellValue::Text(other.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Parse a record file's contents. Ids must be unique.
pub fn parse_records(json: &str) -> Result<Vec<JsonRecord>> {
    let values: Vec<Value> = serde_json::from_str(json).context("expected a JSON array of records")?;
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record = JsonRecord::from_value(value).with_context(|| format!("record #{}", index))?;
        if !seen.insert(record.id()) {
            bail!("duplicate record id {}", record.id());
        }
        records.push(record);
    }
    Ok(records)
}

pub fn load_records(path: &Path) -> Result<Vec<JsonRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = parse_records(&json).with_context(|| format!("failed to parse {}", path.display()))?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Serialize records back to a file's contents.
pub fn render_records(records: Vec<JsonRecord>) -> Result<String, serde_json::Error> {
    let values: Vec<Value> = records.into_iter().map(JsonRecord::into_value).collect();
    serde_json::to_string_pretty(&values)
}

/// Field names: `id` first, then the rest as they are first seen.
pub fn field_names(records: &[JsonRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if !records.is_empty() {
        names.push("id".to_string());
    }
    for record in records {
        for name in record.fields.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Build one column per field, or per requested field.
pub fn columns(records: &[JsonRecord], requested: Option<&[String]>) -> Result<Vec<ColumnDescriptor<JsonRecord>>> {
    let available = field_names(records);
    let names: Vec<String> = match requested {
        Some(requested) => {
            for name in requested {
                if !records.is_empty() && !available.contains(name) {
                    bail!("unknown column '{}' (available: {})", name, available.join(", "));
                }
            }
            requested.to_vec()
        }
        None => available,
    };

    Ok(names
        .into_iter()
        .map(|name| {
            let field = name.clone();
            ColumnDescriptor::new(name.clone(), name, move |r: &JsonRecord| r.field(&field))
        })
        .collect())
}
