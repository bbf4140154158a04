//! Delete backend and notifier for the command line.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tabula::delete::DeleteMutation;
use tabula::error::MutationError;
use tabula::notify::{Notifier, Toast, ToastLevel};
use tabula::record::{Record, RecordKey};

use crate::records::{parse_records, render_records};

/// Deletes records by rewriting the JSON file they were loaded from.
#[derive(Debug, Clone)]
pub struct JsonFileMutation {
    path: PathBuf,
}

impl JsonFileMutation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DeleteMutation<RecordKey> for JsonFileMutation {
    async fn delete_one(&self, id: &RecordKey) -> Result<(), MutationError> {
        self.delete_many(std::slice::from_ref(id)).await
    }

    async fn delete_many(&self, ids: &[RecordKey]) -> Result<(), MutationError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let mut records = parse_records(&json).map_err(|e| MutationError::new(format!("{:#}", e)))?;

        let wanted: HashSet<&RecordKey> = ids.iter().collect();
        let present: HashSet<RecordKey> = records.iter().map(|r| r.id()).collect();
        if let Some(missing) = ids.iter().find(|id| !present.contains(*id)) {
            return Err(MutationError::new(format!("record {} not found", missing)));
        }

        records.retain(|r| !wanted.contains(&r.id()));
        let json = render_records(records).map_err(|e| MutationError::new(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        log::info!("Removed {} record(s) from {}", ids.len(), self.path.display());
        Ok(())
    }
}

/// Prints toasts to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, toast: Toast) {
        let prefix = match toast.level {
            ToastLevel::Info => "info",
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
        };
        match &toast.body {
            Some(body) => eprintln!("{}: {}: {}", prefix, toast.title, body),
            None => eprintln!("{}: {}", prefix, toast.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tabula-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_delete_many_rewrites_file() {
        let path = temp_file("delete", r#"[{ "id": 1 }, { "id": "b" }, { "id": 3 }]"#);
        let mutation = JsonFileMutation::new(&path);

        mutation
            .delete_many(&[RecordKey::Int(1), RecordKey::Text("b".into())])
            .await
            .unwrap();
        let left = parse_records(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id(), RecordKey::Int(3));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_record_fails_without_writing() {
        let path = temp_file("missing", r#"[{ "id": 1 }]"#);
        let mutation = JsonFileMutation::new(&path);

        let err = mutation.delete_one(&RecordKey::Int(9)).await.unwrap_err();
        assert_eq!(err.message, "record 9 not found");
        assert_eq!(
            parse_records(&std::fs::read_to_string(&path).unwrap()).unwrap().len(),
            1
        );

        std::fs::remove_file(&path).unwrap();
    }
}
