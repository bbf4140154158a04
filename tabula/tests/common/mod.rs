//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use tabula::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: u32,
    pub name: String,
    pub kind: String,
    pub qty: i64,
}

impl Record for Part {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

pub fn part(id: u32, name: &str, kind: &str, qty: i64) -> Part {
    Part {
        id,
        name: name.to_string(),
        kind: kind.to_string(),
        qty,
    }
}

/// `count` parts with ids 1..=count, named `part-{id}`.
pub fn parts(count: u32) -> Vec<Part> {
    (1..=count)
        .map(|id| part(id, &format!("part-{}", id), "stock", i64::from(id)))
        .collect()
}

pub fn columns() -> Vec<ColumnDescriptor<Part>> {
    vec![
        ColumnDescriptor::new("name", "Name", |p: &Part| p.name.clone().into()),
        ColumnDescriptor::new("kind", "Kind", |p: &Part| p.kind.clone().into())
            .filter_with(|p: &Part, value: &str| p.kind == value),
        ColumnDescriptor::new("qty", "Qty", |p: &Part| p.qty.into()).format(CellFormat::Integer),
        ColumnDescriptor::action("actions", ""),
    ]
}

/// Ids of the rows on a page, in display order.
pub fn row_ids(page: &RowPage<'_, Part>) -> Vec<u32> {
    page.rows.iter().map(|r| r.record.id).collect()
}

/// A delete backend that records every call.
///
/// A gated mutation waits for [`RecordingMutation::release`] before it
/// settles.
#[derive(Default)]
pub struct RecordingMutation {
    calls: Mutex<Vec<Vec<u32>>>,
    failure: Option<String>,
    gate: Option<Notify>,
}

impl RecordingMutation {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Notify::new()),
            ..Self::default()
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<Vec<u32>> {
        self.calls.lock().unwrap().clone()
    }

    async fn settle(&self, ids: Vec<u32>) -> Result<(), MutationError> {
        self.calls.lock().unwrap().push(ids);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.failure {
            Some(message) => Err(MutationError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeleteMutation<u32> for RecordingMutation {
    async fn delete_one(&self, id: &u32) -> Result<(), MutationError> {
        self.settle(vec![*id]).await
    }

    async fn delete_many(&self, ids: &[u32]) -> Result<(), MutationError> {
        self.settle(ids.to_vec()).await
    }
}
