//! Delete orchestration.
//!
//! An explicit state machine for confirm-then-mutate deletes:
//!
//! ```text
//! Idle ──request_single──▶ ConfirmingSingle ──confirm──▶ Deleting ──settle──▶ Idle
//! Idle ──request_bulk────▶ ConfirmingBulk   ──confirm──▶ Deleting ──settle──▶ Idle
//!                          Confirming*      ──cancel───▶ Idle
//! ```
//!
//! The target is captured when the dialog opens; later selection changes do
//! not retarget it. A confirm while `Deleting` is a no-op, so a double click
//! calls the mutation once.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{MutationError, TableError};
use crate::notify::{Notifier, Toast};
use crate::record::Record;
use crate::state::{DeleteTarget, TableStore};

/// The caller-supplied deletion backend.
#[async_trait]
pub trait DeleteMutation<K: Send + Sync>: Send + Sync {
    async fn delete_one(&self, id: &K) -> Result<(), MutationError>;

    async fn delete_many(&self, ids: &[K]) -> Result<(), MutationError>;
}

#[async_trait]
impl<K, M> DeleteMutation<K> for Arc<M>
where
    K: Send + Sync + 'static,
    M: DeleteMutation<K> + ?Sized,
{
    async fn delete_one(&self, id: &K) -> Result<(), MutationError> {
        (**self).delete_one(id).await
    }

    async fn delete_many(&self, ids: &[K]) -> Result<(), MutationError> {
        (**self).delete_many(ids).await
    }
}

/// Where the orchestrator is in the delete flow.
#[derive(Debug, Clone)]
pub enum DeletePhase<T: Record> {
    Idle,
    ConfirmingSingle(T),
    ConfirmingBulk(BTreeSet<T::Id>),
    Deleting(DeleteTarget<T::Id>),
}

impl<T: Record> DeletePhase<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, DeletePhase::Idle)
    }

    pub fn is_confirming(&self) -> bool {
        matches!(
            self,
            DeletePhase::ConfirmingSingle(_) | DeletePhase::ConfirmingBulk(_)
        )
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self, DeletePhase::Deleting(_))
    }
}

/// How a confirm settled.
#[derive(Debug, Clone)]
pub enum DeleteOutcome<K> {
    /// The mutation succeeded; the collection owner should drop these ids.
    Deleted(Vec<K>),
    /// The mutation failed; the selection is untouched so the user can retry.
    Failed(MutationError),
    /// Nothing to confirm, or a deletion was already in flight.
    Ignored,
    /// The table was disposed while the mutation was in flight.
    Disposed,
}

#[derive(Debug)]
struct OrchestratorInner<T: Record> {
    phase: DeletePhase<T>,
}

/// Coordinates delete intent, confirmation and the mutation.
///
/// Cheap to clone; clones drive the same state machine.
pub struct DeleteOrchestrator<T: Record> {
    inner: Arc<Mutex<OrchestratorInner<T>>>,
    store: TableStore<T::Id>,
    mutation: Arc<dyn DeleteMutation<T::Id>>,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
}

impl<T: Record> Clone for DeleteOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            store: self.store.clone(),
            mutation: Arc::clone(&self.mutation),
            notifier: Arc::clone(&self.notifier),
            cancel: self.cancel.clone(),
        }
    }
}

impl<T: Record> DeleteOrchestrator<T> {
    /// Create an orchestrator bound to a table's store.
    pub fn new(
        store: TableStore<T::Id>,
        mutation: impl DeleteMutation<T::Id> + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OrchestratorInner {
                phase: DeletePhase::Idle,
            })),
            store,
            mutation: Arc::new(mutation),
            notifier: Arc::new(notifier),
            cancel: CancellationToken::new(),
        }
    }

    /// The current phase.
    pub fn phase(&self) -> DeletePhase<T> {
        self.lock().phase.clone()
    }

    /// Whether the confirmation should show a busy indicator.
    pub fn is_busy(&self) -> bool {
        self.lock().phase.is_deleting()
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OrchestratorInner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open the confirmation for deleting one record.
    pub fn request_single(&self, record: T) -> Result<(), TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_idle() {
            return Err(TableError::ConfirmationPending);
        }
        self.store
            .open_delete_confirmation(DeleteTarget::Single(record.id()))?;
        log::debug!("DeleteOrchestrator: confirming single delete of {}", record.id());
        inner.phase = DeletePhase::ConfirmingSingle(record);
        Ok(())
    }

    /// Open the confirmation for deleting the current selection.
    ///
    /// The selection is captured now. Returns the captured ids.
    pub fn request_bulk(&self) -> Result<BTreeSet<T::Id>, TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_idle() {
            return Err(TableError::ConfirmationPending);
        }
        let ids = self.store.snapshot().selection.ids();
        if ids.is_empty() {
            return Err(TableError::EmptySelection);
        }
        self.store
            .open_delete_confirmation(DeleteTarget::Bulk(ids.clone()))?;
        log::debug!("DeleteOrchestrator: confirming bulk delete of {} rows", ids.len());
        inner.phase = DeletePhase::ConfirmingBulk(ids.clone());
        Ok(ids)
    }

    /// Dismiss the confirmation. Returns false if there was nothing to
    /// cancel or the deletion is already in flight.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if !inner.phase.is_confirming() {
            return false;
        }
        inner.phase = DeletePhase::Idle;
        self.store.close_delete_confirmation();
        log::debug!("DeleteOrchestrator: cancelled");
        true
    }

    /// Confirm and run the deletion.
    ///
    /// Calls exactly one of `delete_one` / `delete_many` and notifies exactly
    /// once when it settles. Dropping the future before then abandons the
    /// deletion without a notification: the dialog closes and the selection
    /// is kept.
    pub async fn confirm(&self) -> DeleteOutcome<T::Id> {
        let target = {
            let mut inner = self.lock();
            let target = match &inner.phase {
                DeletePhase::ConfirmingSingle(record) => DeleteTarget::Single(record.id()),
                DeletePhase::ConfirmingBulk(ids) => DeleteTarget::Bulk(ids.clone()),
                DeletePhase::Deleting(_) => {
                    log::warn!("DeleteOrchestrator: confirm ignored, deletion in flight");
                    return DeleteOutcome::Ignored;
                }
                DeletePhase::Idle => {
                    log::debug!("DeleteOrchestrator: confirm ignored, nothing to confirm");
                    return DeleteOutcome::Ignored;
                }
            };
            inner.phase = DeletePhase::Deleting(target.clone());
            target
        };
        self.store.mark_delete_busy();
        let in_flight = InFlight { orchestrator: self };

        let ids = target.ids();
        let result = match &target {
            DeleteTarget::Single(id) => self.mutation.delete_one(id).await,
            DeleteTarget::Bulk(_) => self.mutation.delete_many(&ids).await,
        };
        std::mem::forget(in_flight);

        if self.cancel.is_cancelled() {
            log::debug!("DeleteOrchestrator: completion after dispose ignored");
            return DeleteOutcome::Disposed;
        }

        self.lock().phase = DeletePhase::Idle;
        match result {
            Ok(()) => {
                self.store.complete_delete(&ids);
                log::info!("Deleted {} record(s)", ids.len());
                self.notifier.notify(Toast::success(deleted_message(ids.len())));
                DeleteOutcome::Deleted(ids)
            }
            Err(err) => {
                self.store.close_delete_confirmation();
                log::error!("Delete of {} record(s) failed: {}", ids.len(), err);
                self.notifier.notify(
                    Toast::error(failed_message(ids.len())).with_body(err.message.clone()),
                );
                DeleteOutcome::Failed(err)
            }
        }
    }

    /// Tear down: any completion arriving after this is ignored.
    pub fn dispose(&self) {
        self.cancel.cancel();
        let mut inner = self.lock();
        if inner.phase.is_confirming() {
            inner.phase = DeletePhase::Idle;
        }
    }
}

/// Held across the mutation call. If the `confirm` future is dropped before
/// the mutation settles, the dialog closes and the orchestrator returns to
/// idle so the table is not stuck busy.
struct InFlight<'a, T: Record> {
    orchestrator: &'a DeleteOrchestrator<T>,
}

impl<T: Record> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let orchestrator = self.orchestrator;
        if orchestrator.cancel.is_cancelled() {
            return;
        }
        log::warn!("DeleteOrchestrator: deletion abandoned before it settled");
        orchestrator.lock().phase = DeletePhase::Idle;
        orchestrator.store.close_delete_confirmation();
    }
}

fn deleted_message(count: usize) -> String {
    if count == 1 {
        "Deleted 1 record".to_string()
    } else {
        format!("Deleted {} records", count)
    }
}

fn failed_message(count: usize) -> String {
    if count == 1 {
        "Failed to delete record".to_string()
    } else {
        format!("Failed to delete {} records", count)
    }
}
