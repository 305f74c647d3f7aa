use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use fleetdesk_core::backend::AdminBackend;
use fleetdesk_core::{
    AccountStatus, ApiEnvelope, BackendError, BackendResult, BulkAction, BulkOutcome,
    ClientSideFilter, ListPage, Messages, NoticeKind, RecordId, RecordingNotifier, Resource,
};
use serde_json::{Value, json};

/// In-memory collection with a switchable failure mode.
#[derive(Default)]
struct MemoryBackend {
    rows: Mutex<Vec<Value>>,
    fail: AtomicBool,
    mutations: AtomicUsize,
    lists: AtomicUsize,
}

impl MemoryBackend {
    fn with_drivers(count: i64) -> Self {
        let rows = (1..=count)
            .map(|id| {
                json!({
                    "id": id,
                    "name": format!("Driver {id}"),
                    "status": if id % 2 == 0 { "inactive" } else { "active" },
                })
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    fn guard(&self) -> BackendResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected {
                operation: "bulk",
                status: 500,
                message: Some("database unavailable".into()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for MemoryBackend {
    async fn list(&self, _resource: &Resource) -> BackendResult<Vec<Value>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().expect("rows lock").clone())
    }

    async fn bulk_delete(
        &self,
        _resource: &Resource,
        ids: &[RecordId],
    ) -> BackendResult<ApiEnvelope<Value>> {
        self.guard()?;
        self.rows
            .lock()
            .expect("rows lock")
            .retain(|row| !ids.iter().any(|id| row["id"] == json!(id)));
        Ok(ApiEnvelope::ok(json!({"deleted": ids.len()})))
    }

    async fn bulk_update_status(
        &self,
        ids: &[RecordId],
        status: AccountStatus,
    ) -> BackendResult<ApiEnvelope<Value>> {
        self.guard()?;
        for row in self.rows.lock().expect("rows lock").iter_mut() {
            if ids.iter().any(|id| row["id"] == json!(id)) {
                row["status"] = json!(status.as_str());
            }
        }
        Ok(ApiEnvelope {
            success: true,
            data: None,
            message: Some("Statuses updated".into()),
        })
    }

    async fn delete(&self, _resource: &Resource, id: &RecordId) -> BackendResult<ApiEnvelope<Value>> {
        self.guard()?;
        self.rows
            .lock()
            .expect("rows lock")
            .retain(|row| row["id"] != json!(id));
        Ok(ApiEnvelope::ok(Value::Null))
    }
}

fn mount(backend: &Arc<MemoryBackend>) -> (ListPage<Value, MemoryBackend>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let page = ListPage::new(
        Resource::rest("drivers"),
        Arc::clone(backend),
        notifier.clone(),
        ClientSideFilter::new(["name"]).with_status_field("status"),
    );
    (page, notifier)
}

#[tokio::test]
async fn bulk_delete_of_three_rows_refetches_seven() -> Result<()> {
    let backend = Arc::new(MemoryBackend::with_drivers(10));
    let (mut page, notifier) = mount(&backend);
    assert!(page.refresh().await);
    assert_eq!(page.rows().len(), 10);

    for id in [2, 5, 9] {
        assert!(page.toggle(RecordId::Int(id)));
    }
    assert_eq!(page.trigger(BulkAction::Delete).await, BulkOutcome::AwaitingConfirmation);
    assert_eq!(
        page.confirmation(),
        Some(Messages::default().bulk_delete_prompt(3).as_str())
    );
    assert_eq!(backend.mutations.load(Ordering::SeqCst), 0);

    let outcome = page.confirm().await;
    assert_eq!(outcome, Some(BulkOutcome::Succeeded { affected: 3 }));
    assert!(page.selection().is_empty());
    assert_eq!(page.rows().len(), 7);
    assert!(page.confirmation().is_none());
    assert_eq!(backend.lists.load(Ordering::SeqCst), 2);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    Ok(())
}

#[tokio::test]
async fn failed_bulk_delete_keeps_selection_for_retry() -> Result<()> {
    let backend = Arc::new(MemoryBackend::with_drivers(4));
    let (mut page, notifier) = mount(&backend);
    assert!(page.refresh().await);
    page.toggle(RecordId::Int(1));
    page.toggle(RecordId::Int(3));
    backend.fail.store(true, Ordering::SeqCst);

    page.trigger(BulkAction::Delete).await;
    let outcome = page.confirm().await;
    assert_eq!(
        outcome,
        Some(BulkOutcome::Failed {
            message: "database unavailable".into()
        })
    );
    assert_eq!(page.selection().len(), 2);
    assert_eq!(page.rows().len(), 4);
    assert_eq!(backend.lists.load(Ordering::SeqCst), 1);
    assert_eq!(
        notifier.last().map(|notice| notice.kind),
        Some(NoticeKind::Error)
    );
    assert!(!page.is_bulk_busy());

    backend.fail.store(false, Ordering::SeqCst);
    page.trigger(BulkAction::Delete).await;
    assert_eq!(
        page.confirm().await,
        Some(BulkOutcome::Succeeded { affected: 2 })
    );
    assert_eq!(page.rows().len(), 2);
    Ok(())
}

#[tokio::test]
async fn empty_selection_warns_without_calls() {
    let backend = Arc::new(MemoryBackend::with_drivers(3));
    let (mut page, notifier) = mount(&backend);
    assert!(page.refresh().await);

    for action in [BulkAction::Delete, BulkAction::Activate, BulkAction::Deactivate] {
        assert_eq!(page.trigger(action).await, BulkOutcome::EmptySelection);
    }
    assert!(page.confirmation().is_none());
    assert_eq!(backend.mutations.load(Ordering::SeqCst), 0);
    let notices = notifier.notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|notice| notice.kind == NoticeKind::Warning));
}

#[tokio::test]
async fn cancelled_confirmation_issues_no_call() {
    let backend = Arc::new(MemoryBackend::with_drivers(3));
    let (mut page, notifier) = mount(&backend);
    assert!(page.refresh().await);
    page.toggle(RecordId::Int(1));

    page.trigger(BulkAction::Delete).await;
    assert!(page.cancel_confirmation());
    assert_eq!(page.confirm().await, None);
    assert_eq!(backend.mutations.load(Ordering::SeqCst), 0);
    assert_eq!(page.selection().len(), 1);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn status_filter_prunes_hidden_selection() {
    let backend = Arc::new(MemoryBackend::with_drivers(6));
    let (mut page, _) = mount(&backend);
    assert!(page.refresh().await);
    page.toggle_all();
    assert_eq!(page.selection().len(), 6);

    page.set_status_filter("inactive".into());
    assert_eq!(
        page.selection().to_sorted_vec(),
        vec![RecordId::Int(2), RecordId::Int(4), RecordId::Int(6)]
    );

    page.set_search("driver 4");
    assert_eq!(page.visible_ids(), vec![RecordId::Int(4)]);
    assert_eq!(page.selection().to_sorted_vec(), vec![RecordId::Int(4)]);
}

#[tokio::test]
async fn activate_updates_backend_and_refetches() {
    let backend = Arc::new(MemoryBackend::with_drivers(4));
    let (mut page, notifier) = mount(&backend);
    assert!(page.refresh().await);
    page.toggle(RecordId::Int(2));
    page.toggle(RecordId::Int(4));

    let outcome = page.trigger(BulkAction::Activate).await;
    assert_eq!(outcome, BulkOutcome::Succeeded { affected: 2 });
    assert!(page.confirmation().is_none());
    assert!(page.selection().is_empty());
    assert!(page.rows().iter().all(|row| row["status"] == "active"));
    assert_eq!(
        notifier.last().map(|notice| notice.message),
        Some("Statuses updated".to_string())
    );
}

#[tokio::test]
async fn single_row_delete_goes_through_gate() {
    let backend = Arc::new(MemoryBackend::with_drivers(2));
    let (mut page, _) = mount(&backend);
    assert!(page.refresh().await);

    page.request_delete(RecordId::Int(1));
    assert_eq!(
        page.confirmation(),
        Some(Messages::default().confirm_delete.as_str())
    );
    assert_eq!(backend.mutations.load(Ordering::SeqCst), 0);

    assert_eq!(
        page.confirm().await,
        Some(BulkOutcome::Succeeded { affected: 1 })
    );
    assert_eq!(page.visible_ids(), vec![RecordId::Int(2)]);
}
