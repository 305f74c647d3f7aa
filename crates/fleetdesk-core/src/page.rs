//! List page controller: authoritative rows, filter, selection and actions.
//!
//! # Design
//! - Rows change only through a fetch; mutations never patch them locally.
//! - Every successful mutation is followed by a refetch.
//! - Fetches are ticketed. Results from a superseded fetch, or arriving after
//!   the page closed, are dropped.
//! - Changing the search term or status filter prunes the selection to the
//!   rows still visible, so bulk actions only touch rows the user can see.

use std::collections::HashSet;
use std::sync::Arc;

use fleetdesk_api_models::RecordId;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::AdminBackend;
use crate::bulk::{BulkAction, BulkActionDispatcher, BulkOutcome, PendingAction};
use crate::confirm::ConfirmationGate;
use crate::error::{BackendError, BackendResult};
use crate::filter::{ClientSideFilter, FilterRow, StatusFilter};
use crate::flight::InFlight;
use crate::notice::{Messages, Notifier};
use crate::resource::Resource;
use crate::selection::SelectionSet;

/// Identifies one list fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

/// State and actions of one admin list page.
pub struct ListPage<R, B: ?Sized> {
    resource: Resource,
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    messages: Messages,
    filter: ClientSideFilter,
    search: String,
    status: StatusFilter,
    rows: Vec<R>,
    selection: SelectionSet,
    gate: ConfirmationGate<PendingAction>,
    bulk_flight: InFlight,
    fetch_seq: u64,
    closed: bool,
}

impl<R, B> ListPage<R, B>
where
    R: FilterRow + DeserializeOwned,
    B: AdminBackend + ?Sized,
{
    /// Mount a page with no rows loaded yet.
    #[must_use]
    pub fn new(
        resource: Resource,
        backend: Arc<B>,
        notifier: Arc<dyn Notifier>,
        filter: ClientSideFilter,
    ) -> Self {
        Self {
            resource,
            backend,
            notifier,
            messages: Messages::default(),
            filter,
            search: String::new(),
            status: StatusFilter::All,
            rows: Vec::new(),
            selection: SelectionSet::new(),
            gate: ConfirmationGate::new(),
            bulk_flight: InFlight::new(),
            fetch_seq: 0,
            closed: false,
        }
    }

    /// Replace the default message catalog.
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Resource shown by the page.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Authoritative rows from the last applied fetch.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Rows passing the current search and status filter.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&R> {
        self.filter.apply(&self.rows, &self.search, &self.status)
    }

    /// Identifiers of the visible rows, in list order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.visible_rows()
            .into_iter()
            .filter_map(|row| row.record_id())
            .collect()
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Prompt text while a confirmation is pending.
    #[must_use]
    pub fn confirmation(&self) -> Option<&str> {
        self.gate.message()
    }

    /// Whether a bulk call is running.
    #[must_use]
    pub fn is_bulk_busy(&self) -> bool {
        self.bulk_flight.is_active()
    }

    /// Whether the page has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Update the search box.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.prune_selection();
    }

    /// Update the status dropdown.
    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status = status;
        self.prune_selection();
    }

    /// Toggle a visible row; hidden or unknown ids are ignored.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.visible_ids().contains(&id) {
            self.selection.toggle(id)
        } else {
            false
        }
    }

    /// Header checkbox over the visible rows.
    pub fn toggle_all(&mut self) {
        let visible = self.visible_ids();
        self.selection.select_all_or_clear(&visible);
    }

    /// Start a fetch; only the latest ticket's result will be applied.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        FetchTicket(self.fetch_seq)
    }

    /// Apply the result of a fetch started with `ticket`.
    ///
    /// Returns `false` when the result was dropped (stale ticket, closed
    /// page) or failed. Failures notify the user and keep the current rows.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: BackendResult<Vec<Value>>,
    ) -> bool {
        self.apply(ticket, result, true)
    }

    /// Fetch the authoritative list.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.begin_fetch();
        let result = self.backend.list(&self.resource).await;
        self.apply(ticket, result, true)
    }

    /// Ask to delete one row; opens the confirmation prompt.
    pub fn request_delete(&mut self, id: RecordId) {
        if self.closed {
            return;
        }
        let replaced = self
            .gate
            .request(self.messages.confirm_delete.clone(), PendingAction::Delete(id));
        if let Some(previous) = replaced {
            tracing::debug!(?previous, "pending confirmation replaced");
        }
    }

    /// Dismiss the prompt without acting.
    pub fn cancel_confirmation(&mut self) -> bool {
        self.gate.cancel()
    }

    /// Fire the pending action, then refetch if it succeeded.
    ///
    /// Returns `None` when no prompt was open.
    pub async fn confirm(&mut self) -> Option<BulkOutcome> {
        let action = self.gate.confirm()?;
        let dispatcher = BulkActionDispatcher::new(
            &*self.backend,
            self.notifier.as_ref(),
            &self.messages,
        );
        let outcome = match action {
            PendingAction::BulkDelete(ids) => {
                dispatcher
                    .delete(&self.resource, &ids, &mut self.selection, &self.bulk_flight)
                    .await
            }
            PendingAction::Delete(id) => {
                dispatcher
                    .delete_one(&self.resource, &id, &mut self.selection, &self.bulk_flight)
                    .await
            }
        };
        if outcome.is_success() {
            self.refetch_after_mutation().await;
        }
        Some(outcome)
    }

    /// Toolbar entry point for any bulk action.
    ///
    /// Delete opens the confirmation prompt; status changes run at once and
    /// refetch on success. A closed page answers [`BulkOutcome::Closed`].
    pub async fn trigger(&mut self, action: BulkAction) -> BulkOutcome {
        if self.closed {
            return BulkOutcome::Closed;
        }
        let outcome = BulkActionDispatcher::new(
            &*self.backend,
            self.notifier.as_ref(),
            &self.messages,
        )
        .trigger(
            &self.resource,
            action,
            &mut self.selection,
            &mut self.gate,
            &self.bulk_flight,
        )
        .await;
        if outcome.is_success() {
            self.refetch_after_mutation().await;
        }
        outcome
    }

    /// Unmount: drop any prompt and ignore results that arrive later.
    pub fn close(&mut self) {
        self.closed = true;
        let _ = self.gate.cancel();
        tracing::debug!(resource = self.resource.name(), "page closed");
    }

    async fn refetch_after_mutation(&mut self) {
        let ticket = self.begin_fetch();
        let result = self.backend.list(&self.resource).await;
        self.apply(ticket, result, false);
    }

    fn apply(
        &mut self,
        ticket: FetchTicket,
        result: BackendResult<Vec<Value>>,
        notify: bool,
    ) -> bool {
        if self.closed || ticket.0 != self.fetch_seq {
            tracing::debug!(
                resource = self.resource.name(),
                ticket = ticket.0,
                latest = self.fetch_seq,
                closed = self.closed,
                "dropping fetch result"
            );
            return false;
        }
        let decoded = result.and_then(|values| {
            values
                .into_iter()
                .map(serde_json::from_value::<R>)
                .collect::<Result<Vec<R>, _>>()
                .map_err(|err| BackendError::Decode {
                    operation: "list",
                    detail: err.to_string(),
                })
        });
        match decoded {
            Ok(rows) => {
                tracing::debug!(resource = self.resource.name(), rows = rows.len(), "list applied");
                self.rows = rows;
                self.selection.clear();
                true
            }
            Err(err) => {
                tracing::warn!(resource = self.resource.name(), error = %err, "list fetch failed");
                if notify {
                    self.notifier
                        .error(err.user_message().unwrap_or(&self.messages.fetch_failed));
                }
                false
            }
        }
    }

    fn prune_selection(&mut self) {
        let visible: HashSet<RecordId> = self.visible_ids().into_iter().collect();
        let dropped = self.selection.retain_within(&visible);
        if dropped > 0 {
            tracing::debug!(resource = self.resource.name(), dropped, "selection pruned by filter");
        }
    }
}
