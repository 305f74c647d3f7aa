//! Bulk delete and bulk status dispatch.
//!
//! # Design
//! - Empty selections are rejected before any call is issued.
//! - Delete goes through the confirmation gate; status changes do not.
//! - One in-flight flag per page blocks duplicate submissions.
//! - Selection is cleared only on success so failures can be retried.

use fleetdesk_api_models::{AccountStatus, RecordId};

use crate::backend::AdminBackend;
use crate::confirm::ConfirmationGate;
use crate::error::BackendError;
use crate::flight::InFlight;
use crate::notice::{Messages, Notifier};
use crate::resource::Resource;
use crate::selection::SelectionSet;

/// Bulk actions offered by list toolbars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulkAction {
    /// Delete the selected rows.
    Delete,
    /// Mark the selected accounts active.
    Activate,
    /// Mark the selected accounts inactive.
    Deactivate,
}

impl BulkAction {
    /// Status written by the action, if it is a status change.
    #[must_use]
    pub const fn status(self) -> Option<AccountStatus> {
        match self {
            Self::Delete => None,
            Self::Activate => Some(AccountStatus::Active),
            Self::Deactivate => Some(AccountStatus::Inactive),
        }
    }

    /// Whether the action must be confirmed first.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// Action parked in the confirmation gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    /// Delete the captured ids in one bulk call.
    BulkDelete(Vec<RecordId>),
    /// Delete one row.
    Delete(RecordId),
}

/// Result of a bulk trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Nothing was selected; a warning was shown.
    EmptySelection,
    /// A bulk call is already running; the trigger was ignored.
    Busy,
    /// The page was closed; nothing was dispatched.
    Closed,
    /// The confirmation prompt is open.
    AwaitingConfirmation,
    /// The backend accepted the call.
    Succeeded {
        /// Number of ids sent.
        affected: usize,
    },
    /// The call failed; the selection is untouched.
    Failed {
        /// Text shown to the user.
        message: String,
    },
}

impl BulkOutcome {
    /// Whether the page should refetch its list.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Issues bulk calls on behalf of a page. Holds no state of its own.
pub struct BulkActionDispatcher<'a, B: ?Sized> {
    backend: &'a B,
    notifier: &'a dyn Notifier,
    messages: &'a Messages,
}

impl<'a, B> BulkActionDispatcher<'a, B>
where
    B: AdminBackend + ?Sized,
{
    /// Dispatcher borrowing the page's collaborators.
    #[must_use]
    pub const fn new(backend: &'a B, notifier: &'a dyn Notifier, messages: &'a Messages) -> Self {
        Self {
            backend,
            notifier,
            messages,
        }
    }

    /// Entry point for toolbar buttons.
    pub async fn trigger(
        &self,
        resource: &Resource,
        action: BulkAction,
        selection: &mut SelectionSet,
        gate: &mut ConfirmationGate<PendingAction>,
        flight: &InFlight,
    ) -> BulkOutcome {
        let outcome = match action.status() {
            None => self.request_delete(selection, gate),
            Some(status) => self.update_status(selection, status, flight).await,
        };
        outcome.log(resource, action)
    }

    /// Park a bulk delete of the current selection behind the confirmation gate.
    pub fn request_delete(
        &self,
        selection: &SelectionSet,
        gate: &mut ConfirmationGate<PendingAction>,
    ) -> BulkOutcome {
        if selection.is_empty() {
            self.notifier.warning(&self.messages.select_rows_first);
            return BulkOutcome::EmptySelection;
        }
        let ids = selection.to_sorted_vec();
        gate.request(
            self.messages.bulk_delete_prompt(ids.len()),
            PendingAction::BulkDelete(ids),
        );
        BulkOutcome::AwaitingConfirmation
    }

    /// Delete `ids` in one call. Clears `selection` on success.
    pub async fn delete(
        &self,
        resource: &Resource,
        ids: &[RecordId],
        selection: &mut SelectionSet,
        flight: &InFlight,
    ) -> BulkOutcome {
        if ids.is_empty() {
            self.notifier.warning(&self.messages.select_rows_first);
            return BulkOutcome::EmptySelection;
        }
        let Some(_guard) = flight.try_begin() else {
            return BulkOutcome::Busy;
        };
        match self.backend.bulk_delete(resource, ids).await {
            Ok(envelope) => {
                selection.clear();
                self.notifier.success(
                    envelope
                        .message()
                        .unwrap_or(&self.messages.bulk_delete_success),
                );
                BulkOutcome::Succeeded {
                    affected: ids.len(),
                }
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Write `status` to every selected row. Clears `selection` on success.
    pub async fn update_status(
        &self,
        selection: &mut SelectionSet,
        status: AccountStatus,
        flight: &InFlight,
    ) -> BulkOutcome {
        if selection.is_empty() {
            self.notifier.warning(&self.messages.select_rows_first);
            return BulkOutcome::EmptySelection;
        }
        let Some(_guard) = flight.try_begin() else {
            return BulkOutcome::Busy;
        };
        let ids = selection.to_sorted_vec();
        match self.backend.bulk_update_status(&ids, status).await {
            Ok(envelope) => {
                selection.clear();
                self.notifier.success(
                    envelope
                        .message()
                        .unwrap_or(&self.messages.bulk_status_success),
                );
                BulkOutcome::Succeeded {
                    affected: ids.len(),
                }
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Delete a single row; the selection loses `id` on success.
    pub async fn delete_one(
        &self,
        resource: &Resource,
        id: &RecordId,
        selection: &mut SelectionSet,
        flight: &InFlight,
    ) -> BulkOutcome {
        let Some(_guard) = flight.try_begin() else {
            return BulkOutcome::Busy;
        };
        match self.backend.delete(resource, id).await {
            Ok(envelope) => {
                if selection.is_selected(id) {
                    selection.toggle(id.clone());
                }
                self.notifier
                    .success(envelope.message().unwrap_or(&self.messages.delete_success));
                BulkOutcome::Succeeded { affected: 1 }
            }
            Err(err) => self.fail(&err),
        }
    }

    fn fail(&self, err: &BackendError) -> BulkOutcome {
        let message = err
            .user_message()
            .unwrap_or(&self.messages.action_failed)
            .to_string();
        tracing::warn!(operation = err.operation(), error = %err, "bulk action failed");
        self.notifier.error(&message);
        BulkOutcome::Failed { message }
    }
}

impl BulkOutcome {
    fn log(self, resource: &Resource, action: BulkAction) -> Self {
        tracing::debug!(
            resource = resource.name(),
            action = ?action,
            outcome = ?self,
            "bulk trigger handled"
        );
        self
    }
}
