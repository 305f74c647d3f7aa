#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Page-level orchestration shared by every fleetdesk admin list.
//!
//! Layout:
//! - `selection.rs`: checked-row set and header checkbox behaviour
//! - `confirm.rs`: `Closed | Open` confirmation state machine
//! - `filter.rs`: client-side search and status filtering
//! - `bulk.rs`: bulk delete / status dispatch with in-flight guard
//! - `transfer.rs`: export download and import upload pipeline
//! - `page.rs`: list controller composing the pieces above
//! - `poll.rs`: cancellable periodic tasks
//! - `backend.rs`: traits implemented by HTTP adapters

pub mod backend;
pub mod bulk;
pub mod confirm;
pub mod error;
pub mod filter;
pub mod flight;
pub mod notice;
pub mod page;
pub mod poll;
pub mod resource;
pub mod selection;
pub mod transfer;

pub use backend::{AdminBackend, ExportPayload, ImportFile, TransferBackend};
pub use bulk::{BulkAction, BulkActionDispatcher, BulkOutcome, PendingAction};
pub use confirm::{ConfirmState, ConfirmationGate};
pub use error::{BackendError, BackendResult, TransferError, TransferResult};
pub use filter::{ClientSideFilter, FilterRow, StatusFilter};
pub use flight::{FlightGuard, InFlight};
pub use notice::{Messages, Notice, NoticeKind, Notifier, RecordingNotifier};
pub use page::{FetchTicket, ListPage};
pub use poll::{PollHandle, Poller};
pub use resource::{Resource, Route, RouteMethod};
pub use selection::SelectionSet;
pub use transfer::{
    DirectorySink, DownloadSink, FileInput, SavedExport, TransferPipeline, TransferState,
    export_filename,
};

pub use fleetdesk_api_models::{AccountStatus, ApiEnvelope, ExportFormat, RecordId, RouteStyle};
