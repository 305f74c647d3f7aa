#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Logging setup shared by fleetdesk binaries.
//!
//! One entry point installs the global subscriber (pretty or JSON, `RUST_LOG`
//! aware) and records the build identifier attached to command spans.

mod init;

pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, command_span, init_logging,
};
