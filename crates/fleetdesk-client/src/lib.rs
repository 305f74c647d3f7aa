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
//! reqwest adapter implementing the fleetdesk backend traits.
//!
//! Layout: `auth.rs` (bearer context, token store), `error.rs` (construction
//! errors), `http.rs` (the [`HttpBackend`] itself).

pub mod auth;
pub mod error;
pub mod http;

pub use auth::{AuthContext, TokenStore};
pub use error::{ClientError, ClientResult, TokenStoreError};
pub use http::{DEFAULT_TIMEOUT, HEADER_REQUEST_ID, HttpBackend, HttpOptions};
