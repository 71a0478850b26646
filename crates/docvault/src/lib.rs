//! Client library for an OTP-authenticated document management service.
//!
//! The service lives behind a fixed HTTP endpoint family (`/generateOTP`,
//! `/validateOTP`, `/documentTags`, `/searchDocumentEntry`,
//! `/saveDocumentEntry`) and wraps every response in a
//! `{status, data, message}` envelope. This crate translates that envelope
//! into tagged `Result`s, keeps the authenticated session in an explicit
//! store, and implements the three client workflows on top:
//!
//! - search: buffered filter fields committed to a uniformly-shaped payload
//!   on an explicit trigger, with a busy guard against duplicate in-flight
//!   searches
//! - download/export: single-file downloads plus a bounded-concurrency bulk
//!   fetch packed into one ZIP archive, best-effort with a reported summary
//! - upload: validation before any request, then a multipart submission
//!
//! Binaries that drive these workflows live in the `docvault-cli` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod search;
pub mod session;
pub mod taxonomy;
pub mod upload;

pub use api::{ApiClient, Identity};
pub use config::{load_client_config, ClientConfig, MergeOpts};
pub use error::ApiError;
pub use export::{
    download_document, export_all, filename_from_url, preview_kind, ExportSummary, PreviewKind,
    SkippedFile, BULK_ARCHIVE_NAME,
};
pub use search::{
    DocumentRecord, SearchFilter, SearchOutcome, SearchPayload, SearchState, SearchWorkflow,
    TagFilter, SEARCH_PAGE_LENGTH, SEARCH_PAGE_START,
};
pub use session::{Session, SessionStore};
pub use taxonomy::{minor_options, MajorHead, TagCatalog, TagOption, TagSelection};
pub use upload::{DocumentMetadata, UploadRequest};
