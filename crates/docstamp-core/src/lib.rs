//! docstamp core
//!
//! Burns editor-placed fields (signatures, images, text, dates, radios) into
//! PDF pages as static content and records the provenance of each result.
//!
//! The [`SigningService`] ties the pieces together: it reads a source
//! document from a [`BlobStore`], runs the [`Compositor`], stores the result
//! and hands an audit record to an [`AuditSink`].

pub mod audit;
pub mod compose;
pub mod error;
pub mod payload;
pub mod render;
pub mod service;
pub mod store;

pub use audit::AuditRecorder;
pub use compose::{Composition, Compositor, SkippedField};
pub use error::{AuditPersistError, BlobStoreError, ComposeError, DocstampError, FieldRenderError};
pub use service::{SignOutcome, SigningService, StoredDocument};
pub use store::{AuditSink, BlobStore, MemoryAuditSink, MemoryBlobStore};
