pub mod audit;
pub mod types;

pub use audit::{hash_document, AuditRecord, FieldSummary};
pub use types::{CompositionJob, Field, FieldKind, FieldSpec, NormalizedRect};
