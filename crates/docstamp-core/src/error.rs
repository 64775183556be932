use thiserror::Error;

/// Fatal failures of a single composition
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to parse PDF: {0}")]
    DocumentParse(String),

    #[error("Failed to update page: {0}")]
    PageUpdate(String),

    #[error("Failed to serialize PDF: {0}")]
    Serialize(String),
}

/// Why one field was left out of the output. Never fatal to the job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldRenderError {
    #[error("page index {page_index} is outside 0..{page_count}")]
    PageOutOfRange { page_index: i64, page_count: usize },

    #[error("malformed rectangle")]
    MalformedRect,

    #[error("field area is too small to draw into")]
    AreaTooSmall,

    #[error("empty image payload")]
    EmptyPayload,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("payload is neither PNG nor JPEG")]
    UndecodableImage,

    #[error("no font available for text")]
    FontUnavailable,

    #[error("failed to encode drawing: {0}")]
    Encode(String),

    #[error("unsupported field type '{0}'")]
    Unsupported(String),
}

/// Failures of the blob store collaborator
#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Blob store error: {0}")]
    Backend(String),
}

/// The audit sink could not persist a record
#[derive(Error, Debug)]
#[error("Failed to persist audit record: {0}")]
pub struct AuditPersistError(pub String);

/// Request-level failures of the signing service
#[derive(Error, Debug)]
pub enum DocstampError {
    #[error("Invalid job input: {0}")]
    InvalidJobInput(String),

    #[error("Source document not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to read source document: {0}")]
    SourceRead(String),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("Failed to store result document: {0}")]
    StoreWrite(String),
}

impl DocstampError {
    /// Stable kind name for API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DocstampError::InvalidJobInput(_) => "InvalidJobInput",
            DocstampError::SourceNotFound(_) => "SourceNotFound",
            DocstampError::SourceRead(_) => "SourceReadError",
            DocstampError::Compose(ComposeError::DocumentParse(_)) => "DocumentParseError",
            DocstampError::Compose(ComposeError::PageUpdate(_))
            | DocstampError::Compose(ComposeError::Serialize(_)) => "SerializeError",
            DocstampError::StoreWrite(_) => "StoreWriteError",
        }
    }
}
