use thiserror::Error;

/// Document backend failures. Any of these aborts the whole render; no
/// partial PDF is ever returned.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("Malformed content on page {page}: {reason}")]
    MalformedContent { page: usize, reason: String },

    #[error("PDF metadata error: {0}")]
    Metadata(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("PDF buffer error: {0}")]
    Buffer(String),
}

/// Errors raised around the core: record decoding, profile loading, export.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid record JSON: {0}")]
    RecordFormat(#[from] serde_json::Error),

    #[error("Expected a JSON object or array of objects, found {0}")]
    RecordShape(String),

    #[error("Row {index} out of range ({count} records)")]
    RowOutOfRange { index: usize, count: usize },

    #[error("Unknown style profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid colour {value}: expected #RRGGBB")]
    InvalidColor { value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
