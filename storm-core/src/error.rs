use thiserror::Error;

/// Failures raised by the extraction layer.
///
/// Leaf-level problems (a missing or non-numeric field) never show up here; those are
/// absorbed into defaults by [`crate::xml::Field`]. Only structural gaps are errors.
#[derive(Debug, Error)]
pub enum StormError {
    #[error("archive format error: {0}")]
    ArchiveFormat(String),

    #[error("failed to parse KML document: {0}")]
    Xml(String),

    #[error("missing required element: {path}")]
    MissingElement { path: String },

    #[error("malformed coordinate tuple '{0}'")]
    MalformedCoordinates(String),

    #[error("unable to parse timestamp '{input}'")]
    Timestamp { input: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StormError {
    pub fn missing(path: impl Into<String>) -> Self {
        StormError::MissingElement { path: path.into() }
    }

    pub fn timestamp(input: impl Into<String>) -> Self {
        StormError::Timestamp {
            input: input.into(),
        }
    }
}

impl From<roxmltree::Error> for StormError {
    fn from(err: roxmltree::Error) -> Self {
        StormError::Xml(err.to_string())
    }
}

pub type Result<T, E = StormError> = std::result::Result<T, E>;
