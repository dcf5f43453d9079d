use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type Generation = u64;
pub type SaveSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Saved {
        seq: SaveSeq,
        result: Result<(), FetchError>,
    },
    Deleted(Result<(), FetchError>),
    PipelineFinished(Result<(), FetchError>),
    SessionEnded(Result<(), FetchError>),
    AstFetched {
        generation: Generation,
        result: Result<serde_json::Value, FetchError>,
    },
    TreeFetched {
        generation: Generation,
        result: Result<DecodedImage, FetchError>,
    },
    EntitiesFetched {
        generation: Generation,
        result: Result<EntitiesPayload, FetchError>,
    },
}

/// Operators and function names found in the backend's token stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EntitiesPayload {
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA8.
    pub rgba: Vec<u8>,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecodedImage({}x{}, {} bytes)",
            self.width,
            self.height,
            self.rgba.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("unsupported content type {content_type}")]
    UnsupportedContentType { content_type: String },
    #[error("malformed response")]
    Decode,
    #[error("network error")]
    Network,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build backend client: {0}")]
    Backend(#[from] FetchError),
}
