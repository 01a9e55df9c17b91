use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
    /// The bytes are not an artifact this crate can read back
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encode error: {0}")]
    BinaryEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    BinaryDecode(#[from] rmp_serde::decode::Error),

    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SerializeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SerializeError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_invalid_data(&self) -> bool {
        matches!(self, SerializeError::InvalidData(_))
    }
}

pub type Result<T> = std::result::Result<T, SerializeError>;
