//! Artifact encoding
//!
//! An artifact is one marker byte followed by the payload:
//!
//! | marker | payload                   |
//! |--------|---------------------------|
//! | `0xF0` | JSON text                 |
//! | `0xF1` | gzip(JSON text)           |
//! | `0xF2` | MessagePack               |
//! | `0xF3` | gzip(MessagePack)         |
//!
//! Artifacts written before the marker existed are unmarked JSON, optionally
//! gzipped. Those are recognised by trying decompression first and then
//! sniffing the first non-whitespace byte. None of the marker values can
//! start a gzip stream, a JSON object or a MessagePack map, so the two
//! schemes never collide.

mod binary;
pub mod compression;
mod error;

pub use error::{Result, SerializeError};

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::Codebase;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Json,
    #[serde(rename = "msgpack")]
    #[value(name = "msgpack")]
    MessagePack,
}

impl ArtifactFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::MessagePack => "msgpack",
        }
    }
}

impl std::fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gzip,
}

impl Compression {
    pub fn from_flag(compress: bool) -> Self {
        if compress { Compression::Gzip } else { Compression::None }
    }
}

const MARKER_JSON: u8 = 0xF0;
const MARKER_JSON_GZIP: u8 = 0xF1;
const MARKER_MSGPACK: u8 = 0xF2;
const MARKER_MSGPACK_GZIP: u8 = 0xF3;

pub fn marker(format: ArtifactFormat, compression: Compression) -> u8 {
    match (format, compression) {
        (ArtifactFormat::Json, Compression::None) => MARKER_JSON,
        (ArtifactFormat::Json, Compression::Gzip) => MARKER_JSON_GZIP,
        (ArtifactFormat::MessagePack, Compression::None) => MARKER_MSGPACK,
        (ArtifactFormat::MessagePack, Compression::Gzip) => MARKER_MSGPACK_GZIP,
    }
}

pub fn parse_marker(byte: u8) -> Option<(ArtifactFormat, Compression)> {
    match byte {
        MARKER_JSON => Some((ArtifactFormat::Json, Compression::None)),
        MARKER_JSON_GZIP => Some((ArtifactFormat::Json, Compression::Gzip)),
        MARKER_MSGPACK => Some((ArtifactFormat::MessagePack, Compression::None)),
        MARKER_MSGPACK_GZIP => Some((ArtifactFormat::MessagePack, Compression::Gzip)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub format: ArtifactFormat,
    pub compression: Compression,
    /// Indent the JSON text; ignored for compressed or binary output
    pub pretty: bool,
}

impl SerializeOptions {
    pub fn new(format: ArtifactFormat, compression: Compression) -> Self {
        Self {
            format,
            compression,
            pretty: false,
        }
    }
}

/// How an artifact was encoded, as read from its first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub format: ArtifactFormat,
    pub compression: Compression,
    /// `false` for artifacts written before the marker byte existed
    pub marked: bool,
}

pub fn serialize<T: Serialize>(value: &T, options: &SerializeOptions) -> Result<Vec<u8>> {
    let indent = options.pretty
        && options.format == ArtifactFormat::Json
        && options.compression == Compression::None;
    let text = if indent {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    let encoded = match options.format {
        ArtifactFormat::Json => text,
        ArtifactFormat::MessagePack => binary::text_to_binary(&text)?,
    };

    let payload = match options.compression {
        Compression::None => encoded,
        Compression::Gzip => compression::gzip(&encoded).map_err(SerializeError::Compression)?,
    };

    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(marker(options.format, options.compression));
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode an artifact into `T`
///
/// Anything that cannot be read back, down to a well-formed object with the
/// wrong shape, is reported as [`SerializeError::InvalidData`].
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (text, _) = recover_text(bytes)?;
    decode_text(&text)
}

/// Report the encoding of an artifact without decoding its body
pub fn inspect(bytes: &[u8]) -> Result<ArtifactInfo> {
    recover_text(bytes).map(|(_, info)| info)
}

/// Re-encode an artifact in another format without going through a typed value
pub fn transcode(bytes: &[u8], options: &SerializeOptions) -> Result<Vec<u8>> {
    let (text, _) = recover_text(bytes)?;
    let value: serde_json::Value = decode_text(&text)?;
    serialize(&value, options)
}

/// Canonical JSON text behind any artifact, plus how it was stored
fn recover_text(bytes: &[u8]) -> Result<(Vec<u8>, ArtifactInfo)> {
    let Some((&first, rest)) = bytes.split_first() else {
        return Err(SerializeError::InvalidData("artifact is empty".to_string()));
    };

    let (text, info) = match parse_marker(first) {
        Some((format, compression)) => {
            let payload = match compression {
                Compression::None => rest.to_vec(),
                Compression::Gzip => compression::gunzip(rest).map_err(|e| {
                    SerializeError::InvalidData(format!("corrupt gzip payload: {}", e))
                })?,
            };
            let text = match format {
                ArtifactFormat::Json => payload,
                ArtifactFormat::MessagePack => binary_payload_to_text(&payload)?,
            };
            let info = ArtifactInfo {
                format,
                compression,
                marked: true,
            };
            (text, info)
        }
        None => recover_legacy(bytes)?,
    };

    validate_text(&text)?;
    Ok((text, info))
}

fn recover_legacy(bytes: &[u8]) -> Result<(Vec<u8>, ArtifactInfo)> {
    let payload = compression::gunzip_or_raw(bytes);
    let compression = if payload.as_slice() == bytes {
        Compression::None
    } else {
        Compression::Gzip
    };
    debug!("Reading unmarked artifact ({:?})", compression);

    let looks_like_text = payload
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{');

    if looks_like_text {
        let info = ArtifactInfo {
            format: ArtifactFormat::Json,
            compression,
            marked: false,
        };
        Ok((payload, info))
    } else {
        let info = ArtifactInfo {
            format: ArtifactFormat::MessagePack,
            compression,
            marked: false,
        };
        Ok((binary_payload_to_text(&payload)?, info))
    }
}

fn binary_payload_to_text(payload: &[u8]) -> Result<Vec<u8>> {
    binary::binary_to_text(payload)
        .map_err(|e| SerializeError::InvalidData(format!("undecodable binary payload: {}", e)))
}

fn decode_text<T: DeserializeOwned>(text: &[u8]) -> Result<T> {
    serde_json::from_slice(text)
        .map_err(|e| SerializeError::InvalidData(format!("malformed artifact: {}", e)))
}

/// Recovered text must be a single non-empty JSON object
fn validate_text(text: &[u8]) -> Result<()> {
    let trimmed = text.trim_ascii();
    if trimmed.is_empty() {
        return Err(SerializeError::InvalidData("recovered text is empty".to_string()));
    }
    if trimmed.first() != Some(&b'{') || trimmed.last() != Some(&b'}') {
        return Err(SerializeError::InvalidData(
            "recovered text is not a complete object".to_string(),
        ));
    }
    Ok(())
}

/// Write `value` to `path`, creating missing parent directories. Returns bytes written.
pub fn save_to_file<T: Serialize>(value: &T, path: &Path, options: &SerializeOptions) -> Result<u64> {
    let bytes = serialize(value, options)?;
    write_artifact(path, &bytes)
}

/// Write already encoded artifact bytes, creating missing parent directories
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SerializeError::io(parent, e))?;
        }
    }
    fs::write(path, bytes).map_err(|e| SerializeError::io(path, e))?;

    let format = bytes
        .first()
        .and_then(|&b| parse_marker(b))
        .map_or("unmarked", |(format, _)| format.as_str());
    info!(
        "Wrote {} artifact ({} bytes) to {}",
        format,
        bytes.len(),
        path.display()
    );
    Ok(bytes.len() as u64)
}

pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| SerializeError::io(path, e))?;
    deserialize(&bytes)
}

pub fn save_codebase(codebase: &Codebase, path: &Path, options: &SerializeOptions) -> Result<u64> {
    save_to_file(codebase, path, options)
}

pub fn load_codebase(path: &Path) -> Result<Codebase> {
    load_from_file(path)
}
