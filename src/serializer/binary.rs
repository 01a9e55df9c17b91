//! Text <-> MessagePack transcoding
//!
//! The JSON text is the canonical form. The binary form is produced from the
//! text and turned back into text on load, so both formats go through exactly
//! the same serde model.

use serde_json::Value;

use super::error::Result;

pub fn text_to_binary(text: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(text)?;
    Ok(rmp_serde::to_vec_named(&value)?)
}

pub fn binary_to_text(binary: &[u8]) -> Result<Vec<u8>> {
    let value: Value = rmp_serde::from_slice(binary)?;
    Ok(serde_json::to_vec(&value)?)
}
