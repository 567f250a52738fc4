//! Compressed encoding of editor saves.
//!
//! A save is the pretty-printed template JSON, DEFLATE-compressed and then
//! standard-base64 encoded so it can sit inside a JSONB array.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Format of [`SaveEntry::updated_at`], e.g. `3:04:05 PM, 10/16/2026`.
pub const SAVE_TIMESTAMP_FORMAT: &str = "%-I:%M:%S %p, %-m/%-d/%Y";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Save is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Save could not be (de)compressed: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Decompressed save is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Compress and encode a serialized template.
pub fn encode_save(text: &str) -> Result<String, CodecError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode_save`].
pub fn decode_save(encoded: &str) -> Result<String, CodecError> {
    let compressed = STANDARD.decode(encoded.trim())?;
    let mut decoder = DeflateDecoder::new(compressed.as_slice());
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn format_save_timestamp(at: Timestamp) -> String {
    at.format(SAVE_TIMESTAMP_FORMAT).to_string()
}

/// One element of a session's `email_saves` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEntry {
    /// Output of [`encode_save`].
    pub save: String,
    pub updated_at: String,
}

impl SaveEntry {
    /// Encode `template_json` into a new entry stamped with `at`.
    pub fn new(template_json: &str, at: Timestamp) -> Result<Self, CodecError> {
        Ok(Self {
            save: encode_save(template_json)?,
            updated_at: format_save_timestamp(at),
        })
    }

    pub fn decode(&self) -> Result<String, CodecError> {
        decode_save(&self.save)
    }
}
