//! Outer encodings a save file may arrive in before the JSON envelope.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    PlainJson,
    Gzip,
    Base64,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainJson => "json",
            Self::Gzip => "gzip",
            Self::Base64 => "base64",
        }
    }
}

pub fn detect(bytes: &[u8]) -> Transport {
    if bytes.starts_with(&GZIP_MAGIC) {
        return Transport::Gzip;
    }
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | None => Transport::PlainJson,
        Some(_) => Transport::Base64,
    }
}

/// Decodes `bytes` to envelope JSON text, reporting which transport it used.
pub fn decode(bytes: &[u8]) -> Result<(String, Transport), CoreError> {
    let transport = detect(bytes);
    let text = match transport {
        Transport::Gzip => {
            let mut text = String::new();
            GzDecoder::new(bytes)
                .read_to_string(&mut text)
                .map_err(|e| transport_error(format!("failed to decompress gzip save: {e}")))?;
            text
        }
        Transport::Base64 => {
            let trimmed: Vec<u8> = bytes
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            let decoded = STANDARD
                .decode(trimmed)
                .map_err(|e| transport_error(format!("failed to decode base64 save: {e}")))?;
            String::from_utf8(decoded)
                .map_err(|e| transport_error(format!("base64 save is not UTF-8: {e}")))?
        }
        Transport::PlainJson => std::str::from_utf8(bytes)
            .map_err(|e| transport_error(format!("save is not UTF-8: {e}")))?
            .to_string(),
    };
    Ok((text, transport))
}

pub fn encode(text: &str, transport: Transport) -> Result<Vec<u8>, CoreError> {
    match transport {
        Transport::PlainJson => Ok(text.as_bytes().to_vec()),
        Transport::Base64 => Ok(STANDARD.encode(text.as_bytes()).into_bytes()),
        Transport::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(text.as_bytes())
                .map_err(|e| transport_error(format!("failed to compress save: {e}")))?;
            encoder
                .finish()
                .map_err(|e| transport_error(format!("failed to compress save: {e}")))
        }
    }
}

fn transport_error(message: String) -> CoreError {
    CoreError::new(CoreErrorCode::Transport, message)
}
