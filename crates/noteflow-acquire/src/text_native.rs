//! Plain-text acquisition: decode uploaded bytes as UTF-8.

use noteflow_core::{Error, Result};

/// Decode uploaded bytes as UTF-8, lossy for invalid sequences.
///
/// Whitespace-only input is an extraction failure, not a valid document.
pub fn extract(data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Err(Error::UnsupportedInput("missing content".to_string()));
    }

    let text = String::from_utf8_lossy(data).into_owned();
    if text.trim().is_empty() {
        return Err(Error::Extraction(
            "text file contains no readable content".to_string(),
        ));
    }

    Ok(text)
}
