//! Plain-text document loading.
//!
//! Binary formats are extracted upstream; this only reads text that is
//! already on disk.
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Read a document, decoding invalid UTF-8 lossily instead of failing.
pub fn read_document(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!(path = %path.display(), "document is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
        }
        Err(err) => Err(err.into()),
    }
}

/// True when the text holds at least one non-whitespace character.
pub fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}
