//! Response-file expansion
//!
//! A response file replaces a single `@path` token with the tokens stored in
//! the file. Only the simplest form is supported: the response file must be
//! the sole argument and its text must fit on a Windows command line.

use super::tokenize::split_command_line;
use crate::error::{ClashError, ClashResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Response files must be shorter than this many characters.
pub const RESPONSE_FILE_CEILING: usize = 2047;

/// Outcome of trying to expand a response-file token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The file was read and tokenized
    Expanded { path: PathBuf, tokens: Vec<String> },
    /// The file text reached the size ceiling
    TooLarge { path: PathBuf, len: usize },
    /// The response-file token had sibling arguments
    NotSole { path: PathBuf },
}

/// Expand the response file named by `name` (the token without its `@`).
///
/// `sole` must be true when the token was the only argument of the
/// invocation. The file is always read so that an unreadable response file
/// surfaces as an error rather than a silent refusal.
pub fn expand(name: &str, working_dir: &Path, sole: bool) -> ClashResult<Expansion> {
    let path = working_dir.join(name);
    let text = fs::read(&path)
        .and_then(|bytes| decode(&bytes))
        .map_err(|source| ClashError::ResponseFile {
            path: path.clone(),
            source,
        })?;

    let len = text.chars().count();
    if len >= RESPONSE_FILE_CEILING {
        debug!("response file {} too large ({} chars)", path.display(), len);
        return Ok(Expansion::TooLarge { path, len });
    }

    if !sole {
        debug!("response file {} is not the only argument", path.display());
        return Ok(Expansion::NotSole { path });
    }

    debug!("response data [{}]", text);
    Ok(Expansion::Expanded {
        path,
        tokens: split_command_line(&text),
    })
}

/// Decode response-file bytes, honouring a UTF-8 or UTF-16 byte-order mark.
///
/// MSBuild writes its response files as UTF-16LE with a BOM. Text without a
/// BOM must be UTF-8.
fn decode(bytes: &[u8]) -> io::Result<String> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return utf16(rest, u16::from_be_bytes);
    }
    utf8(bytes)
}

fn utf8(bytes: &[u8]) -> io::Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> io::Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "odd number of bytes in UTF-16 text",
        ));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
