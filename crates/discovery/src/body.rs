use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::{header_end, HeaderError};

/// Reasons a skill body cannot be produced at load time.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The defining file is gone or unreadable.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Defining file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The header block is no longer closed.
    #[error("metadata header in {} is not terminated", path.display())]
    Unterminated {
        /// Defining file.
        path: PathBuf,
    },
    /// Nothing follows the header.
    #[error("{} has no content after its metadata header", path.display())]
    Empty {
        /// Defining file.
        path: PathBuf,
    },
}

/// Returns `content` with its header block removed, along with the blank
/// lines separating it from the body.
///
/// Content without a header is returned as-is.
pub fn strip_header(content: &str) -> Result<&str, HeaderError> {
    let body = match header_end(content)? {
        Some(end) => &content[end..],
        None => content,
    };
    Ok(body.trim_start_matches(['\r', '\n']))
}

/// Reads the body of the skill defined at `path`.
///
/// Always re-reads from disk. An empty body is reported as a failure.
pub fn extract_body(path: &Path) -> Result<String, ExtractError> {
    let content = fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let body = strip_header(&content).map_err(|_| ExtractError::Unterminated {
        path: path.to_path_buf(),
    })?;
    if body.trim().is_empty() {
        return Err(ExtractError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(body.to_string())
}
