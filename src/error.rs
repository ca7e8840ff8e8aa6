//! Error types for comment extraction.
//!
//! Errors fall into three scopes. Per-file errors (`Decode`, `FileTooLarge`)
//! skip one source file. Per-language errors (`GrammarNotFound`, `OutputWrite`)
//! end one language pass. Everything else surfaces to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for gleaner operations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The file could not be decoded with the detected or the fallback encoding.
    #[error("failed to decode {path}: {reason}")]
    Decode {
        /// The file that failed to decode.
        path: PathBuf,
        /// What went wrong while decoding.
        reason: String,
    },

    /// The file exceeds the configured size cap.
    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// No grammar is registered under this language name.
    #[error("unknown language: {0}")]
    GrammarNotFound(String),

    /// A grammar failed validation while building the registry.
    #[error("invalid grammar '{name}': {reason}")]
    InvalidGrammar { name: String, reason: String },

    /// A directory or file could not be accessed.
    #[error("cannot access {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing an output file failed.
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The repository snapshot could not be acquired.
    #[error("failed to fetch {url}: {message}")]
    Snapshot { url: String, message: String },

    /// Some languages failed. `outputs` lists the files that were written
    /// before and besides the failures.
    #[error("extraction failed for {}", .failed.join(", "))]
    Incomplete {
        failed: Vec<String>,
        outputs: Vec<PathBuf>,
    },
}

impl ExtractError {
    /// Whether this error only affects a single source file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            ExtractError::Decode { .. } | ExtractError::FileTooLarge { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
