//! Output file naming and allocation

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::error::{ExtractError, Result};

/// Name of the `index`-th output file for `stem`.
pub fn output_file_name(stem: &str, index: usize, format: OutputFormat) -> String {
    format!("comments_{}_{}.{}", stem, index, format.extension())
}

/// Create the first unused output file for `stem` in `dir`.
///
/// Files are tried as `comments_<stem>_0`, `comments_<stem>_1`, ... and
/// created with create-new semantics, so two allocators never end up sharing
/// a file.
///
/// # Errors
///
/// Returns `OutputWrite` if a candidate file cannot be created for any reason
/// other than already existing.
pub fn allocate_output_file(dir: &Path, stem: &str, format: OutputFormat) -> Result<(PathBuf, File)> {
    let mut index = 0;
    loop {
        let path = dir.join(output_file_name(stem, index, format));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                log::info!("allocated output file {}", path.display());
                return Ok((path, file));
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => index += 1,
            Err(source) => return Err(ExtractError::OutputWrite { path, source }),
        }
    }
}

/// Check that files can be created in `dir` by creating and removing a
/// scratch file.
///
/// # Errors
///
/// Returns `OutputWrite` naming `dir` if the scratch file cannot be created.
pub fn ensure_writable(dir: &Path) -> Result<()> {
    tempfile::Builder::new()
        .prefix(".gleaner-write-check")
        .tempfile_in(dir)
        .map(drop)
        .map_err(|source| ExtractError::OutputWrite {
            path: dir.to_path_buf(),
            source,
        })
}
