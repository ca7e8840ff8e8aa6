//! Gleaner - harvest source code comments into size-capped record files
//!
//! Gleaner walks a source tree, finds the files of each supported language,
//! pulls out their comments (collapsing runs of single-line comments and
//! joining block comment bodies) and writes one record per comment.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let outputs = gleaner::extract_from_directory(Path::new("src"), Path::new("out"))?;
//! for path in outputs {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), gleaner::ExtractError>(())
//! ```

pub mod comments;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod file_utils;
pub mod git;
pub mod language;
pub mod normalize;
pub mod output;
pub mod scanner;
pub mod whole_file;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::{Path, PathBuf};

pub use comments::{CommentRecord, extract_comments, extract_comments_from_file};
pub use config::{ExtractConfig, ExtractionStrategy};
pub use discovery::find_files;
pub use error::{ExtractError, Result};
pub use extract::{ExtractionSummary, Gleaner, LanguageOutcome};
pub use git::{GitSnapshot, Snapshot, SnapshotProvider};
pub use language::{GrammarRegistry, Language, LanguageGrammar};
pub use output::{OutputFormat, print_summary, print_summary_json};
pub use whole_file::WholeFileScanner;

/// Extract every built-in language from `directory` with the default
/// configuration, returning the output files written.
///
/// A language that fails turns the whole call into an `Incomplete` error,
/// which still lists the files that were written.
pub fn extract_from_directory(directory: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    Gleaner::new(ExtractConfig::default())?
        .extract_from_directory(directory, output_dir)?
        .into_outputs()
}

/// Clone `branch` of `repo_url` and extract every built-in language from it.
pub fn extract_from_repo_snapshot(repo_url: &str, branch: &str, output_dir: &Path) -> Result<Vec<PathBuf>> {
    Gleaner::new(ExtractConfig::default())?
        .extract_from_repo_snapshot(&GitSnapshot::default(), repo_url, branch, output_dir)?
        .into_outputs()
}
