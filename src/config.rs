//! Configuration for extraction runs

use crate::file_utils::DEFAULT_MAX_FILE_SIZE;
use crate::normalize::DEFAULT_MAX_COMMENT_WORDS;
use crate::output::{DEFAULT_ROWS_PER_FILE, OutputFormat};

/// How comments are found in a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Line-by-line state machine with one line of lookahead
    #[default]
    LineScan,
    /// Regular expressions over the whole file text
    WholeFile,
}

/// Configuration for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Language names to extract. Empty means every registered language.
    pub languages: Vec<String>,
    /// Number of parallel workers for file extraction.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
    /// Files over this many bytes are skipped. 0 disables the cap.
    pub max_file_size: u64,
    /// Glob patterns for files and directories to leave out of discovery
    pub ignore_patterns: Vec<String>,
    /// Rows per output file before rotating to the next one
    pub rows_per_file: usize,
    /// Comments with more words than this are dropped
    pub max_comment_words: usize,
    pub output_format: OutputFormat,
    pub strategy: ExtractionStrategy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            parallel_workers: 0,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            ignore_patterns: Vec::new(),
            rows_per_file: DEFAULT_ROWS_PER_FILE,
            max_comment_words: DEFAULT_MAX_COMMENT_WORDS,
            output_format: OutputFormat::Csv,
            strategy: ExtractionStrategy::LineScan,
        }
    }
}
