//! Output files for extracted comments
//!
//! # Module Structure
//!
//! - `naming` - Allocation of sequentially numbered output files
//! - `sink` - Record writers for each output format
//! - `batch` - Rotating writer that caps the rows per file
//! - `summary` - Console and JSON reports of an extraction run

mod batch;
mod naming;
mod sink;
mod summary;

pub use batch::{DEFAULT_ROWS_PER_FILE, OutputBatch};
pub use naming::{allocate_output_file, ensure_writable, output_file_name};
pub use sink::{CsvSink, JsonLinesSink, RECORD_FIELDS, RecordSink, open_sink};
pub use summary::{print_summary, print_summary_json, write_summary};

/// On-disk format of output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a `line,location,language` header
    #[default]
    Csv,
    /// One JSON object per line, no header
    JsonLines,
}

impl OutputFormat {
    /// File extension of output files in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::JsonLines => "jsonl",
        }
    }
}
