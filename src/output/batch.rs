//! Rotating output writer

use std::path::{Path, PathBuf};

use super::naming::allocate_output_file;
use super::sink::{RecordSink, open_sink};
use super::OutputFormat;
use crate::comments::CommentRecord;
use crate::error::{ExtractError, Result};

/// Rows written to one output file before the next one is started.
pub const DEFAULT_ROWS_PER_FILE: usize = 50_000;

/// All output files of one language.
///
/// Records go to the current file. Once an append pushes the file past
/// `rows_per_file` rows, the next file is allocated and the count restarts,
/// so a file may end up somewhat over the cap but never splits a batch.
pub struct OutputBatch {
    dir: PathBuf,
    stem: String,
    format: OutputFormat,
    rows_per_file: usize,
    sink: Box<dyn RecordSink>,
    rows_in_current: usize,
    records_written: usize,
    paths: Vec<PathBuf>,
}

impl OutputBatch {
    /// Allocate the first output file for `stem` in `dir`.
    pub fn create(dir: &Path, stem: &str, format: OutputFormat, rows_per_file: usize) -> Result<Self> {
        let sink = Self::open(dir, stem, format)?;
        let paths = vec![sink.path().to_path_buf()];
        Ok(Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            format,
            rows_per_file,
            sink,
            rows_in_current: 0,
            records_written: 0,
            paths,
        })
    }

    fn open(dir: &Path, stem: &str, format: OutputFormat) -> Result<Box<dyn RecordSink>> {
        let (path, file) = allocate_output_file(dir, stem, format)?;
        open_sink(format, path.clone(), file).map_err(|source| ExtractError::OutputWrite { path, source })
    }

    /// Write one file's records, rotating afterwards if the cap was passed.
    pub fn append(&mut self, records: &[CommentRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.sink
            .append(records)
            .map_err(|source| ExtractError::OutputWrite {
                path: self.sink.path().to_path_buf(),
                source,
            })?;
        self.rows_in_current += records.len();
        self.records_written += records.len();

        if self.rows_in_current > self.rows_per_file {
            log::debug!(
                "{} holds {} rows, rotating",
                self.sink.path().display(),
                self.rows_in_current
            );
            self.sink = Self::open(&self.dir, &self.stem, self.format)?;
            self.paths.push(self.sink.path().to_path_buf());
            self.rows_in_current = 0;
        }
        Ok(())
    }

    /// Every file allocated so far, in allocation order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }

    /// Total records appended across all files.
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn records(count: usize) -> Vec<CommentRecord> {
        (0..count)
            .map(|i| CommentRecord {
                line: format!("comment {}", i),
                location: format!("a.py: {}", i + 1),
                language: "python".to_string(),
            })
            .collect()
    }

    fn data_rows(path: &Path) -> usize {
        let mut reader = csv::Reader::from_path(path).unwrap();
        assert_eq!(reader.headers().unwrap(), vec!["line", "location", "language"]);
        reader.records().count()
    }

    #[test]
    fn test_first_file_allocated_on_create() {
        let dir = TempDir::new().unwrap();
        let batch = OutputBatch::create(dir.path(), "python", OutputFormat::Csv, 10).unwrap();
        assert_eq!(batch.paths(), [dir.path().join("comments_python_0.csv")]);
        assert_eq!(data_rows(&batch.paths()[0]), 0);
    }

    #[test]
    fn test_rotation_after_passing_cap() {
        let dir = TempDir::new().unwrap();
        let mut batch = OutputBatch::create(dir.path(), "python", OutputFormat::Csv, 3).unwrap();

        batch.append(&records(2)).unwrap();
        batch.append(&records(1)).unwrap();
        assert_eq!(batch.paths().len(), 1, "exactly at the cap does not rotate");

        batch.append(&records(2)).unwrap();
        assert_eq!(batch.paths().len(), 2);
        batch.append(&records(1)).unwrap();

        assert_eq!(batch.records_written(), 6);
        let paths = batch.into_paths();
        assert_eq!(data_rows(&paths[0]), 5);
        assert_eq!(data_rows(&paths[1]), 1);
    }

    #[test]
    fn test_default_cap_yields_two_files_for_one_record_over() {
        let dir = TempDir::new().unwrap();
        let mut batch =
            OutputBatch::create(dir.path(), "c", OutputFormat::Csv, DEFAULT_ROWS_PER_FILE).unwrap();

        let all = records(DEFAULT_ROWS_PER_FILE + 1);
        for chunk in all.chunks(1_000) {
            batch.append(chunk).unwrap();
        }

        let paths = batch.into_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(data_rows(&paths[0]), DEFAULT_ROWS_PER_FILE + 1);
        assert_eq!(data_rows(&paths[1]), 0);
    }

    #[test]
    fn test_empty_append_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut batch = OutputBatch::create(dir.path(), "c", OutputFormat::Csv, 0).unwrap();
        batch.append(&[]).unwrap();
        assert_eq!(batch.paths().len(), 1);
        assert_eq!(batch.records_written(), 0);
    }

    #[test]
    fn test_json_lines_batch() {
        let dir = TempDir::new().unwrap();
        let mut batch = OutputBatch::create(dir.path(), "c", OutputFormat::JsonLines, 10).unwrap();
        batch.append(&records(3)).unwrap();

        let content = fs::read_to_string(&batch.paths()[0]).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(batch.paths()[0].to_string_lossy().ends_with("comments_c_0.jsonl"));
    }
}
