//! Record writers
//!
//! A sink owns one open output file. Every append is flushed before it
//! returns, so a record is either on disk in full or reported as failed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::comments::CommentRecord;

/// Column names of an output record, in file order.
pub const RECORD_FIELDS: [&str; 3] = ["line", "location", "language"];

/// Destination for comment records.
pub trait RecordSink: Send {
    /// Write `records` and flush them.
    fn append(&mut self, records: &[CommentRecord]) -> io::Result<()>;

    /// Path of the file being written.
    fn path(&self) -> &Path;
}

/// CSV output. The header row is written when the sink is opened.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn new(path: PathBuf, file: File) -> io::Result<Self> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(RECORD_FIELDS)?;
        writer.flush()?;
        Ok(Self { path, writer })
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, records: &[CommentRecord]) -> io::Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// JSON Lines output.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: BufWriter::new(file),
        }
    }
}

impl RecordSink for JsonLinesSink {
    fn append(&mut self, records: &[CommentRecord]) -> io::Result<()> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Open a sink of the given format over an already created file.
pub fn open_sink(format: OutputFormat, path: PathBuf, file: File) -> io::Result<Box<dyn RecordSink>> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvSink::new(path, file)?),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(path, file)),
    })
}
