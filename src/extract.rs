//! Extraction driver
//!
//! Runs discovery, comment extraction and output for each requested language.
//! Files of one language are extracted in parallel; only the append to the
//! language's output files is serialized.
//!
//! Failures are scoped. A file that cannot be read or decoded is skipped with
//! a warning. An unknown language or a failed output write ends that
//! language's pass and is recorded on its [`LanguageOutcome`]. A missing input
//! directory or an output directory that cannot be created or written to fails
//! the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;

use crate::comments::extract_comments_from_file;
use crate::config::{ExtractConfig, ExtractionStrategy};
use crate::discovery::find_files;
use crate::error::{ExtractError, Result};
use crate::git::SnapshotProvider;
use crate::language::{GrammarRegistry, LanguageGrammar};
use crate::output::{OutputBatch, ensure_writable};
use crate::whole_file::WholeFileScanner;

/// Result of extracting one language.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LanguageOutcome {
    /// Registry name of the language
    pub language: String,
    /// Output files written, in allocation order
    pub outputs: Vec<PathBuf>,
    /// Source files discovered for the language
    pub files_scanned: usize,
    /// Source files skipped because they could not be read or decoded
    pub files_skipped: usize,
    pub records_written: usize,
    /// Why the language pass ended early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LanguageOutcome {
    fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..Default::default()
        }
    }

    fn failed(language: &str, error: &ExtractError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(language)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of an extraction run, one entry per requested language.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub languages: Vec<LanguageOutcome>,
}

impl ExtractionSummary {
    /// Every output file of the run, language by language.
    pub fn output_files(&self) -> Vec<PathBuf> {
        self.languages
            .iter()
            .flat_map(|outcome| outcome.outputs.iter().cloned())
            .collect()
    }

    /// Languages whose pass ended with an error.
    pub fn failed(&self) -> impl Iterator<Item = &LanguageOutcome> {
        self.languages.iter().filter(|outcome| outcome.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn total_records(&self) -> usize {
        self.languages.iter().map(|o| o.records_written).sum()
    }

    pub fn total_files(&self) -> usize {
        self.languages.iter().map(|o| o.files_scanned).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.languages.iter().map(|o| o.files_skipped).sum()
    }

    /// The output files of a run in which every language succeeded.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` with the failed languages and the files written
    /// anyway if any language failed.
    pub fn into_outputs(self) -> Result<Vec<PathBuf>> {
        let outputs = self.output_files();
        let failed: Vec<String> = self.failed().map(|o| o.language.clone()).collect();
        if failed.is_empty() {
            Ok(outputs)
        } else {
            Err(ExtractError::Incomplete { failed, outputs })
        }
    }
}

/// Comment extractor bound to a configuration and a grammar registry.
pub struct Gleaner {
    config: ExtractConfig,
    registry: GrammarRegistry,
}

impl Gleaner {
    /// Create an extractor with the built-in grammars.
    pub fn new(config: ExtractConfig) -> Result<Self> {
        Ok(Self::with_registry(config, GrammarRegistry::builtin()?))
    }

    pub fn with_registry(config: ExtractConfig, registry: GrammarRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    /// Extract every configured language from `directory` into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if `directory` is not a readable directory or
    /// `output_dir` cannot be created, and `OutputWrite` if no file can be
    /// created in `output_dir`. Per-language failures are reported in the
    /// summary instead.
    pub fn extract_from_directory(&self, directory: &Path, output_dir: &Path) -> Result<ExtractionSummary> {
        let metadata = directory.metadata().map_err(|source| ExtractError::FileSystem {
            path: directory.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ExtractError::FileSystem {
                path: directory.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }
        fs::create_dir_all(output_dir).map_err(|source| ExtractError::FileSystem {
            path: output_dir.to_path_buf(),
            source,
        })?;
        ensure_writable(output_dir)?;

        let names: Vec<String> = if self.config.languages.is_empty() {
            self.registry.names().into_iter().map(String::from).collect()
        } else {
            self.config.languages.clone()
        };

        let pool = self.thread_pool();
        let mut summary = ExtractionSummary::default();
        for name in &names {
            let outcome = match self.registry.get(name) {
                Ok(grammar) => self.run_language(grammar, directory, output_dir, pool.as_ref()),
                Err(err) => {
                    log::error!("{}", err);
                    LanguageOutcome::failed(name, &err)
                }
            };
            summary.languages.push(outcome);
        }

        log::info!(
            "extracted {} comment(s) from {} file(s) into {} output file(s)",
            summary.total_records(),
            summary.total_files(),
            summary.output_files().len()
        );
        Ok(summary)
    }

    /// Extract a single language.
    pub fn extract_language(&self, grammar: &LanguageGrammar, directory: &Path, output_dir: &Path) -> LanguageOutcome {
        let pool = self.thread_pool();
        self.run_language(grammar, directory, output_dir, pool.as_ref())
    }

    /// Acquire a snapshot of `repo_url` at `branch` and extract from it.
    ///
    /// The snapshot is removed once extraction finishes.
    pub fn extract_from_repo_snapshot(
        &self,
        provider: &dyn SnapshotProvider,
        repo_url: &str,
        branch: &str,
        output_dir: &Path,
    ) -> Result<ExtractionSummary> {
        let snapshot = provider.acquire(repo_url, branch)?;
        log::info!("extracting {} ({}) from {}", repo_url, branch, snapshot.path().display());
        self.extract_from_directory(snapshot.path(), output_dir)
    }

    /// Dedicated pool when a worker count is configured; `None` means the
    /// global rayon pool.
    fn thread_pool(&self) -> Option<ThreadPool> {
        if self.config.parallel_workers == 0 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel_workers)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                log::warn!("falling back to the global thread pool: {}", err);
                None
            }
        }
    }

    fn run_language(
        &self,
        grammar: &LanguageGrammar,
        directory: &Path,
        output_dir: &Path,
        pool: Option<&ThreadPool>,
    ) -> LanguageOutcome {
        let files = match find_files(&grammar.discovery_pattern(), directory, &self.config.ignore_patterns) {
            Ok(files) => files,
            Err(err) => {
                log::error!("{}: {}", grammar.name(), err);
                return LanguageOutcome::failed(grammar.name(), &err);
            }
        };

        let mut outcome = LanguageOutcome::new(grammar.name());
        outcome.files_scanned = files.len();
        if files.is_empty() {
            log::debug!("{}: no source files", grammar.name());
            return outcome;
        }

        let scanner = match self.config.strategy {
            ExtractionStrategy::LineScan => None,
            ExtractionStrategy::WholeFile => {
                match WholeFileScanner::new(grammar, self.config.max_comment_words) {
                    Ok(scanner) => Some(scanner),
                    Err(err) => {
                        log::error!("{}: {}", grammar.name(), err);
                        outcome.error = Some(err.to_string());
                        return outcome;
                    }
                }
            }
        };

        let batch = match OutputBatch::create(
            output_dir,
            &grammar.file_stem(),
            self.config.output_format,
            self.config.rows_per_file,
        ) {
            Ok(batch) => Mutex::new(batch),
            Err(err) => {
                log::error!("{}: {}", grammar.name(), err);
                outcome.error = Some(err.to_string());
                return outcome;
            }
        };
        let skipped = AtomicUsize::new(0);

        let process = || {
            files
                .par_iter()
                .try_for_each(|path| {
                    self.process_file(path, grammar, scanner.as_ref(), &batch, &skipped)
                })
        };
        let result = match pool {
            Some(pool) => pool.install(process),
            None => process(),
        };

        let batch = batch.into_inner().unwrap_or_else(PoisonError::into_inner);
        outcome.files_skipped = skipped.into_inner();
        outcome.records_written = batch.records_written();
        outcome.outputs = batch.into_paths();

        if let Err(err) = result {
            log::error!("{}: {}", grammar.name(), err);
            outcome.error = Some(err.to_string());
        }

        log::info!(
            "{}: {} record(s) from {} file(s), {} skipped",
            grammar.name(),
            outcome.records_written,
            outcome.files_scanned,
            outcome.files_skipped
        );
        outcome
    }

    /// Extract one file and append its records.
    ///
    /// Only output errors are returned; unreadable files are counted and
    /// skipped.
    fn process_file(
        &self,
        path: &Path,
        grammar: &LanguageGrammar,
        scanner: Option<&WholeFileScanner>,
        batch: &Mutex<OutputBatch>,
        skipped: &AtomicUsize,
    ) -> Result<()> {
        let extracted = match scanner {
            Some(scanner) => scanner.extract_file(path, self.config.max_file_size),
            None => extract_comments_from_file(
                path,
                grammar,
                self.config.max_file_size,
                self.config.max_comment_words,
            ),
        };
        let records = match extracted {
            Ok(records) => records,
            Err(err) => {
                match err {
                    ExtractError::FileTooLarge { .. } => log::debug!("skipping {}", err),
                    _ => log::warn!("skipping file: {}", err),
                }
                skipped.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
        };

        if records.is_empty() {
            return Ok(());
        }

        let mut batch = batch.lock().unwrap_or_else(PoisonError::into_inner);
        batch.append(&records)
    }
}
