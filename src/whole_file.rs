//! Whole-file comment extraction
//!
//! An alternative to the line-by-line state machine in [`crate::comments`].
//! It looks at the complete text of a file with two regular expressions:
//!
//! - Single-line comments are the text after the grammar's first single-line
//!   prefix. Consecutive lines carrying one are merged into one record, and a
//!   line without the prefix ends the run.
//! - Block comments are matched non-greedily from the start delimiter to the
//!   end delimiter, across lines. The grammar's strip symbols are replaced by
//!   spaces and whitespace is collapsed. Grammars without strip symbols have
//!   no block comments in this mode.
//!
//! Single-line records come first, then block records, each in file order.

use std::path::Path;

use regex::{Regex, RegexBuilder};

use crate::comments::CommentRecord;
use crate::error::{ExtractError, Result};
use crate::file_utils::{count_line_breaks, line_location, load_text, universal_lines};
use crate::language::{LanguageGrammar, SENTINEL};
use crate::normalize::{collapse_whitespace, word_count};

/// Compiled whole-file patterns for one grammar.
#[derive(Debug, Clone)]
pub struct WholeFileScanner {
    language: String,
    single_line: Option<Regex>,
    block: Option<Regex>,
    strip_symbols: Vec<String>,
    max_words: usize,
}

impl WholeFileScanner {
    /// Compile the patterns of `grammar`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrammar` if a delimiter does not make a valid pattern.
    pub fn new(grammar: &LanguageGrammar, max_words: usize) -> Result<Self> {
        let invalid = |err: regex::Error| ExtractError::InvalidGrammar {
            name: grammar.name().to_string(),
            reason: err.to_string(),
        };

        let single_line = match grammar.single_line_prefixes().first() {
            Some(prefix) if prefix != SENTINEL => {
                Some(Regex::new(&format!("{}(.+)", regex::escape(prefix))).map_err(invalid)?)
            }
            _ => None,
        };

        let has_block = grammar.multiline_start() != SENTINEL && !grammar.strip_symbols().is_empty();
        let block = if has_block {
            let pattern = format!(
                "{}.*?{}",
                regex::escape(grammar.multiline_start()),
                regex::escape(grammar.multiline_end())
            );
            Some(
                RegexBuilder::new(&pattern)
                    .dot_matches_new_line(true)
                    .build()
                    .map_err(invalid)?,
            )
        } else {
            None
        };

        Ok(Self {
            language: grammar.name().to_string(),
            single_line,
            block,
            strip_symbols: grammar.strip_symbols().to_vec(),
            max_words,
        })
    }

    /// Load `path` and extract its comments.
    ///
    /// See [`load_text`] for the errors this can return.
    pub fn extract_file(&self, path: &Path, max_file_size: u64) -> Result<Vec<CommentRecord>> {
        let text = load_text(path, max_file_size)?;
        Ok(self.extract(&text, path))
    }

    /// Extract the comments of a file's decoded `text`.
    ///
    /// Each record is located at the first line of its comment.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use gleaner::language::Language;
    /// use gleaner::whole_file::WholeFileScanner;
    ///
    /// let scanner = WholeFileScanner::new(&Language::C.grammar(), 100).unwrap();
    /// let records = scanner.extract("/* a\n   b */\nint x; // note\n", Path::new("a.c"));
    /// let texts: Vec<_> = records.iter().map(|r| r.line.as_str()).collect();
    /// assert_eq!(texts, ["note ", "a b"]);
    /// ```
    pub fn extract(&self, text: &str, path: &Path) -> Vec<CommentRecord> {
        let mut records = self.single_line_runs(text, path);
        records.extend(self.blocks(text, path));
        records
    }

    fn single_line_runs(&self, text: &str, path: &Path) -> Vec<CommentRecord> {
        let Some(pattern) = &self.single_line else {
            return Vec::new();
        };

        let mut records = Vec::new();
        let mut run: Option<(usize, String)> = None;
        for (index, line) in universal_lines(text).into_iter().enumerate() {
            let Some(captures) = pattern.captures(line) else {
                if let Some((start, body)) = run.take() {
                    records.extend(self.record(body, line_location(path, start)));
                }
                continue;
            };

            // A prefix with only whitespace after it neither extends nor ends a run.
            let comment = captures[1].trim();
            if comment.is_empty() {
                continue;
            }
            let (_, body) = run.get_or_insert_with(|| (index, String::new()));
            body.push_str(comment);
            body.push(' ');
        }

        if let Some((start, body)) = run {
            records.extend(self.record(body, line_location(path, start)));
        }
        records
    }

    fn blocks(&self, text: &str, path: &Path) -> Vec<CommentRecord> {
        let Some(pattern) = &self.block else {
            return Vec::new();
        };

        pattern
            .find_iter(text)
            .filter_map(|found| {
                let mut body = found.as_str().to_string();
                for symbol in &self.strip_symbols {
                    body = body.replace(symbol.as_str(), " ");
                }
                let index = count_line_breaks(&text[..found.start()]);
                self.record(collapse_whitespace(&body), line_location(path, index))
            })
            .collect()
    }

    fn record(&self, line: String, location: String) -> Option<CommentRecord> {
        if line.trim().is_empty() || word_count(&line) > self.max_words {
            return None;
        }
        Some(CommentRecord {
            line,
            location,
            language: self.language.clone(),
        })
    }
}
