//! Comment extraction state machine
//!
//! This module turns the lines of one source file into logical comments.
//!
//! # How it works
//!
//! Comment boundaries are only locally decidable without a real lexer, so the
//! extractor walks the file with a one-line lookahead:
//!
//! - A run of consecutive single-line comments collapses into one record,
//!   emitted on the last line of the run.
//! - Block comments are tracked by XOR-ing each line's delimiter toggle into
//!   a persistent flag and accumulating the body until the flag drops.
//! - A line that is neither part of a run nor inside a block may still carry a
//!   standalone trailing comment.
//!
//! When a run is still open on the line that would close a block comment,
//! the run wins and the block stays open.

use std::mem;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::file_utils::{SourceLine, load_lines};
use crate::language::LanguageGrammar;
use crate::normalize::{
    CommentKind, LONG_COMMENT_WORDS, normalize_comment, strip_symbols, trim_leading_spaces,
    word_count,
};
use crate::scanner::{find_enclosed_text, triggers_multiline};

/// A normalized comment ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    /// Comment text without delimiters or leading whitespace
    pub line: String,
    /// `<path>: <line number>` of the line the comment was emitted on
    pub location: String,
    /// Registry name of the language
    pub language: String,
}

/// Per-file scanning state. Lives for one call to [`extract_comments`].
#[derive(Debug, Default)]
struct ScanState {
    multiline_active: bool,
    multiline_body: String,
    pending_run: String,
    next_line_is_continuation: bool,
}

/// A comment found on the current line, before normalization.
struct RawComment<'a> {
    text: String,
    location: &'a str,
    kind: CommentKind,
}

/// Single-line comment text of `text`, stripped and left-trimmed.
fn line_comment(text: &str, grammar: &LanguageGrammar) -> String {
    let enclosed = find_enclosed_text(text, grammar.single_line_prefixes());
    trim_leading_spaces(&strip_symbols(&enclosed, grammar)).to_string()
}

/// Whole-line content of `text` with delimiter characters removed.
fn block_line(text: &str, grammar: &LanguageGrammar) -> String {
    trim_leading_spaces(&strip_symbols(text, grammar)).to_string()
}

fn finish(
    raw: RawComment<'_>,
    grammar: &LanguageGrammar,
    max_words: usize,
) -> Option<CommentRecord> {
    let line = normalize_comment(&raw.text, grammar, raw.kind, max_words)?;

    let words = word_count(&line);
    if words >= LONG_COMMENT_WORDS {
        log::debug!("long comment ({} words) at {}", words, raw.location);
    }

    Some(CommentRecord {
        line,
        location: raw.location.to_string(),
        language: grammar.name().to_string(),
    })
}

/// Extract the logical comments of one file's lines.
///
/// Comments that are empty after normalization or longer than `max_words`
/// words are dropped.
///
/// # Examples
///
/// ```
/// use gleaner::comments::extract_comments;
/// use gleaner::file_utils::SourceLine;
/// use gleaner::language::Language;
///
/// let lines = vec![
///     SourceLine::new("int x = 1; // first", "a.c: 1"),
///     SourceLine::new("int y = 2; // second", "a.c: 2"),
///     SourceLine::new("int z = 3;", "a.c: 3"),
/// ];
/// let records = extract_comments(&lines, &Language::C.grammar(), 100);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].line, "first second");
/// assert_eq!(records[0].location, "a.c: 2");
/// ```
pub fn extract_comments(
    lines: &[SourceLine],
    grammar: &LanguageGrammar,
    max_words: usize,
) -> Vec<CommentRecord> {
    let Some(first) = lines.first() else {
        return Vec::new();
    };

    let mut state = ScanState::default();
    let mut records = Vec::new();
    let mut next_single = line_comment(&first.text, grammar);

    for (index, line) in lines.iter().enumerate() {
        let mut found: Option<RawComment<'_>> = None;

        // Lookahead: decide whether the current line extends or ends a run.
        if let Some(next) = lines.get(index + 1) {
            let current_single = mem::replace(&mut next_single, line_comment(&next.text, grammar));

            if !next_single.is_empty() {
                state.next_line_is_continuation = true;
                state.pending_run.push_str(&current_single);
                state.pending_run.push(' ');
            } else if state.next_line_is_continuation {
                state.next_line_is_continuation = false;
                state.pending_run.push_str(&current_single);
                found = Some(RawComment {
                    text: mem::take(&mut state.pending_run),
                    location: &line.location,
                    kind: CommentKind::Run,
                });
            }
        }

        if triggers_multiline(&line.text, grammar.multiline_start(), grammar.multiline_end()) {
            if !state.multiline_active {
                state.multiline_active = true;
            } else if !state.next_line_is_continuation {
                state.multiline_body.push_str(&block_line(&line.text, grammar));
                // Only one comment per line: a block closing here replaces a
                // run that closed on the same line.
                found = Some(RawComment {
                    text: mem::take(&mut state.multiline_body),
                    location: &line.location,
                    kind: CommentKind::Block,
                });
                state.multiline_active = false;
            }
        }

        if state.multiline_active {
            state.multiline_body.push_str(&block_line(&line.text, grammar));
            state.multiline_body.push(' ');
        } else if found.is_none() && !state.next_line_is_continuation {
            found = Some(RawComment {
                text: find_enclosed_text(&line.text, grammar.single_line_prefixes()),
                location: &line.location,
                kind: CommentKind::Line,
            });
        }

        if let Some(raw) = found {
            records.extend(finish(raw, grammar, max_words));
        }
    }

    // A run reaching the end of the file is flushed on the last line.
    if state.next_line_is_continuation {
        if let Some(last) = lines.last() {
            state.pending_run.push_str(&next_single);
            state.pending_run.push(' ');
            let raw = RawComment {
                text: mem::take(&mut state.pending_run),
                location: &last.location,
                kind: CommentKind::Run,
            };
            records.extend(finish(raw, grammar, max_words));
        }
    }

    records
}

/// Load `path` and extract its comments.
///
/// See [`load_lines`] for the errors this can return.
pub fn extract_comments_from_file(
    path: &Path,
    grammar: &LanguageGrammar,
    max_file_size: u64,
    max_words: usize,
) -> Result<Vec<CommentRecord>> {
    let lines = load_lines(path, max_file_size)?;
    Ok(extract_comments(&lines, grammar, max_words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::normalize::DEFAULT_MAX_COMMENT_WORDS;

    fn source(texts: &[&str]) -> Vec<SourceLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| SourceLine::new(*text, format!("test: {}", i + 1)))
            .collect()
    }

    fn extract(lang: Language, texts: &[&str]) -> Vec<CommentRecord> {
        extract_comments(&source(texts), &lang.grammar(), DEFAULT_MAX_COMMENT_WORDS)
    }

    fn texts(records: &[CommentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.line.as_str()).collect()
    }

    #[test]
    fn test_c_single_line_run() {
        let records = extract(
            Language::C,
            &["int x = 1; // first", "int y = 2; // second", "int z = 3;"],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, "first second");
        assert_eq!(records[0].location, "test: 2");
        assert_eq!(records[0].language, "c");
    }

    #[test]
    fn test_python_symmetric_block() {
        let records = extract(Language::Python, &["\"\"\"", "hello world", "\"\"\""]);
        assert_eq!(texts(&records), ["hello world"]);
        assert_eq!(records[0].location, "test: 3");
    }

    #[test]
    fn test_c_directional_block() {
        let records = extract(Language::C, &["/* a", "b */"]);
        assert_eq!(texts(&records), ["a b"]);
        assert_eq!(records[0].location, "test: 2");
    }

    #[test]
    fn test_empty_comment_rejected() {
        assert!(extract(Language::C, &["//   "]).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract(Language::C, &[]).is_empty());
    }

    #[test]
    fn test_standalone_line_comment() {
        let records = extract(Language::Shell, &["echo hi", "ls # list files", "pwd"]);
        assert_eq!(texts(&records), ["list files"]);
        assert_eq!(records[0].location, "test: 2");
    }

    #[test]
    fn test_run_flushed_at_end_of_file() {
        // The flushed run keeps its separator space, unlike a run closed by
        // a code line.
        let records = extract(Language::Shell, &["echo hi", "# one", "# two"]);
        assert_eq!(texts(&records), ["one two "]);
        assert_eq!(records[0].location, "test: 3");
    }

    #[test]
    fn test_line_comment_keeps_trailing_whitespace() {
        let records = extract(Language::Shell, &["ls # list files  ", "pwd"]);
        assert_eq!(texts(&records), ["list files  "]);
    }

    #[test]
    fn test_separate_runs() {
        let records = extract(
            Language::Python,
            &["# a", "# b", "x = 1", "# c", "# d", "y = 2"],
        );
        assert_eq!(texts(&records), ["a b", "c d"]);
        assert_eq!(records[0].location, "test: 2");
        assert_eq!(records[1].location, "test: 5");
    }

    #[test]
    fn test_single_line_block_comment() {
        // Opens and closes on one line: no block state, but the block opener
        // doubles as a single-line prefix for C.
        let records = extract(Language::C, &["int a; /* note */", "int b;"]);
        assert_eq!(texts(&records), ["note "]);
    }

    #[test]
    fn test_java_block_with_stars() {
        let records = extract(
            Language::Java,
            &["/**", " * Adds numbers.", " * Returns the sum.", " */", "int add();"],
        );
        assert_eq!(texts(&records), ["Adds numbers. Returns the sum."]);
        assert_eq!(records[0].location, "test: 4");
    }

    #[test]
    fn test_html_block() {
        let records = extract(Language::Html, &["<!-- top", "banner -->", "<p>hi</p>"]);
        assert_eq!(texts(&records), ["top banner"]);
    }

    #[test]
    fn test_html_has_no_line_comments() {
        assert!(extract(Language::Html, &["<p>// not a comment</p>"]).is_empty());
    }

    #[test]
    fn test_ruby_begin_end() {
        let records = extract(Language::Ruby, &["=begin", "docs here", "=end", "puts 1"]);
        // Stripping removes every character of "=begin"/"=end".
        assert_eq!(texts(&records), ["ocs hr"]);
    }

    #[test]
    fn test_batch_double_colon() {
        let records = extract(Language::BatchScript, &[":: set up", "set X=1"]);
        assert_eq!(texts(&records), ["set up"]);
    }

    #[test]
    fn test_batch_keeps_colons_inside_text() {
        let records = extract(
            Language::BatchScript,
            &[":: starts at 10:30, see http://x", "call run.bat"],
        );
        assert_eq!(texts(&records), ["starts at 10:30, see http://x"]);
    }

    #[test]
    fn test_word_limit_drops_long_comment() {
        let long = format!("# {}", vec!["word"; 101].join(" "));
        let records = extract(Language::Shell, &["echo", &long, "echo"]);
        assert!(records.is_empty());

        let ok = format!("# {}", vec!["word"; 100].join(" "));
        let records = extract(Language::Shell, &["echo", &ok, "echo"]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_custom_word_limit() {
        let lines = source(&["# one two three"]);
        let grammar = Language::Shell.grammar();
        assert!(extract_comments(&lines, &grammar, 2).is_empty());
        assert_eq!(extract_comments(&lines, &grammar, 3).len(), 1);
    }

    #[test]
    fn test_run_takes_precedence_over_block_close() {
        // Line 2 would close the block, but the run continuing onto line 3
        // takes precedence: the block stays open and only the run is emitted.
        let records = extract(
            Language::Python,
            &["\"\"\" doc", "end \"\"\" # a", "# b", "x = 1"],
        );
        assert_eq!(texts(&records), ["doc a b"]);
        assert_eq!(records[0].location, "test: 3");
    }

    #[test]
    fn test_no_leading_whitespace_in_records() {
        let records = extract(
            Language::Python,
            &["    # indented", "    #   deeper", "pass", "\"\"\"", "   body", "\"\"\""],
        );
        for record in &records {
            assert!(!record.line.starts_with(' '), "got {:?}", record.line);
        }
        assert_eq!(texts(&records), ["indented deeper", "body"]);
    }

    #[test]
    fn test_extract_comments_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("main.js");
        std::fs::write(&path, "// entry\n// point\nmain();\n").unwrap();

        let records =
            extract_comments_from_file(&path, &Language::JavaScript.grammar(), 0, 100).unwrap();
        assert_eq!(texts(&records), ["entry point"]);
        assert_eq!(records[0].location, format!("{}: 2", path.display()));
    }
}
