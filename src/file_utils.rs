//! Source file loading
//!
//! This module reads a source file into numbered lines, guessing its text
//! encoding first. Files that cannot be decoded are reported as errors so the
//! caller can warn and move on; they are never mistaken for files without
//! comments.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

use crate::error::{ExtractError, Result};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("LINE_BREAK regex is invalid"));

/// Default maximum file size for extraction (1MB).
/// Larger files are skipped to prevent excessive memory usage.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// One line of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Line text without its line terminator
    pub text: String,
    /// `<path>: <1-based line number>`
    pub location: String,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: location.into(),
        }
    }
}

/// Build the location string for a 0-based line index.
pub fn line_location(path: &Path, index: usize) -> String {
    format!("{}: {}", path.display(), index + 1)
}

/// Lines of `text` without their terminators. `\n`, `\r\n` and a lone `\r`
/// all end a line; a terminator at the very end does not start a new one.
pub fn universal_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK.split(text).collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

/// Number of line terminators in `text`, which is also the 0-based index of
/// the line its end falls on.
pub fn count_line_breaks(text: &str) -> usize {
    LINE_BREAK.find_iter(text).count()
}

/// Split decoded text into lines attributed to `path`.
pub fn split_lines(text: &str, path: &Path) -> Vec<SourceLine> {
    universal_lines(text)
        .into_iter()
        .enumerate()
        .map(|(index, line)| SourceLine::new(line, line_location(path, index)))
        .collect()
}

/// Read a source file into lines.
///
/// A `max_file_size` of 0 disables the size check.
///
/// # Errors
///
/// - `FileSystem` if the file cannot be read
/// - `FileTooLarge` if it is over `max_file_size` bytes
/// - `Decode` if neither the detected encoding nor UTF-8 decodes it
pub fn load_lines(path: &Path, max_file_size: u64) -> Result<Vec<SourceLine>> {
    let text = load_text(path, max_file_size)?;
    Ok(split_lines(&text, path))
}

/// Read and decode a whole source file.
///
/// Fails the same ways as [`load_lines`].
pub fn load_text(path: &Path, max_file_size: u64) -> Result<String> {
    let io_error = |source| ExtractError::FileSystem {
        path: path.to_path_buf(),
        source,
    };

    let size = fs::metadata(path).map_err(io_error)?.len();
    if max_file_size > 0 && size > max_file_size {
        return Err(ExtractError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_file_size,
        });
    }

    let bytes = fs::read(path).map_err(io_error)?;
    decode_bytes(&bytes).map_err(|reason| ExtractError::Decode {
        path: path.to_path_buf(),
        reason,
    })
}

/// Decode raw file contents.
///
/// A byte-order mark decides the encoding when present; otherwise the
/// encoding is guessed from the content. Malformed input is retried as UTF-8
/// before giving up.
pub fn decode_bytes(bytes: &[u8]) -> std::result::Result<String, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
        None => (detect_encoding(bytes), bytes),
    };

    if let Some(text) = decode_strict(body, encoding) {
        return Ok(text.into_owned());
    }

    log::debug!(
        "content is not valid {}, retrying as UTF-8",
        encoding.name()
    );
    if encoding != UTF_8 {
        if let Some(text) = decode_strict(body, UTF_8) {
            return Ok(text.into_owned());
        }
    }

    Err(format!("not valid {} or UTF-8", encoding.name()))
}

/// Guess the encoding of `bytes` from their content.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_lines_success() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.c");
        fs::write(&file_path, "int x; // one\nint y;\n").unwrap();

        let lines = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "int x; // one");
        assert_eq!(lines[1].text, "int y;");
        assert_eq!(lines[0].location, format!("{}: 1", file_path.display()));
        assert_eq!(lines[1].location, format!("{}: 2", file_path.display()));
    }

    #[test]
    fn test_load_lines_crlf() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("win.bat");
        fs::write(&file_path, ":: first\r\n:: second\r\n").unwrap();

        let lines = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE).unwrap();
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, [":: first", ":: second"]);
    }

    #[test]
    fn test_load_lines_lone_carriage_return() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("classic.sh");
        fs::write(&file_path, "# one\r# two\r\recho hi\r").unwrap();

        let lines = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE).unwrap();
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["# one", "# two", "", "echo hi"]);
        assert_eq!(lines[3].location, format!("{}: 4", file_path.display()));
    }

    #[test]
    fn test_universal_lines_mixed_terminators() {
        assert_eq!(universal_lines("a\nb\r\nc\rd"), ["a", "b", "c", "d"]);
        assert_eq!(universal_lines("a\n\n"), ["a", ""]);
        assert!(universal_lines("").is_empty());
        assert_eq!(count_line_breaks("a\r\nb\rc\n"), 3);
    }

    #[test]
    fn test_load_lines_nonexistent() {
        let result = load_lines(Path::new("/nonexistent/file.c"), DEFAULT_MAX_FILE_SIZE);
        assert!(matches!(result, Err(ExtractError::FileSystem { .. })));
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("empty.py");
        fs::write(&file_path, "").unwrap();

        let lines = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE).unwrap();
        assert!(lines.is_empty(), "empty file should have no lines");
    }

    #[test]
    fn test_file_at_max_size_boundary() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("boundary.c");
        let limit = 50_000u64;

        // File exactly at limit should be read (implementation uses > not >=)
        fs::write(&file_path, "x".repeat(limit as usize)).unwrap();
        assert!(load_lines(&file_path, limit).is_ok());

        // File one byte over should be skipped
        fs::write(&file_path, "x".repeat(limit as usize + 1)).unwrap();
        let result = load_lines(&file_path, limit);
        assert!(
            matches!(result, Err(ExtractError::FileTooLarge { size, .. }) if size == limit + 1),
            "file over max size should be rejected"
        );
    }

    #[test]
    fn test_zero_limit_disables_size_check() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("big.c");
        fs::write(&file_path, "x".repeat(10_000)).unwrap();
        assert!(load_lines(&file_path, 0).is_ok());
    }

    #[test]
    fn test_utf8_with_bom() {
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice(b"# hello");
        let text = decode_bytes(&content).unwrap();
        assert_eq!(text, "# hello", "BOM should be removed");
    }

    #[test]
    fn test_utf16_bom_is_honoured() {
        // UTF-16LE BOM followed by U+0100
        let text = decode_bytes(&[0xFF, 0xFE, 0x00, 0x01]).unwrap();
        assert_eq!(text, "\u{0100}");
    }

    #[test]
    fn test_legacy_single_byte_encoding() {
        let text = decode_bytes(b"# caf\xe9 cr\xe8me br\xfbl\xe9e \xe0 la fran\xe7aise\n").unwrap();
        assert!(text.starts_with("# caf"));
        assert!(!text.contains('\u{FFFD}'), "decoding must not use replacement");
    }

    #[test]
    fn test_undecodable_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("broken.py");
        // UTF-16LE BOM, then an unpaired surrogate and a dangling byte. The
        // body is not valid UTF-8 either.
        fs::write(&file_path, [0xFF, 0xFE, 0x00, 0xD8, 0xFF]).unwrap();

        let result = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE);
        match result {
            Err(ExtractError::Decode { path, .. }) => assert_eq!(path, file_path),
            other => panic!("expected decode failure, got {:?}", other),
        }
    }

    #[test]
    fn test_file_with_special_characters() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("special.js");
        let content = "// Hello 世界 🦀\nfunction main() {\n\tconsole.log(\"Hello\");\n}";
        fs::write(&file_path, content).unwrap();

        let lines = load_lines(&file_path, DEFAULT_MAX_FILE_SIZE).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "// Hello 世界 🦀");
    }

    #[test]
    fn test_line_location_is_one_based() {
        let path = PathBuf::from("src/main.c");
        assert_eq!(line_location(&path, 0), "src/main.c: 1");
        assert_eq!(line_location(&path, 41), "src/main.c: 42");
    }
}
