//! Comment text normalization
//!
//! Removes delimiter characters and leading spaces from raw comment text and
//! decides whether the result is worth keeping.

use std::sync::LazyLock;

use regex::Regex;

use crate::language::LanguageGrammar;

/// Default cap on the number of words in an accepted comment.
pub const DEFAULT_MAX_COMMENT_WORDS: usize = 100;

/// Comments at or above this many words are logged while extracting.
pub const LONG_COMMENT_WORDS: usize = 70;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("WORD_PATTERN regex is invalid"));

/// Shape of a comment, which decides how its whitespace is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// A single-line comment standing on its own.
    Line,
    /// Consecutive single-line comments merged into one.
    Run,
    /// The body of a block comment spanning one or more lines.
    Block,
}

/// Remove every character that appears in either block delimiter from `text`.
///
/// This is character-set removal: stripping with `/*` removes every `/` and
/// every `*`, wherever they are. Surrounding newlines are dropped as well.
pub fn strip_symbols(text: &str, grammar: &LanguageGrammar) -> String {
    text.trim_matches('\n')
        .chars()
        .filter(|c| !grammar.is_strip_char(*c))
        .collect()
}

/// Remove leading space characters. Tabs and other whitespace are kept.
pub fn trim_leading_spaces(text: &str) -> &str {
    text.trim_start_matches(' ')
}

/// Replace every run of whitespace with a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of `\w+` words in `text`.
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

/// Whether `text` holds nothing once delimiters, single-line prefixes and
/// surrounding spaces are removed.
pub fn is_empty_comment(text: &str, grammar: &LanguageGrammar) -> bool {
    let mut remainder = strip_symbols(text, grammar);
    for prefix in grammar.single_line_prefixes() {
        remainder = remainder
            .trim_matches(|c: char| prefix.contains(c))
            .trim_matches(' ')
            .to_string();
    }
    remainder.is_empty() || remainder == "\n"
}

/// Normalize raw comment text, or reject it.
///
/// Returns `None` when the comment is empty after stripping, or when it has
/// more than `max_words` words.
pub fn normalize_comment(
    text: &str,
    grammar: &LanguageGrammar,
    kind: CommentKind,
    max_words: usize,
) -> Option<String> {
    let stripped = strip_symbols(text, grammar);
    let trimmed = trim_leading_spaces(&stripped);
    let normalized = match kind {
        CommentKind::Block => collapse_whitespace(trimmed),
        CommentKind::Line | CommentKind::Run => trimmed.to_string(),
    };

    if normalized.is_empty() || is_empty_comment(&normalized, grammar) {
        return None;
    }
    if word_count(&normalized) > max_words {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn test_strip_symbols_removes_characters_not_substrings() {
        let c = Language::C.grammar();
        assert_eq!(strip_symbols("a*b/c /* d */", &c), "abc  d ");
        assert_eq!(strip_symbols("\nkeep\n", &c), "keep");
    }

    #[test]
    fn test_strip_symbols_identity_without_delimiter_chars() {
        let c = Language::C.grammar();
        for text in ["plain words", "", "tabs\tand spaces", "größe 世界 42"] {
            assert_eq!(strip_symbols(text, &c), text);
        }
    }

    #[test]
    fn test_strip_symbols_ruby_uses_all_delimiter_chars() {
        let ruby = Language::Ruby.grammar();
        // Every character of "=begin"/"=end" goes, including letters.
        assert_eq!(strip_symbols("=begin docs", &ruby), " ocs");
    }

    #[test]
    fn test_trim_leading_spaces_only_spaces() {
        assert_eq!(trim_leading_spaces("   x "), "x ");
        assert_eq!(trim_leading_spaces("\t x"), "\t x");
        assert_eq!(trim_leading_spaces(""), "");
    }

    #[test]
    fn test_trim_leading_spaces_idempotent() {
        for text in ["   a", "a", "  ", "\t  b", " \t c"] {
            let once = trim_leading_spaces(text);
            assert_eq!(trim_leading_spaces(once), once);
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n c  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello, world"), 2);
        assert_eq!(word_count("snake_case counts_once"), 2);
        assert_eq!(word_count("größe 世界"), 2);
        assert_eq!(word_count("--- !!!"), 0);
    }

    #[test]
    fn test_is_empty_comment() {
        let c = Language::C.grammar();
        assert!(is_empty_comment("", &c));
        assert!(is_empty_comment("  // ", &c));
        assert!(is_empty_comment("/**/", &c));
        assert!(!is_empty_comment("// real", &c));

        let python = Language::Python.grammar();
        assert!(is_empty_comment("# ", &python));
        assert!(is_empty_comment("###", &python));
        assert!(!is_empty_comment("# note", &python));
    }

    #[test]
    fn test_normalize_comment_line() {
        let c = Language::C.grammar();
        // Trailing whitespace of line comments is part of the text.
        assert_eq!(
            normalize_comment("/ first  ", &c, CommentKind::Line, 100),
            Some("first  ".to_string())
        );
        assert_eq!(normalize_comment("/   ", &c, CommentKind::Line, 100), None);
    }

    #[test]
    fn test_normalize_comment_block_collapses() {
        let python = Language::Python.grammar();
        assert_eq!(
            normalize_comment(" hello   world ", &python, CommentKind::Block, 100),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn test_normalize_comment_word_limit() {
        let c = Language::C.grammar();
        let at_limit = vec!["word"; 100].join(" ");
        let over_limit = vec!["word"; 101].join(" ");
        assert!(normalize_comment(&at_limit, &c, CommentKind::Run, 100).is_some());
        assert!(normalize_comment(&over_limit, &c, CommentKind::Run, 100).is_none());
    }
}
