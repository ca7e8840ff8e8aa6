//! Sliding-window delimiter scanning
//!
//! Both primitives slide a window the width of a delimiter across every
//! character offset of a line. There is no smarter substring search on
//! purpose: overlapping delimiters (`///`, `""""`) toggle once per offset, and
//! that count is what decides comment state.
//!
//! Lines are scanned as `char` slices so offsets count Unicode scalar values,
//! not bytes.

use crate::normalize::trim_leading_spaces;

/// The window of `width` characters starting at `col`, cut short at the end
/// of the line.
pub fn window(line: &[char], col: usize, width: usize) -> &[char] {
    let end = col.saturating_add(width).min(line.len());
    let start = col.min(end);
    &line[start..end]
}

/// Whether `delimiter` occurs in `line` starting exactly at `col`.
pub fn window_matches(line: &[char], col: usize, delimiter: &[char]) -> bool {
    !delimiter.is_empty() && window(line, col, delimiter.len()) == delimiter
}

/// Whether `needle` appears as a contiguous run inside `haystack`.
fn contains_run(haystack: &[char], needle: &[char]) -> bool {
    needle.is_empty()
        || (needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle))
}

/// Collect the text that follows any of `prefixes` on `line`.
///
/// Each match of a prefix toggles an "inside comment" flag; while inside,
/// characters after the matched prefix are appended, except where the window
/// is itself part of the prefix. Results for all prefixes are concatenated and left-trimmed. An
/// empty string means no prefix matched.
///
/// NOTE: the inside flag is shared between prefixes, so when two prefixes
/// match on one line their text accumulates (and the second match can switch
/// collection off again). This looks accidental, but extracted datasets depend
/// on it, so it is kept as is.
///
/// # Examples
///
/// ```
/// use gleaner::scanner::find_enclosed_text;
///
/// let prefixes = vec!["#".to_string()];
/// assert_eq!(find_enclosed_text("x = 1  # counter", &prefixes), "counter");
/// assert_eq!(find_enclosed_text("x = 1", &prefixes), "");
/// ```
pub fn find_enclosed_text(line: &str, prefixes: &[String]) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut inside = false;
    let mut text = String::new();

    for prefix in prefixes {
        let prefix: Vec<char> = prefix.chars().collect();
        let mut resume_at: Option<usize> = None;

        for col in 0..chars.len() {
            let current = window(&chars, col, prefix.len());
            if current == prefix.as_slice() {
                inside = !inside;
                resume_at = Some(col + prefix.len());
            }

            let within_line = resume_at.is_some_and(|start| {
                col >= start && col + prefix.len() - start <= chars.len()
            });

            if inside && within_line && !contains_run(&prefix, current) {
                text.push(chars[col]);
            }
        }
    }

    trim_leading_spaces(&text).to_string()
}

/// Whether scanning `line` flips the "inside a block comment" state.
///
/// With a symmetric grammar (`start == end`) every occurrence toggles, so the
/// result is true iff the delimiter occurs an odd number of times. Otherwise
/// start and end matches both toggle, each through a window of its own width.
/// The caller XORs the result into its persistent state.
///
/// # Examples
///
/// ```
/// use gleaner::scanner::triggers_multiline;
///
/// assert!(triggers_multiline("/* opens here", "/*", "*/"));
/// assert!(!triggers_multiline("/* opens and closes */", "/*", "*/"));
/// assert!(!triggers_multiline("\"\"\"doc\"\"\"", "\"\"\"", "\"\"\""));
/// ```
pub fn triggers_multiline(line: &str, start: &str, end: &str) -> bool {
    let chars: Vec<char> = line.chars().collect();
    let start: Vec<char> = start.chars().collect();
    let end: Vec<char> = end.chars().collect();
    let symmetric = start == end;
    let mut toggled = false;

    for col in 0..chars.len() {
        if window_matches(&chars, col, &start) {
            toggled = !toggled;
        }
        if !symmetric && window_matches(&chars, col, &end) {
            toggled = !toggled;
        }
    }

    toggled
}
