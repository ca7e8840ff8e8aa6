//! Comment grammars for the supported languages
//!
//! This module provides the `Language` enum, the `LanguageGrammar` value that
//! describes how a language marks comments, and the `GrammarRegistry` that the
//! extraction driver looks grammars up in. The registry is built once and
//! passed around explicitly.

use std::collections::HashSet;

use crate::error::{ExtractError, Result};

/// Placeholder delimiter for a comment form a language does not have.
///
/// It must never match real source text, so registry construction rejects
/// any grammar whose real delimiters contain it.
pub const SENTINEL: &str = "▓";

/// Marker that turns a discovery pattern into an extension match.
pub const WILDCARD: char = '*';

/// Languages with a built-in comment grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Kotlin,
    Cpp,
    JavaScript,
    Ruby,
    Gradle,
    Build,
    Python,
    Assembly,
    Makefile,
    Shell,
    Perl,
    Java,
    Html,
    Css,
    Xml,
    BatchScript,
}

impl Language {
    /// Every built-in language, in registry order.
    pub const ALL: [Language; 17] = [
        Language::C,
        Language::Kotlin,
        Language::Cpp,
        Language::JavaScript,
        Language::Ruby,
        Language::Gradle,
        Language::Build,
        Language::Python,
        Language::Assembly,
        Language::Makefile,
        Language::Shell,
        Language::Perl,
        Language::Java,
        Language::Html,
        Language::Css,
        Language::Xml,
        Language::BatchScript,
    ];

    /// Look a language up by its registry name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gleaner::language::Language;
    ///
    /// assert_eq!(Language::from_name("c++"), Some(Language::Cpp));
    /// assert_eq!(Language::from_name("python"), Some(Language::Python));
    /// assert_eq!(Language::from_name("cobol"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.name() == name)
    }

    /// The registry name of the language. Also written into every record.
    pub fn name(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Kotlin => "kotlin",
            Language::Cpp => "c++",
            Language::JavaScript => "javascript",
            Language::Ruby => "ruby",
            Language::Gradle => "gradle",
            Language::Build => "build",
            Language::Python => "python",
            Language::Assembly => "assembly",
            Language::Makefile => "makefile",
            Language::Shell => "shell",
            Language::Perl => "perl",
            Language::Java => "java",
            Language::Html => "html",
            Language::Css => "css",
            Language::Xml => "xml",
            Language::BatchScript => "batchscript",
        }
    }

    /// The file extension used to discover source files of this language.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Kotlin => "kt",
            Language::Cpp => "cpp",
            Language::JavaScript => "js",
            Language::Ruby => "rb",
            Language::Gradle => "gradle",
            Language::Build => "build",
            Language::Python => "py",
            Language::Assembly => "asm",
            Language::Makefile => "makefile",
            Language::Shell => "sh",
            Language::Perl => "pl",
            Language::Java => "java",
            Language::Html => "html",
            Language::Css => "css",
            Language::Xml => "xml",
            Language::BatchScript => "bat",
        }
    }

    /// Build the comment grammar for this language.
    pub fn grammar(&self) -> LanguageGrammar {
        let (start, end, single_line, strip): (&str, &str, &[&str], &[&str]) = match self {
            Language::C | Language::Kotlin | Language::Cpp | Language::JavaScript => {
                ("/*", "*/", &["//", "/*"], &["/", "*"])
            }
            Language::Java => ("/*", "*/", &["//"], &["/", "*"]),
            Language::Gradle => ("/*", "*/", &["//"], &[]),
            Language::Css => ("/*", "*/", &[SENTINEL], &["/", "*"]),
            Language::Ruby => ("=begin", "=end", &["#"], &["=begin", "=end"]),
            Language::Python => ("\"\"\"", "\"\"\"", &["#", "\"\"\""], &["\"\"\""]),
            // Assembly has no block comments; the triple quote stands in for one.
            Language::Assembly => ("\"\"\"", "\"\"\"", &[";"], &["\"\"\""]),
            Language::Perl => ("=", "=", &["#", "="], &[]),
            Language::Build | Language::Makefile | Language::Shell => {
                (SENTINEL, SENTINEL, &["#"], &[])
            }
            Language::BatchScript => (SENTINEL, SENTINEL, &["::"], &[]),
            Language::Html | Language::Xml => {
                ("<!--", "-->", &[SENTINEL], &["<", ">", "--", "!"])
            }
        };

        LanguageGrammar::new(self.name(), start, end, single_line, strip, self.extension())
    }
}

/// How one language marks its comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageGrammar {
    name: String,
    multiline_start: String,
    multiline_end: String,
    single_line_prefixes: Vec<String>,
    strip_symbols: Vec<String>,
    extension: String,
    strip_chars: Vec<char>,
}

impl LanguageGrammar {
    pub fn new(
        name: &str,
        multiline_start: &str,
        multiline_end: &str,
        single_line_prefixes: &[&str],
        strip_symbols: &[&str],
        extension: &str,
    ) -> Self {
        let mut strip_chars: Vec<char> = multiline_start.chars().chain(multiline_end.chars()).collect();
        strip_chars.sort_unstable();
        strip_chars.dedup();

        Self {
            name: name.to_string(),
            multiline_start: multiline_start.to_string(),
            multiline_end: multiline_end.to_string(),
            single_line_prefixes: single_line_prefixes.iter().map(|s| s.to_string()).collect(),
            strip_symbols: strip_symbols.iter().map(|s| s.to_string()).collect(),
            extension: extension.to_string(),
            strip_chars,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn multiline_start(&self) -> &str {
        &self.multiline_start
    }

    pub fn multiline_end(&self) -> &str {
        &self.multiline_end
    }

    pub fn single_line_prefixes(&self) -> &[String] {
        &self.single_line_prefixes
    }

    pub fn strip_symbols(&self) -> &[String] {
        &self.strip_symbols
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether the block comment opens and closes with the same delimiter.
    pub fn is_symmetric(&self) -> bool {
        self.multiline_start == self.multiline_end
    }

    /// Whether `c` is removed when stripping comment text.
    ///
    /// The set is every character of either block delimiter. The grammar's
    /// strip symbols are not part of it; they apply to whole-file block
    /// matches only.
    pub fn is_strip_char(&self, c: char) -> bool {
        self.strip_chars.binary_search(&c).is_ok()
    }

    /// Wildcard pattern that discovers this language's files.
    pub fn discovery_pattern(&self) -> String {
        format!("{}{}", WILDCARD, self.extension)
    }

    /// File-name-safe form of the language name (`c++` becomes `cpp`).
    pub fn file_stem(&self) -> String {
        self.name
            .chars()
            .map(|c| match c {
                '+' => 'p',
                c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
                _ => '_',
            })
            .collect()
    }

    /// Real (non-sentinel) delimiters of this grammar.
    fn legal_delimiters(&self) -> impl Iterator<Item = &str> {
        [self.multiline_start.as_str(), self.multiline_end.as_str()]
            .into_iter()
            .chain(self.single_line_prefixes.iter().map(String::as_str))
            .filter(|d| *d != SENTINEL)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ExtractError::InvalidGrammar {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.extension.is_empty() {
            return Err(invalid("file extension is empty"));
        }
        if self.multiline_start.is_empty() || self.multiline_end.is_empty() {
            return Err(invalid("block comment delimiters must not be empty"));
        }
        if self.single_line_prefixes.is_empty() {
            return Err(invalid("at least one single-line prefix is required"));
        }
        if self.single_line_prefixes.iter().any(String::is_empty) {
            return Err(invalid("single-line prefixes must not be empty"));
        }
        if (self.multiline_start == SENTINEL) != (self.multiline_end == SENTINEL) {
            return Err(invalid("only one block delimiter is the sentinel"));
        }
        // A real delimiter that embeds the sentinel could make it matchable.
        if self.legal_delimiters().any(|d| d.contains(SENTINEL)) {
            return Err(invalid("delimiter collides with the sentinel"));
        }
        Ok(())
    }
}

/// Immutable set of grammars, looked up by language name.
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    grammars: Vec<LanguageGrammar>,
}

impl GrammarRegistry {
    /// Registry with every built-in language.
    pub fn builtin() -> Result<Self> {
        Self::from_grammars(Language::ALL.iter().map(Language::grammar).collect())
    }

    /// Build a registry from arbitrary grammars, validating each one.
    pub fn from_grammars(grammars: Vec<LanguageGrammar>) -> Result<Self> {
        let mut seen = HashSet::new();
        for grammar in &grammars {
            grammar.validate()?;
            if !seen.insert(grammar.name()) {
                return Err(ExtractError::InvalidGrammar {
                    name: grammar.name().to_string(),
                    reason: "registered twice".to_string(),
                });
            }
        }

        Ok(Self { grammars })
    }

    /// Return a new registry with `grammar` added.
    pub fn with_grammar(&self, grammar: LanguageGrammar) -> Result<Self> {
        let mut grammars = self.grammars.clone();
        grammars.push(grammar);
        Self::from_grammars(grammars)
    }

    /// Look up a grammar by language name.
    pub fn get(&self, name: &str) -> Result<&LanguageGrammar> {
        self.grammars
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| ExtractError::GrammarNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageGrammar> {
        self.grammars.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.grammars.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}
