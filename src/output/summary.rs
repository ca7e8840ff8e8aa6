//! Extraction summary display

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::extract::ExtractionSummary;

/// Print a summary of an extraction run to stdout with optional color.
pub fn print_summary(summary: &ExtractionSummary, use_color: bool) -> io::Result<()> {
    let color_choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color_choice);
    write_summary(&mut stdout, summary)
}

/// Write the summary report to any color-capable writer.
pub fn write_summary<W: WriteColor>(out: &mut W, summary: &ExtractionSummary) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    out.set_color(&bold)?;
    writeln!(out, "Extraction Summary")?;
    out.reset()?;
    writeln!(out, "──────────────────")?;

    let failed = summary.failed().count();
    writeln!(
        out,
        "Languages:    {} requested, {} failed",
        summary.languages.len(),
        failed
    )?;
    writeln!(
        out,
        "Files:        {} scanned, {} skipped",
        format_number(summary.total_files()),
        format_number(summary.total_skipped())
    )?;
    writeln!(out, "Comments:     {}", format_number(summary.total_records()))?;
    writeln!(out)?;

    let active: Vec<_> = summary
        .languages
        .iter()
        .filter(|o| o.files_scanned > 0 || o.is_failed())
        .collect();
    if !active.is_empty() {
        out.set_color(&bold)?;
        writeln!(out, "By Language:")?;
        out.reset()?;

        let mut lang_color = ColorSpec::new();
        lang_color.set_fg(Some(Color::Cyan));
        let mut error_color = ColorSpec::new();
        error_color.set_fg(Some(Color::Red));

        for outcome in active {
            write!(out, "  ")?;
            out.set_color(&lang_color)?;
            write!(out, "{:<14}", outcome.language)?;
            out.reset()?;

            if let Some(error) = &outcome.error {
                out.set_color(&error_color)?;
                write!(out, "failed: {}", error)?;
                out.reset()?;
            } else {
                write!(
                    out,
                    "{:>6} files  {:>9} comments  {:>3} output(s)",
                    format_number(outcome.files_scanned),
                    format_number(outcome.records_written),
                    outcome.outputs.len()
                )?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    let outputs = summary.output_files();
    if !outputs.is_empty() {
        out.set_color(&bold)?;
        writeln!(out, "Output Files:")?;
        out.reset()?;
        for path in outputs {
            writeln!(out, "  {}", path.display())?;
        }
    }

    Ok(())
}

/// Format a number with thousand separators.
fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

/// Print the summary as pretty JSON.
pub fn print_summary_json(summary: &ExtractionSummary) -> io::Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::LanguageOutcome;
    use std::path::PathBuf;
    use termcolor::NoColor;

    fn sample() -> ExtractionSummary {
        ExtractionSummary {
            languages: vec![
                LanguageOutcome {
                    language: "python".to_string(),
                    outputs: vec![PathBuf::from("out/comments_python_0.csv")],
                    files_scanned: 12,
                    files_skipped: 1,
                    records_written: 1234,
                    error: None,
                },
                LanguageOutcome {
                    language: "java".to_string(),
                    ..Default::default()
                },
                LanguageOutcome {
                    language: "cobol".to_string(),
                    error: Some("unknown language: cobol".to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    fn render(summary: &ExtractionSummary) -> String {
        let mut out = NoColor::new(Vec::new());
        write_summary(&mut out, summary).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_summary_lists_active_languages() {
        let text = render(&sample());
        assert!(text.contains("Languages:    3 requested, 1 failed"));
        assert!(text.contains("Files:        12 scanned, 1 skipped"));
        assert!(text.contains("Comments:     1,234"));
        assert!(text.contains("python"));
        assert!(text.contains("failed: unknown language: cobol"));
        assert!(!text.contains("java"), "languages without files are omitted");
        assert!(text.contains("out/comments_python_0.csv"));
    }

    #[test]
    fn test_summary_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["languages"][0]["records_written"], 1234);
        assert!(json["languages"][0].get("error").is_none());
        assert_eq!(json["languages"][2]["error"], "unknown language: cobol");
    }
}
