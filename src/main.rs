//! CLI entry point for gleaner

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use gleaner::{
    ExtractConfig, ExtractionStrategy, ExtractionSummary, GitSnapshot, Gleaner, GrammarRegistry,
    OutputFormat, print_summary, print_summary_json,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Output file format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum FormatArg {
    /// CSV with a line,location,language header
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Comment extraction strategy
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum StrategyArg {
    /// Line-by-line scan with one line of lookahead
    #[default]
    Line,
    /// Regular expressions over the whole file
    WholeFile,
}

impl From<StrategyArg> for ExtractionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Line => ExtractionStrategy::LineScan,
            StrategyArg::WholeFile => ExtractionStrategy::WholeFile,
        }
    }
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(about = "Extract source code comments into size-capped CSV files")]
#[command(version)]
struct Args {
    /// Directory to extract from
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Directory to write output files into (created if missing)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        required_unless_present = "list_languages"
    )]
    output: Option<PathBuf>,

    /// Language to extract (can be used multiple times, default: all)
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    languages: Vec<String>,

    /// Number of parallel workers for extraction
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Output file format
    #[arg(long = "format", value_name = "FORMAT", default_value = "csv")]
    format: FormatArg,

    /// How comments are found: line (lookahead scan) or whole-file (regex)
    #[arg(long = "strategy", value_name = "STRATEGY", default_value = "line")]
    strategy: StrategyArg,

    /// Rows per output file before starting the next one
    #[arg(long = "rows-per-file", value_name = "N", default_value = "50000")]
    rows_per_file: usize,

    /// Maximum source file size (default: 1MB, 0 for no limit)
    /// Files larger than this are skipped. Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE")]
    max_file_size: Option<String>,

    /// Ignore files and directories matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Clone this repository and extract from it instead of PATH
    #[arg(long = "repo", value_name = "URL", requires = "branch")]
    repo: Option<String>,

    /// Branch to clone (requires --repo)
    #[arg(long = "branch", value_name = "NAME", requires = "repo")]
    branch: Option<String>,

    /// Abort the clone after DURATION (e.g. 30s, 5m)
    #[arg(long = "clone-timeout", value_name = "DURATION", requires = "repo")]
    clone_timeout: Option<String>,

    /// History depth to clone (default: 1, 0 = full history)
    #[arg(long = "depth", value_name = "N", requires = "repo")]
    depth: Option<u32>,

    /// Print the run summary as JSON
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// List the supported languages and exit
    #[arg(long = "list-languages")]
    list_languages: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Parse a duration string like "30s", "5m", "1h" into a Duration.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn list_languages(registry: &GrammarRegistry, json: bool) {
    if json {
        let languages: Vec<_> = registry
            .iter()
            .map(|g| {
                serde_json::json!({
                    "name": g.name(),
                    "pattern": g.discovery_pattern(),
                })
            })
            .collect();
        match serde_json::to_string_pretty(&languages) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("gleaner: error writing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for grammar in registry.iter() {
            println!("{:<14}{}", grammar.name(), grammar.discovery_pattern());
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let registry = GrammarRegistry::builtin().unwrap_or_else(|e| {
        eprintln!("gleaner: {}", e);
        process::exit(1);
    });

    if args.list_languages {
        list_languages(&registry, args.json);
        return;
    }

    let max_file_size = match args.max_file_size.as_deref() {
        Some(size_str) => parse_file_size(size_str).unwrap_or_else(|e| {
            eprintln!("gleaner: invalid --max-file-size '{}': {}", size_str, e);
            process::exit(1);
        }),
        None => ExtractConfig::default().max_file_size,
    };

    let clone_timeout = args.clone_timeout.as_deref().map(|s| {
        parse_duration_string(s).unwrap_or_else(|e| {
            eprintln!("gleaner: invalid --clone-timeout duration '{}': {}", s, e);
            process::exit(1);
        })
    });

    let config = ExtractConfig {
        languages: args.languages.clone(),
        parallel_workers: args.jobs,
        max_file_size,
        ignore_patterns: args.ignore.clone(),
        rows_per_file: args.rows_per_file,
        output_format: args.format.into(),
        strategy: args.strategy.into(),
        ..Default::default()
    };

    let Some(output_dir) = args.output.as_deref() else {
        eprintln!("gleaner: --output is required");
        process::exit(1);
    };

    let extractor = Gleaner::with_registry(config, registry);
    let result: gleaner::Result<ExtractionSummary> = match (&args.repo, &args.branch) {
        (Some(url), Some(branch)) => {
            let depth = match args.depth {
                Some(0) => None,
                Some(depth) => Some(depth),
                None => Some(1),
            };
            let provider = GitSnapshot::new()
                .with_depth(depth)
                .with_timeout(clone_timeout);
            extractor.extract_from_repo_snapshot(&provider, url, branch, output_dir)
        }
        _ => extractor.extract_from_directory(&args.path, output_dir),
    };

    let summary = result.unwrap_or_else(|e| {
        eprintln!("gleaner: {}", e);
        process::exit(1);
    });

    let printed = if args.json {
        print_summary_json(&summary)
    } else {
        print_summary(&summary, should_use_color(args.color))
    };
    if let Err(e) = printed {
        eprintln!("gleaner: error writing output: {}", e);
        process::exit(1);
    }

    if summary.has_failures() {
        process::exit(1);
    }
}
