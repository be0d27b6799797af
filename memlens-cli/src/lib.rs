#![warn(missing_docs)]
//! Memlens CLI Library
//!
//! Builds programs, runs them under a memory-diagnostic tool and reports the
//! categorized results. Use `memlens_cli::run()` in a main function to get the
//! full `memlens` command line, or drive an [`Analyzer`] directly.
//!
//! # Example
//!
//! ```ignore
//! use memlens_cli::{Analyzer, AnalyzerConfig};
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default());
//! let result = analyzer.run_basic_analysis("leak.c".as_ref())?;
//! println!("{} errors", result.summary.total_errors);
//! ```

mod config;
mod error;
mod executor;
mod runner;

pub use config::*;
pub use error::AnalysisError;
pub use executor::{
    Analyzer, AnalyzerConfig, BuildStage, CompiledArtifact, Disposition, InstrumentedRunStage,
    SourceArtifact, TimedExecutionStage, Workspace, build_analysis, build_comparison,
    build_report_meta, format_human_output, resolve_categories,
};
pub use runner::{ExitOutcome, ProcessOutput, ProcessRunner, RunnerError};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use memlens_diagnostics::Category;
use memlens_report::{OutputFormat, Report, generate_json_report};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Memlens CLI arguments
#[derive(Parser, Debug)]
#[command(name = "memlens")]
#[command(
    author,
    version,
    about = "Memlens - categorized memory diagnostics for C/C++ programs"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, json
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (memlens.toml is discovered if not specified)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Compiler program
    #[arg(long, global = true)]
    pub compiler: Option<String>,

    /// Instrumentation tool program
    #[arg(long, global = true)]
    pub tool: Option<String>,

    /// Timeout in seconds for the timed and instrumented runs
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one source file
    Analyze {
        /// C/C++ source file
        source: PathBuf,
        /// Restrict the report to these categories
        /// (memoryLeaks, invalidAccess, uninitializedValues, systemCalls)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
    /// Compare an older and a newer version of a source file
    Compare {
        /// Older source file
        older: PathBuf,
        /// Newer source file
        newer: PathBuf,
    },
    /// Print a default memlens.toml
    Init,
}

/// Run the Memlens CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Memlens CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the report
    let filter = if cli.verbose {
        "memlens=debug"
    } else {
        "memlens=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => MemlensConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MemlensConfig::discover().unwrap_or_default(),
    };

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .unwrap_or(OutputFormat::Human);

    match &cli.command {
        Commands::Init => {
            print!("{}", MemlensConfig::default_toml());
        }
        Commands::Analyze { source, categories } => {
            let analyzer = Analyzer::new(build_analyzer_config(&cli, &config)?);
            analyze(&cli, &config, &analyzer, source, categories, format)?;
        }
        Commands::Compare { older, newer } => {
            let analyzer = Analyzer::new(build_analyzer_config(&cli, &config)?);
            compare(&cli, &config, &analyzer, older, newer, format)?;
        }
    }

    Ok(())
}

/// Build an AnalyzerConfig by layering: memlens.toml defaults → CLI overrides.
pub fn build_analyzer_config(cli: &Cli, config: &MemlensConfig) -> anyhow::Result<AnalyzerConfig> {
    let duration = |value: &str, field: &str| -> anyhow::Result<Duration> {
        let nanos = MemlensConfig::parse_duration(value)
            .with_context(|| format!("Invalid {} in configuration", field))?;
        Ok(Duration::from_nanos(nanos))
    };

    let mut execution_timeout = duration(&config.execution.timeout, "execution.timeout")?;
    let mut instrumentation_timeout =
        duration(&config.instrumentation.timeout, "instrumentation.timeout")?;
    if let Some(secs) = cli.timeout {
        execution_timeout = Duration::from_secs(secs);
        instrumentation_timeout = Duration::from_secs(secs);
    }

    Ok(AnalyzerConfig {
        compiler: cli
            .compiler
            .clone()
            .unwrap_or_else(|| config.toolchain.compiler.clone()),
        compiler_args: config.toolchain.extra_args.clone(),
        compile_timeout: duration(&config.toolchain.timeout, "toolchain.timeout")?,
        execution_timeout,
        tool: cli
            .tool
            .clone()
            .unwrap_or_else(|| config.instrumentation.tool.clone()),
        tool_args: config.instrumentation.extra_args.clone(),
        instrumentation_timeout,
        parallel_compare: config.compare.parallel,
        work_dir: config.output.work_dir.clone(),
    })
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn analyze(
    cli: &Cli,
    config: &MemlensConfig,
    analyzer: &Analyzer,
    source: &Path,
    categories: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let requested = requested_categories(categories)?;

    let pb = spinner(format!("Analyzing {}", source.display()));
    let outcome = analyzer.run_basic_analysis(source);
    pb.finish_and_clear();
    let analysis = outcome.with_context(|| format!("Analysis of {} failed", source.display()))?;
    let analysis = match &requested {
        Some(keep) => analysis.filtered(keep),
        None => analysis,
    };
    let total_errors = analysis.summary.total_errors;
    let report = Report {
        meta: build_report_meta(analyzer.config(), requested),
        analysis: Some(analysis),
        comparison: None,
    };
    write_report(cli, &report, format)?;

    if config.ci.fail_on_errors && total_errors > 0 {
        eprintln!("\n{} memory error(s) reported", total_errors);
        std::process::exit(1);
    }

    Ok(())
}

/// Categories named by `--category`, resolved once; `None` selects a basic analysis
fn requested_categories(categories: &[String]) -> Result<Option<Vec<Category>>, AnalysisError> {
    if categories.is_empty() {
        return Ok(None);
    }
    resolve_categories(categories).map(Some)
}

fn compare(
    cli: &Cli,
    config: &MemlensConfig,
    analyzer: &Analyzer,
    older: &Path,
    newer: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pb = spinner(format!(
        "Comparing {} → {}",
        older.display(),
        newer.display()
    ));
    let outcome = analyzer.run_comparison(older, newer);
    pb.finish_and_clear();
    let comparison = outcome.context("Comparison failed")?;

    let new_errors = comparison.comparison.new_error_count();
    let report = Report {
        meta: build_report_meta(analyzer.config(), None),
        analysis: None,
        comparison: Some(comparison),
    };
    write_report(cli, &report, format)?;

    if config.ci.fail_on_new_errors && new_errors > 0 {
        eprintln!("\n{} new memory error(s) introduced", new_errors);
        std::process::exit(1);
    }

    Ok(())
}

fn write_report(cli: &Cli, report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    let output = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Human => format_human_output(report),
    };

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        eprintln!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
        std::io::stdout().flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_analyze_with_categories() {
        let cli = parse(&[
            "memlens",
            "analyze",
            "leak.c",
            "--category",
            "memoryLeaks",
            "-c",
            "systemCalls",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Analyze { source, categories } => {
                assert_eq!(source, PathBuf::from("leak.c"));
                assert_eq!(categories, vec!["memoryLeaks", "systemCalls"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_parse_compare_keeps_order() {
        let cli = parse(&["memlens", "--verbose", "compare", "old.c", "new.c"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Compare { older, newer } => {
                assert_eq!(older, PathBuf::from("old.c"));
                assert_eq!(newer, PathBuf::from("new.c"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_requested_categories() {
        assert_eq!(requested_categories(&[]).unwrap(), None);

        let names = vec![
            "invalidAccess".to_string(),
            "notACategory".to_string(),
            "invalidAccess".to_string(),
        ];
        assert_eq!(
            requested_categories(&names).unwrap(),
            Some(vec![Category::InvalidAccess])
        );
    }

    #[test]
    fn test_compare_requires_two_sources() {
        assert!(Cli::try_parse_from(["memlens", "compare", "old.c"]).is_err());
    }

    #[test]
    fn test_analyzer_config_layering() {
        let config: MemlensConfig = toml::from_str(
            r#"
            [toolchain]
            compiler = "clang"
            timeout = "10s"

            [execution]
            timeout = "500ms"

            [compare]
            parallel = false
            "#,
        )
        .unwrap();

        let cli = parse(&["memlens", "analyze", "a.c"]);
        let resolved = build_analyzer_config(&cli, &config).unwrap();
        assert_eq!(resolved.compiler, "clang");
        assert_eq!(resolved.compile_timeout, Duration::from_secs(10));
        assert_eq!(resolved.execution_timeout, Duration::from_millis(500));
        assert_eq!(resolved.instrumentation_timeout, Duration::from_secs(120));
        assert_eq!(resolved.tool, "valgrind");
        assert!(!resolved.parallel_compare);

        let cli = parse(&[
            "memlens", "analyze", "a.c", "--compiler", "cc", "--tool", "vg", "--timeout", "7",
        ]);
        let resolved = build_analyzer_config(&cli, &config).unwrap();
        assert_eq!(resolved.compiler, "cc");
        assert_eq!(resolved.tool, "vg");
        assert_eq!(resolved.execution_timeout, Duration::from_secs(7));
        assert_eq!(resolved.instrumentation_timeout, Duration::from_secs(7));
        assert_eq!(resolved.compile_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_duration_is_reported() {
        let mut config = MemlensConfig::default();
        config.execution.timeout = "soon".to_string();
        let cli = parse(&["memlens", "init"]);
        assert!(build_analyzer_config(&cli, &config).is_err());
    }
}
