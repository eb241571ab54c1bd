//! # exprcheck
//!
//! Usage:
//!   exprcheck "1 + {SUM}"                  # Validate expressions given as arguments
//!   exprcheck --file formulas.txt          # One expression per line
//!   exprcheck --rules rules.toml ...       # Custom tokens and functions
//!   echo "ABS(1)" | exprcheck              # Read from stdin when no input is given
//!
//! Exit status: 0 when every expression is valid, 1 when any is invalid,
//! 2 on usage or I/O errors.

use clap::{Parser, ValueEnum};
use expr_validator::batch::{self, BatchConfig, BatchEntry, BatchResults, ExpressionEntry};
use expr_validator::config::RuntimeConfig;
use expr_validator::{log_info, logging, ExpressionValidator, RuleSet};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const EXIT_VALID: i32 = 0;
const EXIT_INVALID: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "exprcheck")]
#[command(version)]
#[command(about = "Validate arithmetic expressions with custom tokens and whitelisted functions")]
struct Cli {
    /// Expressions to validate
    #[arg(value_name = "EXPRESSION")]
    expressions: Vec<String>,

    /// File with one expression per line (blank lines and # comments skipped)
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// TOML rule file replacing the built-in tokens and functions
    #[arg(short, long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Worker threads for batch validation (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Stop at the first invalid expression
    #[arg(long)]
    fail_fast: bool,

    /// Only report invalid expressions
    #[arg(short, long)]
    quiet: bool,

    /// Print the active tokens and functions and exit
    #[arg(long)]
    list_rules: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_global_logging() {
        eprintln!("Error: {}", e);
        process::exit(EXIT_ERROR);
    }

    let code = match run(&cli) {
        Ok(true) => EXIT_VALID,
        Ok(false) => EXIT_INVALID,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    process::exit(code);
}

/// Returns whether every expression was valid
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let rules = match &cli.rules {
        Some(path) => RuleSet::from_file(path)?,
        None => RuleSet::defaults(),
    };

    if cli.list_rules {
        print!("{}", rules.describe());
        return Ok(true);
    }

    let entries = collect_entries(cli)?;
    if entries.is_empty() {
        return Err("no expressions given".into());
    }

    log_info!("exprcheck starting",
        "expressions" => entries.len(),
        "files" => cli.files.len()
    );

    let runtime = RuntimeConfig::default();
    let validator = Arc::new(ExpressionValidator::with_preferences(rules, runtime.validation));
    let config = BatchConfig {
        max_threads: cli.threads.unwrap_or_else(num_cpus::get),
        fail_fast: cli.fail_fast,
        progress_reporting: !cli.quiet && !cli.files.is_empty(),
        max_expressions: None,
    };

    let results = batch::process_with_config(entries, validator, &config)?;

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&results, cli.quiet)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&results))?),
    }

    Ok(results.all_valid())
}

fn collect_entries(cli: &Cli) -> Result<Vec<ExpressionEntry>, Box<dyn std::error::Error>> {
    let mut entries: Vec<ExpressionEntry> = cli
        .expressions
        .iter()
        .enumerate()
        .map(|(i, expression)| ExpressionEntry::inline(i + 1, expression.as_str()))
        .collect();

    for path in &cli.files {
        entries.extend(batch::read_expression_file(path)?);
    }

    if cli.expressions.is_empty() && cli.files.is_empty() && !io::stdin().is_terminal() {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        entries.extend(batch::parse_expression_lines(None, &content));
    }

    Ok(entries)
}

fn render_entry(entry: &BatchEntry) -> String {
    let status = if entry.result.is_valid() {
        "✓ valid"
    } else {
        "✗ invalid"
    };

    let mut out = match &entry.entry.source {
        Some(_) => format!("{}: {}  {}\n", entry.entry.location(), status, entry.entry.expression),
        None => format!("{}  {}\n", status, entry.entry.expression),
    };

    for (i, message) in entry.result.messages().iter().enumerate() {
        out.push_str(&format!("    {}. {}\n", i + 1, message));
    }

    out
}

fn render_text(results: &BatchResults, quiet: bool) -> String {
    let mut out = String::new();

    for entry in &results.entries {
        if quiet && entry.result.is_valid() {
            continue;
        }
        out.push_str(&render_entry(entry));
    }

    if !quiet && results.processed() > 1 {
        out.push('\n');
        out.push_str(&results.summary());
        out.push('\n');
    }

    out
}

fn render_json(results: &BatchResults) -> serde_json::Value {
    serde_json::Value::Array(
        results
            .entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "location": entry.entry.location(),
                    "expression": entry.entry.expression,
                    "isValid": entry.result.is_valid(),
                    "errors": entry.result.messages(),
                })
            })
            .collect(),
    )
}
