//! Batch validation of expression files
//!
//! One expression per line; blank lines and lines starting with `#` are
//! skipped. Expressions are independent, so the parallel mode simply
//! splits them across worker threads. Results always come back in line
//! order.

use crate::config::compile_time::batch::{
    MAX_BATCH_FILE_SIZE, MAX_EXPRESSIONS_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::logging::{self, codes, Code};
use crate::validation::{ExpressionValidator, ValidationResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    pub progress_reporting: bool,
    pub max_expressions: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            fail_fast: false,
            progress_reporting: false,
            max_expressions: None,
        }
    }
}

impl BatchConfig {
    /// Thread count clamped to the compile-time maximum
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }

    /// Expression limit clamped to the compile-time maximum
    pub fn effective_max_expressions(&self) -> usize {
        self.max_expressions
            .unwrap_or(MAX_EXPRESSIONS_PER_BATCH)
            .min(MAX_EXPRESSIONS_PER_BATCH)
    }
}

/// One expression and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionEntry {
    pub source: Option<PathBuf>,
    /// 1-based line number, or argument position for inline expressions
    pub line: usize,
    pub expression: String,
}

impl ExpressionEntry {
    pub fn inline(position: usize, expression: impl Into<String>) -> Self {
        Self {
            source: None,
            line: position,
            expression: expression.into(),
        }
    }

    /// `path:line` for file entries, `#n` for inline ones
    pub fn location(&self) -> String {
        match &self.source {
            Some(path) => format!("{}:{}", path.display(), self.line),
            None => format!("#{}", self.line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub entry: ExpressionEntry,
    pub result: ValidationResult,
}

/// Batch processing results, in input order
#[derive(Debug, Default)]
pub struct BatchResults {
    pub entries: Vec<BatchEntry>,
    pub duration: Duration,
    pub expressions_discovered: usize,
    pub stopped_early: bool,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> usize {
        self.entries.len()
    }

    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.processed() - self.valid_count()
    }

    pub fn all_valid(&self) -> bool {
        self.entries.iter().all(|e| e.result.is_valid())
    }

    pub fn invalid_entries(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| !e.result.is_valid())
    }

    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.valid_count() as f64 / self.processed() as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} expressions checked, {} valid ({:.1}%), {} invalid{}, {:.2}s total",
            self.processed(),
            self.valid_count(),
            self.success_rate() * 100.0,
            self.invalid_count(),
            if self.stopped_early { ", stopped early" } else { "" },
            self.duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Expression file too large: {path} is {size} bytes (max: {max_size})")]
    FileTooLarge {
        path: String,
        size: u64,
        max_size: u64,
    },

    #[error("Too many expressions: {count} (max: {max})")]
    TooManyExpressions { count: usize, max: usize },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::batch::BATCH_IO,
            Self::FileTooLarge { .. } => codes::batch::BATCH_FILE_TOO_LARGE,
            Self::TooManyExpressions { .. } => codes::batch::TOO_MANY_EXPRESSIONS,
            Self::ThreadError { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// Split file content into expression entries
pub fn parse_expression_lines(source: Option<&Path>, content: &str) -> Vec<ExpressionEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(ExpressionEntry {
                source: source.map(Path::to_path_buf),
                line: i + 1,
                expression: line.to_string(),
            })
        })
        .collect()
}

/// Read an expression file, enforcing the compile-time size limit
pub fn read_expression_file(path: &Path) -> Result<Vec<ExpressionEntry>, BatchError> {
    let io_error = |e: std::io::Error| BatchError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let size = fs::metadata(path).map_err(io_error)?.len();
    if size > MAX_BATCH_FILE_SIZE {
        return Err(BatchError::FileTooLarge {
            path: path.display().to_string(),
            size,
            max_size: MAX_BATCH_FILE_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(io_error)?;
    let entries = parse_expression_lines(Some(path), &content);

    crate::log_debug!("Expression file read",
        "file" => path.display(),
        "bytes" => size,
        "expressions" => entries.len()
    );

    Ok(entries)
}

// ============================================================================
// PROCESSING
// ============================================================================

fn validate_entry(validator: &ExpressionValidator, entry: ExpressionEntry) -> BatchEntry {
    let result = match &entry.source {
        Some(path) => logging::with_source_context(path.clone(), entry.line, || {
            validator.validate(&entry.expression)
        }),
        None => validator.validate(&entry.expression),
    };
    BatchEntry { entry, result }
}

fn check_limits(entries: &[ExpressionEntry], config: &BatchConfig) -> Result<(), BatchError> {
    let max = config.effective_max_expressions();
    if entries.len() > max {
        return Err(BatchError::TooManyExpressions {
            count: entries.len(),
            max,
        });
    }
    Ok(())
}

/// Keep entries up to and including the first invalid one
fn truncate_after_first_invalid(results: &mut BatchResults) -> bool {
    match results.entries.iter().position(|e| !e.result.is_valid()) {
        Some(index) => {
            results.entries.truncate(index + 1);
            true
        }
        None => false,
    }
}

fn report_progress(config: &BatchConfig, done: usize, total: usize) {
    if config.progress_reporting {
        eprintln!("Validated {} of {} expressions", done, total);
    }
}

/// Validate entries one after another on the calling thread
pub fn process_sequential(
    entries: Vec<ExpressionEntry>,
    validator: &ExpressionValidator,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    check_limits(&entries, config)?;

    crate::log_info!("Starting sequential batch validation",
        "expressions" => entries.len()
    );

    let total = entries.len();
    let mut results = BatchResults::new();
    results.expressions_discovered = total;

    for entry in entries {
        let batch_entry = validate_entry(validator, entry);
        let invalid = !batch_entry.result.is_valid();
        results.entries.push(batch_entry);

        if results.processed() % PROGRESS_INTERVAL == 0 {
            report_progress(config, results.processed(), total);
        }

        if invalid && config.fail_fast {
            results.stopped_early = results.processed() < total;
            break;
        }
    }

    finish(results, start_time, config, 1)
}

/// Validate entries across a fixed set of worker threads
pub fn process_parallel(
    entries: Vec<ExpressionEntry>,
    validator: Arc<ExpressionValidator>,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    check_limits(&entries, config)?;

    let threads = config.effective_threads();
    let total = entries.len();

    crate::log_info!("Starting parallel batch validation",
        "expressions" => total,
        "max_threads" => threads
    );

    let mut results = BatchResults::new();
    results.expressions_discovered = total;

    let chunk_size = calculate_chunk_size(total, threads) * threads;
    let mut remaining = entries;

    while !remaining.is_empty() {
        let rest = remaining.split_off(chunk_size.min(remaining.len()));
        let chunk_results = process_chunk_parallel(remaining, &validator, threads)?;
        results.entries.extend(chunk_results);
        remaining = rest;

        report_progress(config, results.processed(), total);

        if config.fail_fast && truncate_after_first_invalid(&mut results) {
            results.stopped_early = results.processed() < total;
            break;
        }
    }

    finish(results, start_time, config, threads)
}

/// Validate one chunk; the returned entries keep the chunk's order
fn process_chunk_parallel(
    entries: Vec<ExpressionEntry>,
    validator: &Arc<ExpressionValidator>,
    threads: usize,
) -> Result<Vec<BatchEntry>, BatchError> {
    let per_thread = entries.len().div_ceil(threads).max(1);

    let mut handles = Vec::new();
    let mut remaining = entries;
    while !remaining.is_empty() {
        let rest = remaining.split_off(per_thread.min(remaining.len()));
        let thread_entries = remaining;
        remaining = rest;

        let validator = Arc::clone(validator);
        handles.push(thread::spawn(move || {
            thread_entries
                .into_iter()
                .map(|entry| validate_entry(&validator, entry))
                .collect::<Vec<_>>()
        }));
    }

    let mut collected = Vec::new();
    for handle in handles {
        let thread_results = handle.join().map_err(|_| {
            crate::log_error!(codes::batch::WORKER_FAILURE, "Worker thread panicked");
            BatchError::ThreadError {
                message: "Thread panicked during validation".to_string(),
            }
        })?;
        collected.extend(thread_results);
    }

    Ok(collected)
}

const PROGRESS_INTERVAL: usize = 1000;

/// Per-thread share of one chunk, bounded to keep memory flat
fn calculate_chunk_size(total: usize, threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = PROGRESS_INTERVAL;

    total
        .div_ceil(threads.max(1))
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn finish(
    mut results: BatchResults,
    start_time: Instant,
    config: &BatchConfig,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    results.duration = start_time.elapsed();

    if results.stopped_early {
        crate::log_warning!(code = codes::warnings::BATCH_STOPPED_EARLY,
            "Fail-fast mode enabled, stopping batch validation",
            "processed" => results.processed(),
            "discovered" => results.expressions_discovered
        );
    }

    crate::log_success!(
        codes::success::BATCH_COMPLETED,
        "Batch validation completed",
        "processed" => results.processed(),
        "valid" => results.valid_count(),
        "invalid" => results.invalid_count(),
        "threads_used" => threads,
        "fail_fast" => config.fail_fast,
        "duration_ms" => format!("{:.2}", results.duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Validate entries, choosing sequential or parallel mode from the config
pub fn process_with_config(
    entries: Vec<ExpressionEntry>,
    validator: Arc<ExpressionValidator>,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 || entries.len() < 2 {
        process_sequential(entries, &validator, config)
    } else {
        process_parallel(entries, validator, config)
    }
}

/// Read and validate one expression file
pub fn validate_file(
    path: &Path,
    validator: Arc<ExpressionValidator>,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let entries = read_expression_file(path)?;
    process_with_config(entries, validator, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::ValidationPreferences;
    use crate::rules::RuleSet;
    use assert_matches::assert_matches;

    fn validator() -> Arc<ExpressionValidator> {
        Arc::new(ExpressionValidator::with_preferences(
            RuleSet::defaults(),
            ValidationPreferences::quiet(),
        ))
    }

    fn entries(expressions: &[&str]) -> Vec<ExpressionEntry> {
        expressions
            .iter()
            .enumerate()
            .map(|(i, e)| ExpressionEntry::inline(i + 1, *e))
            .collect()
    }

    fn config(threads: usize, fail_fast: bool) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            fail_fast,
            progress_reporting: false,
            max_expressions: None,
        }
    }

    #[test]
    fn test_parse_expression_lines() {
        let content = "# header\n1 + 2\n\n   \nABS(1)\n  # indented comment\n{FOO}\n";
        let parsed = parse_expression_lines(None, content);

        let lines: Vec<usize> = parsed.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 5, 7]);
        assert_eq!(parsed[1].expression, "ABS(1)");
        assert_eq!(parsed[0].location(), "#2");
    }

    #[test]
    fn test_read_expression_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formulas.txt");
        fs::write(&path, "1 + {SUM}\n# skip\nPOW(2)\n").unwrap();

        let parsed = read_expression_file(&path).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].line, 3);
        assert_eq!(parsed[1].location(), format!("{}:3", path.display()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_expression_file(&dir.path().join("missing.txt")).unwrap_err();
        assert_matches!(err, BatchError::Io { .. });
        assert_eq!(err.error_code(), codes::batch::BATCH_IO);
    }

    #[test]
    fn test_sequential_counts() {
        let results = process_sequential(
            entries(&["1 + 2", "1 +", "{SUM}", "ABS()"]),
            &validator(),
            &config(1, false),
        )
        .unwrap();

        assert_eq!(results.processed(), 4);
        assert_eq!(results.valid_count(), 2);
        assert_eq!(results.invalid_count(), 2);
        assert!(!results.all_valid());
        assert!(!results.stopped_early);
        assert!(results.summary().contains("4 expressions checked"));
    }

    #[test]
    fn test_parallel_preserves_order() {
        let expressions: Vec<String> = (0..250)
            .map(|i| if i % 7 == 0 { format!("{} +", i) } else { format!("ABS({})", i) })
            .collect();
        let refs: Vec<&str> = expressions.iter().map(String::as_str).collect();

        let results = process_parallel(entries(&refs), validator(), &config(4, false)).unwrap();

        assert_eq!(results.processed(), 250);
        for (i, entry) in results.entries.iter().enumerate() {
            assert_eq!(entry.entry.line, i + 1);
            assert_eq!(entry.result.is_valid(), i % 7 != 0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = entries(&["1 + 2", "{FOO}", "POW(1,2,3)", "(1", "SQRT(4) * 2"]);
        let sequential = process_sequential(input.clone(), &validator(), &config(1, false)).unwrap();
        let parallel = process_parallel(input, validator(), &config(3, false)).unwrap();

        let seq: Vec<_> = sequential.entries.iter().map(|e| e.result.clone()).collect();
        let par: Vec<_> = parallel.entries.iter().map(|e| e.result.clone()).collect();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_fail_fast_sequential() {
        let results = process_sequential(
            entries(&["1 + 2", "1 +", "3", "4 *"]),
            &validator(),
            &config(1, true),
        )
        .unwrap();

        assert_eq!(results.processed(), 2);
        assert!(results.stopped_early);
        assert_eq!(results.invalid_count(), 1);
    }

    #[test]
    fn test_fail_fast_parallel_stops_at_first_invalid() {
        let results = process_parallel(
            entries(&["1 + 2", "3", "1 +", "4", "5 *"]),
            validator(),
            &config(2, true),
        )
        .unwrap();

        assert_eq!(results.processed(), 3);
        assert!(results.stopped_early);
        assert_eq!(results.entries[2].entry.line, 3);
    }

    #[test]
    fn test_expression_limit() {
        let mut limited = config(1, false);
        limited.max_expressions = Some(2);

        let err = process_sequential(entries(&["1", "2", "3"]), &validator(), &limited).unwrap_err();
        assert_matches!(err, BatchError::TooManyExpressions { count: 3, max: 2 });
    }

    #[test]
    fn test_validate_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.txt");
        fs::write(&path, "1 + 2\nUNKNOWN(1)\n{AVERAGE} / 2\n").unwrap();

        let results = validate_file(&path, validator(), &config(2, false)).unwrap();
        assert_eq!(results.processed(), 3);
        let invalid: Vec<usize> = results.invalid_entries().map(|e| e.entry.line).collect();
        assert_eq!(invalid, vec![2]);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(0, 4), 1);
        assert_eq!(calculate_chunk_size(1_000_000, 4), PROGRESS_INTERVAL);
    }

    #[test]
    fn test_config_clamps() {
        let mut cfg = config(0, false);
        assert_eq!(cfg.effective_threads(), 1);
        cfg.max_threads = usize::MAX;
        assert_eq!(cfg.effective_threads(), MAX_WORKER_THREADS);
        assert_eq!(cfg.effective_max_expressions(), MAX_EXPRESSIONS_PER_BATCH);
    }
}
