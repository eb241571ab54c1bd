// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    rules: RuleLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct RuleLimits {
    max_rule_file_size: u64,
    max_custom_tokens: usize,
    max_function_rules: usize,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
    max_expressions_per_batch: usize,
    max_batch_file_size: u64,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    max_logged_expression_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=EXPR_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=EXPR_CONFIG_DIR");

    let profile = env::var("EXPR_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("EXPR_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of expr_validator directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_RULE_FILE_SIZE: u64 = 100_000_000;
    const ABSOLUTE_MAX_BATCH_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

    if config.rules.max_rule_file_size == 0
        || config.rules.max_rule_file_size > ABSOLUTE_MAX_RULE_FILE_SIZE
    {
        panic!("LIMITS: max_rule_file_size must be between 1 and {ABSOLUTE_MAX_RULE_FILE_SIZE}");
    }

    if config.rules.max_custom_tokens == 0 || config.rules.max_function_rules == 0 {
        panic!("LIMITS: rule table limits cannot be zero");
    }

    if config.batch.max_worker_threads == 0
        || config.batch.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!("LIMITS: max_worker_threads must be between 1 and {ABSOLUTE_MAX_WORKER_THREADS}");
    }

    if config.batch.max_batch_file_size > ABSOLUTE_MAX_BATCH_FILE_SIZE {
        panic!("LIMITS: max_batch_file_size exceeds absolute maximum");
    }

    if config.batch.max_expressions_per_batch == 0 {
        panic!("LIMITS: max_expressions_per_batch cannot be zero");
    }

    if config.logging.max_log_message_length < 64 {
        panic!("LIMITS: max_log_message_length must be at least 64");
    }

    if profile == "production" && config.batch.max_batch_file_size > 50_000_000 {
        panic!("PRODUCTION: max_batch_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod rules {{
        pub const MAX_RULE_FILE_SIZE: u64 = {};
        pub const MAX_CUSTOM_TOKENS: usize = {};
        pub const MAX_FUNCTION_RULES: usize = {};
    }}

    pub mod batch {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_EXPRESSIONS_PER_BATCH: usize = {};
        pub const MAX_BATCH_FILE_SIZE: u64 = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOGGED_EXPRESSION_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.rules.max_rule_file_size,
        config.rules.max_custom_tokens,
        config.rules.max_function_rules,
        config.batch.max_worker_threads,
        config.batch.max_expressions_per_batch,
        config.batch.max_batch_file_size,
        config.logging.max_log_message_length,
        config.logging.max_logged_expression_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
