//! TOML rule files
//!
//! ```toml
//! custom_tokens = ["SUM", "TOTAL"]
//! extend_defaults = false
//!
//! [functions.CLAMP]
//! min_args = 3
//! max_args = 3      # omit for unbounded
//! ```

use super::error::RuleLoadError;
use super::functions::{is_valid_function_name, Arity, FunctionRuleTable};
use super::tokens::{is_valid_token_name, CustomTokenSet};
use super::RuleSet;
use crate::config::compile_time::rules::{MAX_CUSTOM_TOKENS, MAX_FUNCTION_RULES, MAX_RULE_FILE_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    custom_tokens: Vec<String>,
    #[serde(default)]
    extend_defaults: bool,
    #[serde(default)]
    functions: BTreeMap<String, FunctionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionEntry {
    min_args: usize,
    max_args: Option<usize>,
}

/// Parse a rule document
pub fn parse_rules(content: &str) -> Result<RuleSet, RuleLoadError> {
    let file: RuleFile = toml::from_str(content)?;

    for name in &file.custom_tokens {
        if !is_valid_token_name(name) {
            return Err(RuleLoadError::InvalidTokenName { name: name.clone() });
        }
    }

    let mut functions = if file.extend_defaults {
        FunctionRuleTable::defaults()
    } else {
        FunctionRuleTable::empty()
    };

    for (name, entry) in file.functions {
        if !is_valid_function_name(&name) {
            return Err(RuleLoadError::InvalidFunctionName { name });
        }
        let arity = match entry.max_args {
            Some(max) => Arity::between(entry.min_args, max),
            None => Arity::at_least(entry.min_args),
        };
        if !arity.is_consistent() {
            return Err(RuleLoadError::InvalidArity {
                name,
                min: arity.min,
                max: arity.max.unwrap_or(arity.min),
            });
        }
        functions = functions.with_rule(name, arity);
    }

    let tokens = if file.extend_defaults {
        CustomTokenSet::defaults().with_tokens(file.custom_tokens)
    } else {
        CustomTokenSet::new(file.custom_tokens)
    };

    if tokens.len() > MAX_CUSTOM_TOKENS {
        return Err(RuleLoadError::TooManyRules {
            kind: "custom tokens",
            count: tokens.len(),
            max: MAX_CUSTOM_TOKENS,
        });
    }
    if functions.len() > MAX_FUNCTION_RULES {
        return Err(RuleLoadError::TooManyRules {
            kind: "function rules",
            count: functions.len(),
            max: MAX_FUNCTION_RULES,
        });
    }

    Ok(RuleSet::new(tokens, functions))
}

/// Read and parse a rule file, enforcing the compile-time size limit
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleLoadError> {
    let display = path.display().to_string();

    let result = read_rule_file(path).and_then(|content| parse_rules(&content));

    match &result {
        Ok(rules) => {
            log_success!(
                codes::success::RULES_LOADED,
                "Rule file loaded",
                "path" => display,
                "tokens" => rules.tokens.len(),
                "functions" => rules.functions.len()
            );
        }
        Err(e) => {
            log_error!(e.error_code(), &e.to_string(),
                "path" => display,
                "category" => e.category(),
                "action" => e.recommended_action()
            );
        }
    }

    result
}

fn read_rule_file(path: &Path) -> Result<String, RuleLoadError> {
    let io_error = |source| RuleLoadError::Io {
        path: path.display().to_string(),
        source,
    };

    let size = fs::metadata(path).map_err(io_error)?.len();
    if size > MAX_RULE_FILE_SIZE {
        return Err(RuleLoadError::FileTooLarge {
            size,
            max_size: MAX_RULE_FILE_SIZE,
        });
    }

    log_debug!("Reading rule file", "path" => path.display(), "size" => size);
    fs::read_to_string(path).map_err(io_error)
}
