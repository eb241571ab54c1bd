//! Whitelist tables consulted by the validator
//!
//! Tables are plain immutable values passed into each validation call.
//! Nothing here is global.

pub mod error;
pub mod functions;
pub mod loader;
pub mod tokens;

pub use error::RuleLoadError;
pub use functions::{Arity, FunctionRule, FunctionRuleTable};
pub use tokens::{CustomTokenSet, DEFAULT_CUSTOM_TOKENS};

use std::path::Path;

/// Custom tokens and function rules used together for one validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub tokens: CustomTokenSet,
    pub functions: FunctionRuleTable,
}

impl RuleSet {
    pub fn new(tokens: CustomTokenSet, functions: FunctionRuleTable) -> Self {
        Self { tokens, functions }
    }

    /// Built-in tokens and functions
    pub fn defaults() -> Self {
        Self::new(CustomTokenSet::defaults(), FunctionRuleTable::defaults())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RuleLoadError> {
        loader::parse_rules(content)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleLoadError> {
        loader::load_rules(path.as_ref())
    }

    /// Human-readable listing for `--list-rules`
    pub fn describe(&self) -> String {
        let mut out = String::from("Custom tokens:\n");
        for name in self.tokens.iter() {
            out.push_str(&format!("  {{{}}}\n", name));
        }
        out.push_str("Functions:\n");
        for rule in self.functions.iter() {
            out.push_str(&format!("  {}() args: {}\n", rule.name, rule.arity));
        }
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::defaults()
    }
}
