//! Whitelist-driven validation of arithmetic expressions
//!
//! An expression may mix plain arithmetic, `{TOKEN}` placeholders drawn
//! from a custom token whitelist, and calls to whitelisted functions with
//! arity rules. [`validate`] answers whether the string is well formed and
//! lists every problem it finds.
//!
//! ```
//! let result = expr_validator::validate("1 + {SUM} * ABS(-2)");
//! assert!(result.is_valid());
//!
//! let result = expr_validator::validate("POW(1,2,3)");
//! assert_eq!(
//!     result.messages(),
//!     vec!["POW() too many parameters: maximum 2, provided 3"]
//! );
//! ```

// Internal modules
pub mod batch;
pub mod config;
#[macro_use]
pub mod logging;
pub mod rules;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults, ExpressionEntry};
pub use rules::{Arity, CustomTokenSet, FunctionRule, FunctionRuleTable, RuleLoadError, RuleSet};
pub use validation::{
    validate, validate_with, validate_with_rules, ExpressionError, ExpressionValidator, Stage,
    ValidationResult,
};
