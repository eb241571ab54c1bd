//! Expression validation
//!
//! Three stages run in order over one expression:
//!
//! 1. braces: `{NAME}` tokens against the custom token whitelist
//! 2. functions: `NAME(args)` calls against the function rule table
//! 3. syntax: operator, parenthesis and number checks over the skeleton
//!    left after substituting tokens and calls, run only when stages 1
//!    and 2 are clean
//!
//! Validation is total: every input produces a [`ValidationResult`].

pub mod braces;
pub mod error;
pub mod functions;
pub mod residual;
pub mod result;
pub mod substitute;

pub use error::{ExpressionError, Stage};
pub use functions::{split_arguments, ParsedFunctionCall};
pub use result::ValidationResult;

use crate::config::compile_time::logging::MAX_LOGGED_EXPRESSION_LENGTH;
use crate::config::runtime::ValidationPreferences;
use crate::logging::codes;
use crate::logging::LogLevel;
use crate::rules::{CustomTokenSet, FunctionRuleTable, RuleSet};
use crate::{log_debug, log_info, log_success};
use std::sync::OnceLock;

static DEFAULT_VALIDATOR: OnceLock<ExpressionValidator> = OnceLock::new();

fn default_validator() -> &'static ExpressionValidator {
    DEFAULT_VALIDATOR.get_or_init(|| ExpressionValidator::new(RuleSet::defaults()))
}

/// Validate against the built-in tokens and functions
pub fn validate(expression: &str) -> ValidationResult {
    default_validator().validate(expression)
}

/// Validate against caller-supplied whitelists
pub fn validate_with(
    expression: &str,
    tokens: &CustomTokenSet,
    functions: &FunctionRuleTable,
) -> ValidationResult {
    run_stages(
        expression,
        tokens,
        functions,
        &default_validator().preferences,
    )
}

pub fn validate_with_rules(expression: &str, rules: &RuleSet) -> ValidationResult {
    validate_with(expression, &rules.tokens, &rules.functions)
}

/// Reusable validator bound to one rule set
#[derive(Debug, Clone)]
pub struct ExpressionValidator {
    rules: RuleSet,
    preferences: ValidationPreferences,
}

impl ExpressionValidator {
    /// Validator with preferences taken from the environment
    pub fn new(rules: RuleSet) -> Self {
        Self::with_preferences(rules, ValidationPreferences::default())
    }

    pub fn with_preferences(rules: RuleSet, preferences: ValidationPreferences) -> Self {
        Self { rules, preferences }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn preferences(&self) -> &ValidationPreferences {
        &self.preferences
    }

    pub fn validate(&self, expression: &str) -> ValidationResult {
        run_stages(
            expression,
            &self.rules.tokens,
            &self.rules.functions,
            &self.preferences,
        )
    }
}

impl Default for ExpressionValidator {
    fn default() -> Self {
        Self::new(RuleSet::defaults())
    }
}

fn run_stages(
    expression: &str,
    tokens: &CustomTokenSet,
    functions: &FunctionRuleTable,
    preferences: &ValidationPreferences,
) -> ValidationResult {
    if expression.trim().is_empty() {
        return ValidationResult::valid();
    }

    let chars: Vec<char> = expression.chars().collect();

    let brace_scan = braces::check_braces(&chars, tokens);
    let function_scan = functions::check_functions(&chars, functions);

    if preferences.log_stage_details {
        log_debug!("Brace stage finished",
            "tokens" => brace_scan.spans.len(),
            "errors" => brace_scan.errors.len()
        );
        log_debug!("Function stage finished",
            "calls" => function_scan.calls.len(),
            "errors" => function_scan.errors.len()
        );
    }

    let mut errors = brace_scan.errors;
    errors.extend(function_scan.errors);

    if errors.is_empty() {
        let cleaned = substitute::substitute(&chars, &brace_scan.spans, &function_scan.calls);
        let syntax_errors = residual::check_residual(&cleaned);
        if preferences.log_stage_details {
            log_debug!("Syntax stage finished",
                "skeleton" => cleaned,
                "errors" => syntax_errors.len()
            );
        }
        errors.extend(syntax_errors);
    } else if preferences.log_stage_details {
        log_debug!("Syntax stage skipped",
            "code" => codes::warnings::SYNTAX_STAGE_SKIPPED
        );
    }

    let result = ValidationResult::from_errors(errors);
    log_outcome(expression, &result, preferences);
    result
}

fn log_outcome(expression: &str, result: &ValidationResult, preferences: &ValidationPreferences) {
    if !crate::logging::level_enabled(LogLevel::Info) {
        return;
    }

    let shown = if preferences.log_expression_text {
        truncate_expression(expression)
    } else {
        String::from("<hidden>")
    };

    match result.first_error() {
        None => {
            log_success!(codes::success::EXPRESSION_VALID, "Expression valid",
                "chars" => expression.chars().count(),
                "expression" => shown
            );
        }
        Some(first) => {
            log_info!("Expression invalid",
                "code" => codes::warnings::EXPRESSION_INVALID,
                "errors" => result.error_count(),
                "first" => first.code(),
                "stage" => first.stage(),
                "category" => first.category(),
                "action" => first.recommended_action(),
                "expression" => shown
            );
        }
    }
}

fn truncate_expression(expression: &str) -> String {
    if expression.chars().count() <= MAX_LOGGED_EXPRESSION_LENGTH {
        expression.to_string()
    } else {
        let mut truncated: String = expression.chars().take(MAX_LOGGED_EXPRESSION_LENGTH).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Arity;
    use assert_matches::assert_matches;

    fn assert_valid(expression: &str) {
        let result = validate(expression);
        assert!(
            result.is_valid(),
            "expected '{}' to be valid, got {:?}",
            expression,
            result.messages()
        );
    }

    fn assert_error(expression: &str, message: &str) {
        let result = validate(expression);
        assert!(!result.is_valid(), "expected '{}' to be invalid", expression);
        assert!(
            result.has_message(message),
            "expected '{}' in {:?}",
            message,
            result.messages()
        );
    }

    #[test]
    fn test_empty_input_is_valid() {
        assert_eq!(validate(""), ValidationResult::valid());
        assert_eq!(validate("   "), ValidationResult::valid());
        assert_eq!(validate("\t\n"), ValidationResult::valid());
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_valid("1 + 2");
        assert_valid("(1 + 2) * 3 / 4");
        assert_valid("1.5 + 2.3 * 0.5");
        assert_valid("-1 + 2");
        assert_valid("1 + -2");
        assert_valid("1 + .5");
    }

    #[test]
    fn test_basic_syntax_errors() {
        assert_error("1 + 2 @ 3", "Contains invalid characters: @");
        assert_error("1 + 2 +", "Expression cannot end with an operator");
        assert_error("(1 + 2", "Missing 1 right parentheses");
        assert_error("1 + () + 2", "Cannot have empty parentheses");
        assert_error("1 + (2 +)", "Operator cannot be directly followed by right parenthesis");
        assert_error("1 + (+ 2)", "Left parenthesis cannot be directly followed by \"+\"");
        assert_error("1.5.2 + 3", "Invalid number format: multiple decimal points");
        assert_error("1..5 + 3", "Cannot have consecutive dots");
        assert_error("1 ++ 2", "Cannot have consecutive operators");
        assert_error("1 ** 2", "Cannot have consecutive operators");
        assert_error("1 // 2", "Cannot have consecutive operators");
        assert_error("1 + + 2", "Invalid operator combination");
        assert_error("* 1 + 2", "Expression cannot start with \"*\" or \"/\"");
        assert_error("/ 1 + 2", "Expression cannot start with \"*\" or \"/\"");
        assert_error("+ 1 + 2", "Expression cannot start with \"+\"");
        assert_error("1. + 2", "Invalid decimal point position");
    }

    #[test]
    fn test_custom_tokens() {
        assert_valid("1 + {SUM} * 2");
        assert_valid("{SUM} + {AVERAGE} * {MAX}");
        assert_valid("1 + {SUM} + {AVERAGE} + 2");
        assert_valid("1 + {SUM} + {AVERAGE} + {MAX}");
        assert_valid("1 + { SUM } + 2");
        assert_error("1 + {INVALID} * 2", "Unknown custom expression: {INVALID}");
        assert_error("{SUM} + {INVALID} + {MAX}", "Unknown custom expression: {INVALID}");
        assert_error("1 + {} * 2", "Braces cannot be empty");
        assert_error("1 + {SUM + 2", "Unmatched braces (open: 1, close: 0)");
    }

    #[test]
    fn test_functions() {
        for expression in [
            "ABS(x)",
            "POW(x,y)",
            "SQRT(16)",
            "LOG(10)",
            "SIN(3.14)",
            "COS(3.14)",
            "TAN(3.14)",
            "MAX_FUNC(1,2,3)",
            "MIN_FUNC(1,2,3)",
            "ABS(POW(2,3))",
            "MAX_FUNC(ABS(-5), POW(2,3), SQRT(16))",
        ] {
            assert_valid(expression);
        }
        assert_error(
            "UNKNOWN_FUNC(x)",
            "Unauthorized function: UNKNOWN_FUNC() - only predefined functions allowed",
        );
        assert_error(
            "ABS()",
            "ABS() insufficient parameters: requires at least 1, provided 0",
        );
        assert_error("POW(1,2,3)", "POW() too many parameters: maximum 2, provided 3");
    }

    #[test]
    fn test_digit_prefixed_calls_are_checked() {
        assert_eq!(
            validate("2FOO(5)").messages(),
            vec!["Unauthorized function: FOO() - only predefined functions allowed"]
        );
        assert_eq!(
            validate("1ABS(1,2,3)").messages(),
            vec!["ABS() too many parameters: maximum 1, provided 3"]
        );
    }

    #[test]
    fn test_space_before_paren_is_not_a_call() {
        assert_valid("FOO (1)");
        assert_valid("ABS (1, 2)");
    }

    #[test]
    fn test_out_of_order_braces() {
        assert_eq!(
            validate("}SUM{").messages(),
            vec!["Unmatched braces (open: 1, close: 1)"]
        );
        assert_error("1 } + { 2", "Unmatched braces (open: 1, close: 1)");
    }

    #[test]
    fn test_mixed_expression() {
        assert_valid("{SUM} + ABS(-5) * POW(2,3) / {AVERAGE}");
        assert_valid("2 * (ABS({MIN}) + 1.25) - MAX_FUNC({MAX}, {COUNT}, 3)");
    }

    #[test]
    fn test_stage_order_is_preserved() {
        let result = validate("{FOO} + BAR(1) + {}");
        assert_eq!(
            result.messages(),
            vec![
                "Unknown custom expression: {FOO}",
                "Braces cannot be empty",
                "Unauthorized function: BAR() - only predefined functions allowed",
            ]
        );
        assert_eq!(result.stage_of_first_error(), Some(Stage::Braces));
    }

    #[test]
    fn test_syntax_stage_skipped_after_structural_errors() {
        // Trailing operator would be reported if the syntax stage ran
        let result = validate("{FOO} +");
        assert_eq!(result.messages(), vec!["Unknown custom expression: {FOO}"]);
    }

    #[test]
    fn test_syntax_stage_sees_skeleton() {
        let result = validate("ABS(1) ABS(2) +");
        assert_eq!(result.messages(), vec!["Expression cannot end with an operator"]);

        let result = validate("POW(2, 3) ** 2");
        assert_matches!(result.first_error(), Some(ExpressionError::ConsecutiveOperators));
    }

    #[test]
    fn test_unclosed_call_reported_by_syntax_stage() {
        let result = validate("ABS(1 + 2");
        assert_eq!(result.messages(), vec!["Missing 1 right parentheses"]);
    }

    #[test]
    fn test_nested_brace_resolution() {
        let result = validate("{SUM{AVERAGE}}");
        assert_eq!(
            result.messages(),
            vec!["Nested braces are not allowed: {SUM{AVERAGE}"]
        );
    }

    #[test]
    fn test_validity_matches_errors() {
        for expression in ["", "1 + 2", "1 +", "{X}", "F(1)", "((", "1 @ 2", "{SUM} * ABS(1)"] {
            let result = validate(expression);
            assert_eq!(result.is_valid(), result.errors().is_empty());
        }
    }

    #[test]
    fn test_deterministic() {
        let expression = "MAX_FUNC(ABS(), {FOO}, 2 +) @";
        assert_eq!(validate(expression), validate(expression));
    }

    #[test]
    fn test_injected_tables() {
        let tokens = CustomTokenSet::new(["REVENUE", "COST"]);
        let functions = FunctionRuleTable::empty().with_rule("MARGIN", Arity::exactly(2));

        assert!(validate_with("MARGIN({REVENUE}, {COST}) * 100", &tokens, &functions).is_valid());
        assert!(!validate_with("{SUM}", &tokens, &functions).is_valid());
        assert!(!validate_with("ABS(1)", &tokens, &functions).is_valid());
    }

    #[test]
    fn test_validator_is_shareable_across_threads() {
        let validator = std::sync::Arc::new(ExpressionValidator::with_preferences(
            RuleSet::defaults(),
            ValidationPreferences::quiet(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let validator = validator.clone();
                std::thread::spawn(move || validator.validate(&format!("ABS({}) + {{SUM}}", i)))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_valid());
        }
    }

    #[test]
    fn test_validate_with_rules_matches_validator() {
        let rules = RuleSet::defaults();
        let validator = ExpressionValidator::with_preferences(rules.clone(), ValidationPreferences::quiet());
        for expression in ["1 + {SUM}", "POW(1)", "1 ++ 2"] {
            assert_eq!(validate_with_rules(expression, &rules), validator.validate(expression));
        }
    }

    #[test]
    fn test_outcome_reaches_global_logger() {
        use crate::logging::{self, LoggingService, MemoryLogger};
        use std::path::PathBuf;
        use std::sync::{Arc, OnceLock};

        static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
        let memory = MEMORY.get_or_init(|| {
            let memory = Arc::new(MemoryLogger::new());
            let service = LoggingService::new(memory.clone(), LogLevel::Info);
            let _ = logging::init_global_logging_with_service(Arc::new(service));
            memory
        });
        assert!(logging::is_initialized());

        let validator = ExpressionValidator::with_preferences(
            RuleSet::defaults(),
            ValidationPreferences {
                log_stage_details: false,
                log_expression_text: true,
            },
        );
        let expression = "POW(7, 7, 7) + 424242";
        logging::with_source_context(PathBuf::from("outcome.txt"), 9, || {
            validator.validate(expression)
        });

        let events = memory.events();
        let event = events
            .iter()
            .find(|e| e.context.get("expression").map(String::as_str) == Some(expression))
            .expect("outcome event logged");
        assert_eq!(event.message, "Expression invalid");
        assert_eq!(event.context.get("stage").map(String::as_str), Some("functions"));
        assert_eq!(event.context.get("line").map(String::as_str), Some("9"));
    }

    #[test]
    fn test_truncate_expression() {
        let long = "1+".repeat(MAX_LOGGED_EXPRESSION_LENGTH);
        let truncated = truncate_expression(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), MAX_LOGGED_EXPRESSION_LENGTH + 3);
        assert_eq!(truncate_expression("1 + 2"), "1 + 2");
    }
}
