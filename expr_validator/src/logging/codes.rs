//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for every code the validator emits, together with
//! its behavioural metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const INVALID_PREFERENCE: Code = Code::new("ERR003");
}

/// Brace-token stage codes
pub mod braces {
    use super::Code;

    pub const EMPTY_BRACES: Code = Code::new("E100");
    pub const UNKNOWN_CUSTOM_TOKEN: Code = Code::new("E101");
    pub const NESTED_BRACES: Code = Code::new("E102");
    pub const UNMATCHED_BRACES: Code = Code::new("E103");
}

/// Function-call stage codes
pub mod functions {
    use super::Code;

    pub const UNAUTHORIZED_FUNCTION: Code = Code::new("E200");
    pub const EMPTY_PARAMETERS: Code = Code::new("E201");
    pub const INSUFFICIENT_PARAMETERS: Code = Code::new("E202");
    pub const TOO_MANY_PARAMETERS: Code = Code::new("E203");
    pub const PARAMETER_FORMAT: Code = Code::new("E204");
}

/// Residual syntax stage codes
pub mod syntax {
    use super::Code;

    pub const LEADING_MULTIPLICATIVE: Code = Code::new("E300");
    pub const LEADING_PLUS: Code = Code::new("E301");
    pub const TRAILING_OPERATOR: Code = Code::new("E302");
    pub const CONSECUTIVE_OPERATORS: Code = Code::new("E303");
    pub const INVALID_OPERATOR_COMBINATION: Code = Code::new("E304");
    pub const EXTRA_RIGHT_PARENTHESIS: Code = Code::new("E305");
    pub const MISSING_RIGHT_PARENTHESES: Code = Code::new("E306");
    pub const EMPTY_PARENTHESES: Code = Code::new("E307");
    pub const OPERATOR_BEFORE_RIGHT_PARENTHESIS: Code = Code::new("E308");
    pub const LEFT_PARENTHESIS_MULTIPLICATIVE: Code = Code::new("E309");
    pub const LEFT_PARENTHESIS_PLUS: Code = Code::new("E310");
    pub const MULTIPLE_DECIMAL_POINTS: Code = Code::new("E311");
    pub const CONSECUTIVE_DOTS: Code = Code::new("E312");
    pub const INVALID_DECIMAL_POSITION: Code = Code::new("E313");
    pub const INVALID_CHARACTERS: Code = Code::new("E314");
}

/// Rule table loading codes
pub mod rules {
    use super::Code;

    pub const RULE_FILE_IO: Code = Code::new("E400");
    pub const RULE_FILE_PARSE: Code = Code::new("E401");
    pub const INVALID_ARITY: Code = Code::new("E402");
    pub const INVALID_RULE_NAME: Code = Code::new("E403");
    pub const RULE_FILE_TOO_LARGE: Code = Code::new("E404");
    pub const TOO_MANY_RULES: Code = Code::new("E405");
}

/// Batch processing codes
pub mod batch {
    use super::Code;

    pub const BATCH_IO: Code = Code::new("E500");
    pub const BATCH_FILE_TOO_LARGE: Code = Code::new("E501");
    pub const TOO_MANY_EXPRESSIONS: Code = Code::new("E502");
    pub const WORKER_FAILURE: Code = Code::new("E503");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const EXPRESSION_INVALID: Code = Code::new("W100");
    pub const SYNTAX_STAGE_SKIPPED: Code = Code::new("W101");
    pub const BATCH_STOPPED_EARLY: Code = Code::new("W500");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const EXPRESSION_VALID: Code = Code::new("I100");
    pub const BRACE_CHECK_PASSED: Code = Code::new("I101");
    pub const FUNCTION_CHECK_PASSED: Code = Code::new("I102");
    pub const SYNTAX_CHECK_PASSED: Code = Code::new("I103");
    pub const RULES_LOADED: Code = Code::new("I400");
    pub const BATCH_COMPLETED: Code = Code::new("I500");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

// (code, category, severity, recoverable, description, recommended action)
type MetadataRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const METADATA_TABLE: &[MetadataRow] = &[
    // System
    ("ERR001", "System", Severity::Critical, false,
        "Critical internal error",
        "File a bug report with the failing input"),
    ("ERR002", "System", Severity::Critical, false,
        "Logging or configuration initialization failed",
        "Check EXPR_* environment variables and the build profile"),
    ("ERR003", "System", Severity::High, true,
        "Malformed runtime preference value",
        "Correct the EXPR_* environment variable"),
    // Braces
    ("E100", "Braces", Severity::Medium, true,
        "A brace pair contains no token name",
        "Put a custom token name between the braces or remove them"),
    ("E101", "Braces", Severity::Medium, true,
        "Brace content is not a whitelisted custom token",
        "Use one of the configured custom tokens"),
    ("E102", "Braces", Severity::Medium, true,
        "A brace pair contains another opening brace",
        "Custom tokens cannot be nested; close each brace before opening another"),
    ("E103", "Braces", Severity::Medium, true,
        "Opening and closing brace counts differ",
        "Balance every '{' with a '}'"),
    // Functions
    ("E200", "Functions", Severity::High, true,
        "Call to a function that is not in the rule table",
        "Use one of the predefined functions"),
    ("E201", "Functions", Severity::Medium, true,
        "A function call has an empty parameter",
        "Remove stray commas or fill in the missing parameter"),
    ("E202", "Functions", Severity::Medium, true,
        "A function call has fewer parameters than its rule allows",
        "Add the missing parameters"),
    ("E203", "Functions", Severity::Medium, true,
        "A function call has more parameters than its rule allows",
        "Remove the extra parameters"),
    ("E204", "Functions", Severity::Medium, true,
        "A function parameter starts or ends with a dangling operator",
        "Complete the parameter expression"),
    // Syntax
    ("E300", "Syntax", Severity::Medium, true,
        "Expression begins with a multiplicative operator",
        "Start the expression with an operand"),
    ("E301", "Syntax", Severity::Low, true,
        "Expression begins with a unary plus",
        "Remove the leading '+'"),
    ("E302", "Syntax", Severity::Medium, true,
        "Expression ends with an operator",
        "Add the missing operand"),
    ("E303", "Syntax", Severity::Medium, true,
        "Two operators appear without an operand between them",
        "Remove the extra operator"),
    ("E304", "Syntax", Severity::Medium, true,
        "Whitespace-separated sign operators that do not form a signed number",
        "Write signed operands as '+ -2' or remove the duplicate sign"),
    ("E305", "Syntax", Severity::Medium, true,
        "A ')' appears with no matching '('",
        "Remove the extra ')' or add the missing '('"),
    ("E306", "Syntax", Severity::Medium, true,
        "One or more '(' are never closed",
        "Add the missing ')'"),
    ("E307", "Syntax", Severity::Medium, true,
        "Parentheses with nothing inside",
        "Remove the empty parentheses"),
    ("E308", "Syntax", Severity::Medium, true,
        "An operator directly precedes ')'",
        "Add the missing operand before ')'"),
    ("E309", "Syntax", Severity::Medium, true,
        "A '(' is directly followed by '*' or '/'",
        "Add an operand after '('"),
    ("E310", "Syntax", Severity::Low, true,
        "A '(' is directly followed by '+'",
        "Remove the '+' after '('"),
    ("E311", "Syntax", Severity::Medium, true,
        "A number contains more than one decimal point",
        "Keep a single decimal point per number"),
    ("E312", "Syntax", Severity::Medium, true,
        "Two decimal points appear next to each other",
        "Remove the duplicate '.'"),
    ("E313", "Syntax", Severity::Medium, true,
        "A decimal point is not followed by digits",
        "Add digits after the decimal point or remove it"),
    ("E314", "Syntax", Severity::Medium, true,
        "Expression contains characters outside the allowed set",
        "Remove the listed characters"),
    // Rules
    ("E400", "Rules", Severity::High, false,
        "Rule file could not be read",
        "Check the rule file path and permissions"),
    ("E401", "Rules", Severity::High, false,
        "Rule file is not valid TOML for the rule schema",
        "Fix the reported TOML error"),
    ("E402", "Rules", Severity::High, false,
        "A function rule has max_args below min_args",
        "Raise max_args or lower min_args"),
    ("E403", "Rules", Severity::High, false,
        "A token or function name is not usable in expressions",
        "Use identifier-style names without braces or whitespace"),
    ("E404", "Rules", Severity::High, false,
        "Rule file exceeds the compile-time size limit",
        "Split the rule file or raise the limit in the build profile"),
    ("E405", "Rules", Severity::High, false,
        "Rule table exceeds the compile-time entry limit",
        "Reduce the number of rules"),
    // Batch
    ("E500", "Batch", Severity::High, false,
        "Expression file could not be read",
        "Check the file path and permissions"),
    ("E501", "Batch", Severity::High, false,
        "Expression file exceeds the compile-time size limit",
        "Split the file into smaller batches"),
    ("E502", "Batch", Severity::High, false,
        "Expression file holds more expressions than allowed",
        "Split the file or lower the expression count"),
    ("E503", "Batch", Severity::Critical, false,
        "A batch worker thread failed",
        "Re-run sequentially with --threads 1 and report the failure"),
    // Warnings
    ("W100", "Validation", Severity::Low, true,
        "Expression failed validation",
        "Review the reported diagnostics"),
    ("W101", "Validation", Severity::Low, true,
        "Residual syntax checks skipped because structural checks failed",
        "Fix brace and function diagnostics first"),
    ("W500", "Batch", Severity::Low, true,
        "Batch stopped at the first invalid expression",
        "Disable fail-fast to validate every expression"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        METADATA_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, description, recommended_action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            description,
                            recommended_action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if the condition behind a code is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
