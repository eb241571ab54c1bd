//! Diagnostics produced by the validation stages
//!
//! Every variant renders to the exact message shown to users; the
//! `Display` text is part of the public contract.

use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The stage that produced a diagnostic, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Braces,
    Functions,
    Syntax,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Braces => "braces",
            Stage::Functions => "functions",
            Stage::Syntax => "syntax",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    // Braces
    #[error("Braces cannot be empty")]
    EmptyBraces,

    #[error("Unknown custom expression: {{{name}}}")]
    UnknownCustomToken { name: String },

    #[error("Nested braces are not allowed: {{{content}}}")]
    NestedBraces { content: String },

    #[error("Unmatched braces (open: {open}, close: {close})")]
    UnmatchedBraces { open: usize, close: usize },

    // Functions
    #[error("Unauthorized function: {name}() - only predefined functions allowed")]
    UnauthorizedFunction { name: String },

    #[error("{name}() contains empty parameters or format errors")]
    EmptyParameters { name: String },

    #[error("{name}() insufficient parameters: requires at least {min}, provided {provided}")]
    InsufficientParameters {
        name: String,
        min: usize,
        provided: usize,
    },

    #[error("{name}() too many parameters: maximum {max}, provided {provided}")]
    TooManyParameters {
        name: String,
        max: usize,
        provided: usize,
    },

    #[error("{name}() parameter {index} format error")]
    ParameterFormat { name: String, index: usize },

    // Residual syntax
    #[error("Expression cannot start with \"*\" or \"/\"")]
    LeadingMultiplicative,

    #[error("Expression cannot start with \"+\"")]
    LeadingPlus,

    #[error("Expression cannot end with an operator")]
    TrailingOperator,

    #[error("Cannot have consecutive operators")]
    ConsecutiveOperators,

    #[error("Invalid operator combination")]
    InvalidOperatorCombination,

    #[error("Position {position}: extra right parenthesis")]
    ExtraRightParenthesis { position: usize },

    #[error("Missing {count} right parentheses")]
    MissingRightParentheses { count: usize },

    #[error("Cannot have empty parentheses")]
    EmptyParentheses,

    #[error("Operator cannot be directly followed by right parenthesis")]
    OperatorBeforeRightParenthesis,

    #[error("Left parenthesis cannot be directly followed by \"*\" or \"/\"")]
    LeftParenthesisMultiplicative,

    #[error("Left parenthesis cannot be directly followed by \"+\"")]
    LeftParenthesisPlus,

    #[error("Invalid number format: multiple decimal points")]
    MultipleDecimalPoints,

    #[error("Cannot have consecutive dots")]
    ConsecutiveDots,

    #[error("Invalid decimal point position")]
    InvalidDecimalPosition,

    #[error("Contains invalid characters: {}", join_chars(.chars))]
    InvalidCharacters { chars: Vec<char> },
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ExpressionError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::EmptyBraces
            | Self::UnknownCustomToken { .. }
            | Self::NestedBraces { .. }
            | Self::UnmatchedBraces { .. } => Stage::Braces,

            Self::UnauthorizedFunction { .. }
            | Self::EmptyParameters { .. }
            | Self::InsufficientParameters { .. }
            | Self::TooManyParameters { .. }
            | Self::ParameterFormat { .. } => Stage::Functions,

            _ => Stage::Syntax,
        }
    }

    /// Logging code for this diagnostic
    pub fn code(&self) -> Code {
        match self {
            Self::EmptyBraces => codes::braces::EMPTY_BRACES,
            Self::UnknownCustomToken { .. } => codes::braces::UNKNOWN_CUSTOM_TOKEN,
            Self::NestedBraces { .. } => codes::braces::NESTED_BRACES,
            Self::UnmatchedBraces { .. } => codes::braces::UNMATCHED_BRACES,
            Self::UnauthorizedFunction { .. } => codes::functions::UNAUTHORIZED_FUNCTION,
            Self::EmptyParameters { .. } => codes::functions::EMPTY_PARAMETERS,
            Self::InsufficientParameters { .. } => codes::functions::INSUFFICIENT_PARAMETERS,
            Self::TooManyParameters { .. } => codes::functions::TOO_MANY_PARAMETERS,
            Self::ParameterFormat { .. } => codes::functions::PARAMETER_FORMAT,
            Self::LeadingMultiplicative => codes::syntax::LEADING_MULTIPLICATIVE,
            Self::LeadingPlus => codes::syntax::LEADING_PLUS,
            Self::TrailingOperator => codes::syntax::TRAILING_OPERATOR,
            Self::ConsecutiveOperators => codes::syntax::CONSECUTIVE_OPERATORS,
            Self::InvalidOperatorCombination => codes::syntax::INVALID_OPERATOR_COMBINATION,
            Self::ExtraRightParenthesis { .. } => codes::syntax::EXTRA_RIGHT_PARENTHESIS,
            Self::MissingRightParentheses { .. } => codes::syntax::MISSING_RIGHT_PARENTHESES,
            Self::EmptyParentheses => codes::syntax::EMPTY_PARENTHESES,
            Self::OperatorBeforeRightParenthesis => {
                codes::syntax::OPERATOR_BEFORE_RIGHT_PARENTHESIS
            }
            Self::LeftParenthesisMultiplicative => codes::syntax::LEFT_PARENTHESIS_MULTIPLICATIVE,
            Self::LeftParenthesisPlus => codes::syntax::LEFT_PARENTHESIS_PLUS,
            Self::MultipleDecimalPoints => codes::syntax::MULTIPLE_DECIMAL_POINTS,
            Self::ConsecutiveDots => codes::syntax::CONSECUTIVE_DOTS,
            Self::InvalidDecimalPosition => codes::syntax::INVALID_DECIMAL_POSITION,
            Self::InvalidCharacters { .. } => codes::syntax::INVALID_CHARACTERS,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_messages() {
        assert_eq!(ExpressionError::EmptyBraces.to_string(), "Braces cannot be empty");
        assert_eq!(
            ExpressionError::UnknownCustomToken { name: "FOO".into() }.to_string(),
            "Unknown custom expression: {FOO}"
        );
        assert_eq!(
            ExpressionError::NestedBraces { content: "SUM{MAX".into() }.to_string(),
            "Nested braces are not allowed: {SUM{MAX}"
        );
        assert_eq!(
            ExpressionError::UnmatchedBraces { open: 1, close: 0 }.to_string(),
            "Unmatched braces (open: 1, close: 0)"
        );
    }

    #[test]
    fn test_function_messages() {
        assert_eq!(
            ExpressionError::InsufficientParameters {
                name: "ABS".into(),
                min: 1,
                provided: 0
            }
            .to_string(),
            "ABS() insufficient parameters: requires at least 1, provided 0"
        );
        assert_eq!(
            ExpressionError::ParameterFormat {
                name: "POW".into(),
                index: 2
            }
            .to_string(),
            "POW() parameter 2 format error"
        );
    }

    #[test]
    fn test_invalid_characters_are_joined() {
        let error = ExpressionError::InvalidCharacters {
            chars: vec!['@', '#', '$'],
        };
        assert_eq!(error.to_string(), "Contains invalid characters: @, #, $");
    }

    #[test]
    fn test_stage_and_code() {
        assert_eq!(ExpressionError::EmptyBraces.stage(), Stage::Braces);
        assert_eq!(
            ExpressionError::UnauthorizedFunction { name: "F".into() }.stage(),
            Stage::Functions
        );
        assert_eq!(ExpressionError::ConsecutiveDots.stage(), Stage::Syntax);
        assert_eq!(ExpressionError::ConsecutiveDots.code().as_str(), "E312");
        assert_eq!(ExpressionError::EmptyBraces.category(), "Braces");
        assert!(Stage::Braces < Stage::Functions && Stage::Functions < Stage::Syntax);
    }
}
