//! Residual syntax stage over the substituted skeleton
//!
//! A fixed battery of independent checks. Each one reports at most once
//! and none of them short-circuits the others.

use super::error::ExpressionError;
use crate::logging::codes;
use crate::log_error;
use regex::Regex;
use std::sync::OnceLock;

/// A lazily compiled pattern
struct Pattern {
    source: &'static str,
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| match Regex::new(self.source) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    log_error!(codes::system::INTERNAL_ERROR, "Residual pattern failed to compile",
                        "pattern" => self.source,
                        "error" => e
                    );
                    None
                }
            })
            .as_ref()
    }

    fn is_match(&self, text: &str) -> bool {
        self.regex().is_some_and(|regex| regex.is_match(text))
    }
}

static LEADING_MULTIPLICATIVE: Pattern = Pattern::new(r"^\s*[*/]");
static LEADING_PLUS: Pattern = Pattern::new(r"^\s*\+");
static TRAILING_OPERATOR: Pattern = Pattern::new(r"[+\-*/]\s*$");
static EMPTY_PARENTHESES: Pattern = Pattern::new(r"\(\s*\)");
static OPERATOR_BEFORE_RIGHT_PAREN: Pattern = Pattern::new(r"[+\-*/]\s*\)");
static LEFT_PAREN_MULTIPLICATIVE: Pattern = Pattern::new(r"\(\s*[*/]");
static LEFT_PAREN_PLUS: Pattern = Pattern::new(r"\(\s*\+");
static MULTIPLE_DECIMAL_POINTS: Pattern = Pattern::new(r"\.[0-9]*\.");
static CONSECUTIVE_DOTS: Pattern = Pattern::new(r"\.\.");
static INVALID_DECIMAL_POSITION: Pattern = Pattern::new(r"\.\s*(?:[+\-*/),]|$)");

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+-*/(){}.,_".contains(c) || c.is_whitespace()
}

/// Run every residual check over the substituted expression
pub fn check_residual(cleaned: &str) -> Vec<ExpressionError> {
    let chars: Vec<char> = cleaned.chars().collect();
    let mut errors = Vec::new();

    if LEADING_MULTIPLICATIVE.is_match(cleaned) {
        errors.push(ExpressionError::LeadingMultiplicative);
    }
    if LEADING_PLUS.is_match(cleaned) {
        errors.push(ExpressionError::LeadingPlus);
    }
    if TRAILING_OPERATOR.is_match(cleaned) {
        errors.push(ExpressionError::TrailingOperator);
    }

    let runs = classify_operator_runs(&chars);
    if runs.consecutive {
        errors.push(ExpressionError::ConsecutiveOperators);
    }
    if runs.invalid_combination {
        errors.push(ExpressionError::InvalidOperatorCombination);
    }

    errors.extend(check_parenthesis_balance(&chars));

    if EMPTY_PARENTHESES.is_match(cleaned) {
        errors.push(ExpressionError::EmptyParentheses);
    }
    if OPERATOR_BEFORE_RIGHT_PAREN.is_match(cleaned) {
        errors.push(ExpressionError::OperatorBeforeRightParenthesis);
    }
    if LEFT_PAREN_MULTIPLICATIVE.is_match(cleaned) {
        errors.push(ExpressionError::LeftParenthesisMultiplicative);
    }
    if LEFT_PAREN_PLUS.is_match(cleaned) {
        errors.push(ExpressionError::LeftParenthesisPlus);
    }
    if MULTIPLE_DECIMAL_POINTS.is_match(cleaned) {
        errors.push(ExpressionError::MultipleDecimalPoints);
    }
    if CONSECUTIVE_DOTS.is_match(cleaned) {
        errors.push(ExpressionError::ConsecutiveDots);
    }
    if INVALID_DECIMAL_POSITION.is_match(cleaned) {
        errors.push(ExpressionError::InvalidDecimalPosition);
    }

    let invalid = invalid_characters(&chars);
    if !invalid.is_empty() {
        errors.push(ExpressionError::InvalidCharacters { chars: invalid });
    }

    errors
}

#[derive(Debug, Default, PartialEq, Eq)]
struct OperatorRuns {
    consecutive: bool,
    invalid_combination: bool,
}

/// Classify runs of operators separated only by whitespace.
///
/// A binary operator followed by a unary minus (`1 + -2`, `1 --2`) is the
/// only legal run of two. Longer runs are always flagged.
fn classify_operator_runs(chars: &[char]) -> OperatorRuns {
    let mut result = OperatorRuns::default();
    let mut i = 0;

    while i < chars.len() {
        if !is_operator(chars[i]) {
            i += 1;
            continue;
        }

        // (operator, preceded by whitespace within the run)
        let mut run = vec![(chars[i], false)];
        let mut j = i + 1;
        loop {
            let mut k = j;
            while k < chars.len() && chars[k].is_whitespace() {
                k += 1;
            }
            if k < chars.len() && is_operator(chars[k]) {
                run.push((chars[k], k > j));
                j = k + 1;
            } else {
                break;
            }
        }

        let signed_operand = run.len() == 2 && run[1].0 == '-';
        if run.len() > 1 && !signed_operand {
            for pair in run.windows(2) {
                let (left, _) = pair[0];
                let (right, spaced) = pair[1];
                let multiplicative = matches!(left, '*' | '/') || matches!(right, '*' | '/');
                if !spaced || multiplicative {
                    result.consecutive = true;
                } else {
                    result.invalid_combination = true;
                }
            }
        }

        i = j;
    }

    result
}

fn check_parenthesis_balance(chars: &[char]) -> Vec<ExpressionError> {
    let mut errors = Vec::new();
    let mut depth = 0usize;
    let mut reported_extra = false;

    for (position, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                if !reported_extra {
                    errors.push(ExpressionError::ExtraRightParenthesis { position });
                    reported_extra = true;
                }
            }
            ')' => depth -= 1,
            _ => {}
        }
    }

    if depth > 0 {
        errors.push(ExpressionError::MissingRightParentheses { count: depth });
    }

    errors
}

/// Disallowed characters in first-encounter order, without duplicates
fn invalid_characters(chars: &[char]) -> Vec<char> {
    let mut found = Vec::new();
    for &c in chars {
        if !is_allowed(c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(cleaned: &str) -> Vec<String> {
        check_residual(cleaned)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        for pattern in [
            &LEADING_MULTIPLICATIVE,
            &LEADING_PLUS,
            &TRAILING_OPERATOR,
            &EMPTY_PARENTHESES,
            &OPERATOR_BEFORE_RIGHT_PAREN,
            &LEFT_PAREN_MULTIPLICATIVE,
            &LEFT_PAREN_PLUS,
            &MULTIPLE_DECIMAL_POINTS,
            &CONSECUTIVE_DOTS,
            &INVALID_DECIMAL_POSITION,
        ] {
            assert!(pattern.regex().is_some(), "{}", pattern.source);
        }
    }

    #[test]
    fn test_clean_arithmetic() {
        for expression in [
            "1 + 2",
            "(1 + 2) * 3 / 4",
            "1.5 + 2.3 * 0.5",
            "-1 + 2",
            "1 + -2",
            "1 - -2",
            "1 * -2",
            "1 --2",
            "1 + .5",
            "(-1)",
            "x + y_2",
        ] {
            assert!(check_residual(expression).is_empty(), "{}", expression);
        }
    }

    #[test]
    fn test_leading_operators() {
        assert_eq!(messages("* 1 + 2"), vec!["Expression cannot start with \"*\" or \"/\""]);
        assert_eq!(messages("/ 1 + 2"), vec!["Expression cannot start with \"*\" or \"/\""]);
        assert_eq!(messages("+ 1 + 2"), vec!["Expression cannot start with \"+\""]);
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(messages("1 + 2 +"), vec!["Expression cannot end with an operator"]);
        assert_eq!(messages("1 + 2 -  "), vec!["Expression cannot end with an operator"]);
    }

    #[test]
    fn test_operator_runs() {
        assert_eq!(messages("1 ++ 2"), vec!["Cannot have consecutive operators"]);
        assert_eq!(messages("1 ** 2"), vec!["Cannot have consecutive operators"]);
        assert_eq!(messages("1 // 2"), vec!["Cannot have consecutive operators"]);
        assert_eq!(messages("1 * / 2"), vec!["Cannot have consecutive operators"]);
        assert_eq!(messages("1 + + 2"), vec!["Invalid operator combination"]);
        assert_eq!(messages("1 - + 2"), vec!["Invalid operator combination"]);
        assert_eq!(
            messages("1 ++ - 2"),
            vec!["Cannot have consecutive operators", "Invalid operator combination"]
        );
    }

    #[test]
    fn test_operator_runs_report_once() {
        assert_eq!(
            messages("1 ++ 2 ** 3"),
            vec!["Cannot have consecutive operators"]
        );
    }

    #[test]
    fn test_parenthesis_balance() {
        assert_eq!(messages("(1 + 2"), vec!["Missing 1 right parentheses"]);
        assert_eq!(messages("((1"), vec!["Missing 2 right parentheses"]);
        assert_eq!(messages("1 + 2) * 3"), vec!["Position 5: extra right parenthesis"]);
        assert_eq!(
            messages("1)) + (2"),
            vec!["Position 1: extra right parenthesis", "Missing 1 right parentheses"]
        );
    }

    #[test]
    fn test_parenthesis_contents() {
        assert_eq!(messages("1 + () + 2"), vec!["Cannot have empty parentheses"]);
        assert_eq!(
            messages("1 + (2 +)"),
            vec!["Operator cannot be directly followed by right parenthesis"]
        );
        assert_eq!(
            messages("1 + (+ 2)"),
            vec!["Left parenthesis cannot be directly followed by \"+\""]
        );
        assert_eq!(
            messages("1 + ( * 2)"),
            vec!["Left parenthesis cannot be directly followed by \"*\" or \"/\""]
        );
    }

    #[test]
    fn test_decimal_points() {
        assert_eq!(
            messages("1.5.2 + 3"),
            vec!["Invalid number format: multiple decimal points"]
        );
        assert_eq!(
            messages("1..5 + 3"),
            vec![
                "Invalid number format: multiple decimal points",
                "Cannot have consecutive dots"
            ]
        );
        assert_eq!(messages("1. + 2"), vec!["Invalid decimal point position"]);
        assert_eq!(messages("1 + 2."), vec!["Invalid decimal point position"]);
        assert_eq!(messages("(1.) * 2"), vec!["Invalid decimal point position"]);
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(messages("1 + 2 @ 3"), vec!["Contains invalid characters: @"]);
        assert_eq!(
            messages("1 # 2 @ 3 # 4 $"),
            vec!["Contains invalid characters: #, @, $"]
        );
        assert_eq!(messages("1 ^ 2"), vec!["Contains invalid characters: ^"]);
        assert_eq!(messages("1 +\t2"), Vec::<String>::new());
    }

    #[test]
    fn test_checks_are_independent() {
        assert_eq!(
            messages("* (1 + 2 @"),
            vec![
                "Expression cannot start with \"*\" or \"/\"",
                "Missing 1 right parentheses",
                "Contains invalid characters: @",
            ]
        );
    }
}
