//! Function-call stage: whitelist lookup, arity and parameter shape
//!
//! Every `identifier(` in the expression is matched to its closing
//! parenthesis by depth counting. Nested calls are found by the same scan
//! because the cursor only advances past the opening parenthesis.

use super::error::ExpressionError;
use crate::rules::FunctionRuleTable;
use crate::utils::Span;

/// One call located during the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFunctionCall {
    pub name: String,
    /// Raw text between the parentheses
    pub args: String,
    /// Covers `NAME(` through the matching `)`
    pub span: Span,
}

impl ParsedFunctionCall {
    pub fn arguments(&self) -> Vec<String> {
        split_arguments(&self.args)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionScan {
    pub calls: Vec<ParsedFunctionCall>,
    pub errors: Vec<ExpressionError>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Find every matched call, ordered by start offset.
///
/// The name is the identifier run directly before `(` with any leading
/// digits dropped, so `2FOO(5)` is a call to `FOO`. A run of digits alone
/// and whitespace before `(` are not calls. Calls whose parenthesis never
/// closes are skipped; the residual stage reports the imbalance.
pub fn scan_calls(chars: &[char]) -> Vec<ParsedFunctionCall> {
    let mut calls = Vec::new();

    for (paren, _) in chars.iter().enumerate().filter(|&(_, &c)| c == '(') {
        let mut start = paren;
        while start > 0 && is_ident_char(chars[start - 1]) {
            start -= 1;
        }
        while start < paren && chars[start].is_ascii_digit() {
            start += 1;
        }
        if start == paren {
            continue;
        }

        let Some(close) = matching_paren(chars, paren) else {
            continue;
        };

        calls.push(ParsedFunctionCall {
            name: chars[start..paren].iter().collect(),
            args: chars[paren + 1..close].iter().collect(),
            span: Span::new(start, close + 1),
        });
    }

    calls
}

fn matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on top-level commas, respecting parenthesis and brace nesting.
///
/// An empty string has no arguments; `"1,"` has two, the second empty.
pub fn split_arguments(args: &str) -> Vec<String> {
    if args.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0i32;
    let mut brace_depth = 0i32;

    for c in args.chars() {
        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '{' => brace_depth += 1,
            '}' => brace_depth -= 1,
            ',' if paren_depth == 0 && brace_depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);

    parts
}

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

fn has_dangling_operator(argument: &str) -> bool {
    let starts_bad = argument.starts_with(['*', '/']);
    let ends_bad = argument.chars().last().is_some_and(is_operator);
    starts_bad || ends_bad
}

/// Check every call against the rule table
pub fn check_functions(chars: &[char], rules: &FunctionRuleTable) -> FunctionScan {
    let calls = scan_calls(chars);
    let mut errors = Vec::new();

    for call in &calls {
        check_call(call, rules, &mut errors);
    }

    FunctionScan { calls, errors }
}

fn check_call(call: &ParsedFunctionCall, rules: &FunctionRuleTable, errors: &mut Vec<ExpressionError>) {
    let Some(rule) = rules.get(&call.name) else {
        errors.push(ExpressionError::UnauthorizedFunction {
            name: call.name.clone(),
        });
        return;
    };

    let arguments = call.arguments();
    if arguments.iter().any(|a| a.trim().is_empty()) {
        errors.push(ExpressionError::EmptyParameters {
            name: call.name.clone(),
        });
        return;
    }

    let provided = arguments.len();
    if !rule.arity.accepts(provided) {
        match rule.arity.max {
            Some(max) if provided > max => errors.push(ExpressionError::TooManyParameters {
                name: call.name.clone(),
                max,
                provided,
            }),
            _ => errors.push(ExpressionError::InsufficientParameters {
                name: call.name.clone(),
                min: rule.arity.min,
                provided,
            }),
        }
    }

    for (i, argument) in arguments.iter().enumerate() {
        if has_dangling_operator(argument.trim()) {
            errors.push(ExpressionError::ParameterFormat {
                name: call.name.clone(),
                index: i + 1,
            });
        }
    }
}
