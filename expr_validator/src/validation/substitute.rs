//! Replace recognised tokens and calls with a neutral literal

use super::functions::ParsedFunctionCall;
use crate::utils::Span;

/// Literal standing in for a token or call in the residual skeleton
pub const PLACEHOLDER: char = '1';

/// Build the residual skeleton in a single left-to-right pass.
///
/// Spans enclosed by an earlier span are skipped, so a call nested inside
/// another call (or a token inside a call) disappears with its parent.
pub fn substitute(chars: &[char], braces: &[Span], calls: &[ParsedFunctionCall]) -> String {
    let mut spans: Vec<Span> = braces
        .iter()
        .copied()
        .chain(calls.iter().map(|call| call.span))
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut cleaned = String::with_capacity(chars.len());
    let mut cursor = 0;

    for span in spans {
        if span.start < cursor || span.end > chars.len() {
            continue;
        }
        cleaned.extend(&chars[cursor..span.start]);
        cleaned.push(PLACEHOLDER);
        cursor = span.end;
    }
    cleaned.extend(&chars[cursor.min(chars.len())..]);

    cleaned
}
