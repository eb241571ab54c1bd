//! Custom token stage: `{NAME}` spans checked against the whitelist

use super::error::ExpressionError;
use crate::rules::CustomTokenSet;
use crate::utils::Span;

/// Brace spans found in one expression, with their diagnostics
#[derive(Debug, Clone, Default)]
pub struct BraceScan {
    pub spans: Vec<Span>,
    pub errors: Vec<ExpressionError>,
}

/// Scan `{...}` spans and the global brace balance.
///
/// A span runs from `{` to the next `}`. A `{` with no later `}` ends the
/// scan. Braces that differ in count, or that close before they open,
/// produce one `UnmatchedBraces` error carrying both counts.
pub fn check_braces(chars: &[char], tokens: &CustomTokenSet) -> BraceScan {
    let mut scan = BraceScan::default();
    let mut cursor = 0;

    while let Some(open) = find_from(chars, cursor, '{') {
        let Some(close) = find_from(chars, open + 1, '}') else {
            break;
        };

        let raw = &chars[open + 1..close];
        if raw.contains(&'{') {
            scan.errors.push(ExpressionError::NestedBraces {
                content: raw.iter().collect(),
            });
        } else {
            let content: String = raw.iter().collect();
            let name = content.trim();
            if name.is_empty() {
                scan.errors.push(ExpressionError::EmptyBraces);
            } else if !tokens.contains(name) {
                scan.errors.push(ExpressionError::UnknownCustomToken {
                    name: name.to_string(),
                });
            }
        }

        scan.spans.push(Span::new(open, close + 1));
        cursor = close + 1;
    }

    let open = chars.iter().filter(|&&c| c == '{').count();
    let close = chars.iter().filter(|&&c| c == '}').count();
    if open != close || !pairs_in_order(chars) {
        scan.errors
            .push(ExpressionError::UnmatchedBraces { open, close });
    }

    scan
}

/// Every `}` closes an earlier `{` and nothing is left open
fn pairs_in_order(chars: &[char]) -> bool {
    let mut depth = 0usize;
    for &c in chars {
        match c {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

fn find_from(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&c| c == target)
        .map(|i| from + i)
}
