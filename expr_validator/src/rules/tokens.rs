//! Custom token whitelist

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Token names accepted inside `{...}` when no rule file is supplied
pub const DEFAULT_CUSTOM_TOKENS: &[&str] = &["SUM", "AVERAGE", "MAX", "MIN", "COUNT", "PRODUCT"];

/// Immutable set of custom token names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomTokenSet {
    names: BTreeSet<String>,
}

impl CustomTokenSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-in aggregate tokens
    pub fn defaults() -> Self {
        Self::new(DEFAULT_CUSTOM_TOKENS.iter().copied())
    }

    /// An empty whitelist; every brace token is rejected
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns a new set with the extra names added
    pub fn with_tokens<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = self.names.clone();
        names.extend(extra.into_iter().map(Into::into));
        Self { names }
    }
}

impl Default for CustomTokenSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl<S: Into<String>> FromIterator<S> for CustomTokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Token names must be usable between braces after trimming
pub fn is_valid_token_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c == '{' || c == '}' || c.is_whitespace())
}
