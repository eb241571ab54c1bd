//! Function whitelist with arity constraints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Allowed argument count for a function; `max == None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Caller guarantees `min <= max`; rule files are checked by the loader
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Check that the bounds are ordered
    pub fn is_consistent(&self) -> bool {
        self.max.map_or(true, |max| max >= self.min)
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRule {
    pub name: String,
    pub arity: Arity,
}

impl FunctionRule {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Name-keyed table of function rules, lookup only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRuleTable {
    rules: BTreeMap<String, FunctionRule>,
}

impl FunctionRuleTable {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Built-in math functions
    pub fn defaults() -> Self {
        Self::empty()
            .with_rule("ABS", Arity::exactly(1))
            .with_rule("POW", Arity::exactly(2))
            .with_rule("SQRT", Arity::exactly(1))
            .with_rule("LOG", Arity::exactly(1))
            .with_rule("SIN", Arity::exactly(1))
            .with_rule("COS", Arity::exactly(1))
            .with_rule("TAN", Arity::exactly(1))
            .with_rule("MAX_FUNC", Arity::at_least(2))
            .with_rule("MIN_FUNC", Arity::at_least(2))
    }

    /// Builder: add or replace a rule
    pub fn with_rule(mut self, name: impl Into<String>, arity: Arity) -> Self {
        let name = name.into();
        self.rules
            .insert(name.clone(), FunctionRule::new(name, arity));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &FunctionRule> {
        self.rules.values()
    }
}

impl Default for FunctionRuleTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FromIterator<FunctionRule> for FunctionRuleTable {
    fn from_iter<I: IntoIterator<Item = FunctionRule>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|rule| (rule.name.clone(), rule))
                .collect(),
        }
    }
}

/// Function names must look like identifiers so the call scanner can find them
pub fn is_valid_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
