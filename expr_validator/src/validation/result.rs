//! Aggregated validation outcome

use super::error::{ExpressionError, Stage};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Ordered diagnostics for one expression.
///
/// Validity is derived from the diagnostics, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: Vec<ExpressionError>,
}

impl ValidationResult {
    /// A result with no diagnostics
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn from_errors(errors: Vec<ExpressionError>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ExpressionError] {
        &self.errors
    }

    /// Rendered messages in report order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn first_error(&self) -> Option<&ExpressionError> {
        self.errors.first()
    }

    pub fn stage_of_first_error(&self) -> Option<Stage> {
        self.first_error().map(ExpressionError::stage)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Whether any diagnostic carries the given message
    pub fn has_message(&self, message: &str) -> bool {
        self.errors.iter().any(|e| e.to_string() == message)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &self.messages())?;
        state.end()
    }
}
