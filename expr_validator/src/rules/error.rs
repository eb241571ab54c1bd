//! Rule file loading errors

use crate::logging::{codes, Code};

#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("Cannot read rule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule file: {message}")]
    Parse { message: String },

    #[error("Function {name}() has max_args {max} below min_args {min}")]
    InvalidArity { name: String, min: usize, max: usize },

    #[error("Invalid custom token name: '{name}'")]
    InvalidTokenName { name: String },

    #[error("Invalid function name: '{name}'")]
    InvalidFunctionName { name: String },

    #[error("Rule file too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Too many {kind}: {count} (max: {max})")]
    TooManyRules {
        kind: &'static str,
        count: usize,
        max: usize,
    },
}

impl RuleLoadError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::rules::RULE_FILE_IO,
            Self::Parse { .. } => codes::rules::RULE_FILE_PARSE,
            Self::InvalidArity { .. } => codes::rules::INVALID_ARITY,
            Self::InvalidTokenName { .. } | Self::InvalidFunctionName { .. } => {
                codes::rules::INVALID_RULE_NAME
            }
            Self::FileTooLarge { .. } => codes::rules::RULE_FILE_TOO_LARGE,
            Self::TooManyRules { .. } => codes::rules::TOO_MANY_RULES,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

impl From<toml::de::Error> for RuleLoadError {
    fn from(error: toml::de::Error) -> Self {
        Self::Parse {
            message: error.to_string(),
        }
    }
}
