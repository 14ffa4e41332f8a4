use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WortkartenError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HJson error: {0}")]
    HJson(#[from] serde_hjson::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Invalid record '{term}': {reason}")]
    Validation { term: String, reason: String },

    #[error("Provider '{provider}' failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    #[error("No value for required field '{field}'")]
    FieldBinding { field: String },

    #[error("Cloze target '{target}' not found in \"{sentence}\"")]
    ClozeMatch { target: String, sentence: String },

    #[error("WortkartenError: {0}")]
    Custom(String),
}

impl WortkartenError {
    pub fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        WortkartenError::Storage { path: path.into(), reason: reason.to_string() }
    }

    pub fn provider(provider: impl ToString, reason: impl ToString) -> Self {
        WortkartenError::Provider {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn validation(term: impl ToString, reason: impl ToString) -> Self {
        WortkartenError::Validation { term: term.to_string(), reason: reason.to_string() }
    }
}

impl From<std::io::Error> for WortkartenError {
    fn from(error: std::io::Error) -> Self {
        WortkartenError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for WortkartenError {
    fn from(error: reqwest::Error) -> Self {
        WortkartenError::Reqwest(Box::new(error))
    }
}
