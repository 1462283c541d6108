//! Error types shared across Brainloop crates.

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration problems. Fatal: reported once, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key found! Set MISTRAL_API_KEY environment variable or pass --api-key.\n\
         Get your key from: https://console.mistral.ai/"
    )]
    MissingApiKey,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Failures reading or writing durable storage under the memory root.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_env_var() {
        let msg = ConfigError::MissingApiKey.to_string();
        assert!(msg.contains("MISTRAL_API_KEY"));
    }

    #[test]
    fn store_error_mentions_path() {
        let err = StoreError::io(
            "/tmp/memory/x.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/memory/x.json"));
    }
}
