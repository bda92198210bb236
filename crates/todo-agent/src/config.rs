//! Application configuration read from the environment.

use std::fmt::{self, Debug};

use thiserror::Error as ThisError;

const API_KEY_VAR: &str = "CUSTOM_API_KEY";
const API_URL_VAR: &str = "CUSTOM_API_URL";
const MODEL_NAME_VAR: &str = "CUSTOM_MODEL_NAME";

/// Configuration errors.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum Error {
    /// A required environment variable is not set.
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
}

/// Settings for reaching the model gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Key sent in the `api-key` header.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_url: String,
    /// Name of the model to use.
    pub model_name: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| {
            lookup(name).ok_or(Error::MissingVar(name))
        };
        Ok(Self {
            api_key: var(API_KEY_VAR)?,
            api_url: var(API_URL_VAR)?,
            model_name: var(MODEL_NAME_VAR)?,
        })
    }
}

impl Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = AppConfig::from_lookup(lookup_in(&[
            ("CUSTOM_API_KEY", "secret123"),
            ("CUSTOM_API_URL", "https://gateway.example.com/v1"),
            ("CUSTOM_MODEL_NAME", "gpt-4o"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "secret123");
        assert_eq!(config.api_url, "https://gateway.example.com/v1");
        assert_eq!(config.model_name, "gpt-4o");
        assert!(!format!("{config:?}").contains("secret123"));
    }

    #[test]
    fn test_missing_var() {
        let err = AppConfig::from_lookup(lookup_in(&[
            ("CUSTOM_API_KEY", "secret123"),
            ("CUSTOM_MODEL_NAME", "gpt-4o"),
        ]))
        .unwrap_err();
        assert_eq!(err, Error::MissingVar("CUSTOM_API_URL"));
        assert_eq!(
            err.to_string(),
            "environment variable `CUSTOM_API_URL` is not set"
        );
    }
}
