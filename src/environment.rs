//! Environment lookups: the process environment, falling back to values read from a `.env` file.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct Environment {
    file_values: HashMap<String, String>,
    /// When set, the process environment is not consulted (tests).
    isolated: bool,
}

impl Environment {
    /// Process environment only.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Process environment overlaid on the key/value pairs of a `.env` file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::EnvironmentFile(format!("{}: {}", path.display(), e)))?;
        let mut file_values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::EnvironmentFile(e.to_string()))?;
            file_values.insert(key, value);
        }
        tracing::debug!(path = %path.display(), keys = file_values.len(), "loaded environment file");
        Ok(Environment {
            file_values,
            isolated: false,
        })
    }

    /// Fixed values that ignore the process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment {
            file_values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            isolated: true,
        }
    }

    /// Look up a key. A missing key is an error unless `silent` is set.
    pub fn get(&self, key: &str, silent: bool) -> Result<Option<String>, ConfigError> {
        let from_process = if self.isolated {
            None
        } else {
            std::env::var(key).ok()
        };
        match from_process.or_else(|| self.file_values.get(key).cloned()) {
            Some(value) => Ok(Some(value)),
            None if silent => Ok(None),
            None => Err(ConfigError::MissingEnvironment(key.to_string())),
        }
    }

    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key, false)?
            .ok_or_else(|| ConfigError::MissingEnvironment(key.to_string()))
    }
}
