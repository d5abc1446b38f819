//! Shared-secret bearer token authentication.

use super::{bearer_token, Authentication};
use crate::environment::Environment;
use crate::error::{AppError, ConfigError};
use crate::extractors::InputOutput;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Secret {
    Direct(String),
    Environment { environment: Arc<Environment>, key: String },
}

/// Shared-secret bearer authentication, usable both for incoming requests and outbound calls.
#[derive(Clone, Debug)]
pub struct SecretBearer {
    secret: Secret,
    header_prefix: String,
}

impl SecretBearer {
    pub fn new(secret: impl Into<String>) -> Self {
        SecretBearer {
            secret: Secret::Direct(secret.into()),
            header_prefix: "Bearer ".to_string(),
        }
    }

    /// Read the secret from `key` each time it is needed, so rotated values are picked up.
    pub fn from_environment(environment: Arc<Environment>, key: impl Into<String>) -> Self {
        SecretBearer {
            secret: Secret::Environment {
                environment,
                key: key.into(),
            },
            header_prefix: "Bearer ".to_string(),
        }
    }

    pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    fn secret(&self) -> Result<String, ConfigError> {
        match &self.secret {
            Secret::Direct(secret) => Ok(secret.clone()),
            Secret::Environment { environment, key } => environment.require(key),
        }
    }
}

#[async_trait]
impl Authentication for SecretBearer {
    async fn authenticate(&self, input_output: &mut InputOutput) -> Result<bool, AppError> {
        let token = bearer_token(input_output, &self.header_prefix)?;
        let secret = self.secret()?;
        if secret.is_empty() || token != secret {
            tracing::warn!("secret bearer authentication failed");
            return Ok(false);
        }
        Ok(true)
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(vec![(
            "Authorization".to_string(),
            format!("{}{}", self.header_prefix, self.secret()?),
        )])
    }

    fn documentation_security_scheme(&self) -> Option<Value> {
        Some(json!({"type": "apiKey", "name": "authorization", "in": "header"}))
    }

    fn documentation_security_scheme_name(&self) -> Option<String> {
        Some("secret_bearer".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: &str) -> InputOutput {
        InputOutput::new().with_header("authorization", header)
    }

    #[tokio::test]
    async fn checks_the_secret() {
        let auth = SecretBearer::new("sup");
        assert!(auth.authenticate(&mut request("Bearer sup")).await.unwrap());
        assert!(!auth.authenticate(&mut request("Bearer nope")).await.unwrap());
        let err = auth.authenticate(&mut request("sup")).await.unwrap_err();
        assert_eq!("Missing 'Bearer ' prefix in authorization header", err.to_string());
    }

    #[tokio::test]
    async fn reads_secret_from_environment() {
        let environment = Arc::new(Environment::from_pairs([("API_SECRET", "from-env")]));
        let auth = SecretBearer::from_environment(environment, "API_SECRET").with_header_prefix("Token ");
        assert!(auth.authenticate(&mut request("token from-env")).await.unwrap());
        assert_eq!(
            vec![("Authorization".to_string(), "Token from-env".to_string())],
            auth.headers().unwrap()
        );
    }

    #[test]
    fn missing_environment_secret_is_a_config_error() {
        let auth = SecretBearer::from_environment(Arc::new(Environment::from_pairs(Vec::<(String, String)>::new())), "NOPE");
        assert_eq!(
            "Could not find requested environment variable 'NOPE'",
            auth.headers().unwrap_err().to_string()
        );
    }

    #[test]
    fn documentation() {
        let auth = SecretBearer::new("sup");
        assert_eq!(Some("secret_bearer".to_string()), auth.documentation_security_scheme_name());
        assert_eq!(
            Some(json!({"type": "apiKey", "name": "authorization", "in": "header"})),
            auth.documentation_security_scheme()
        );
    }
}
