//! Auth0-style JWT bearer authentication against a domain's published JWKS.

use super::jwks::{Jwks, JwksSource, TokenDecoder};
use super::Authentication;
use crate::error::AppError;
use crate::extractors::InputOutput;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// A [`Jwks`] whose key set, issuer and authorization URL all derive from the Auth0 domain.
#[derive(Debug)]
pub struct Auth0Jwks {
    auth0_domain: String,
    jwks: Jwks,
}

impl Auth0Jwks {
    pub fn new(auth0_domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let auth0_domain = auth0_domain.into().trim_end_matches('/').to_string();
        let jwks = Jwks::new(format!("https://{}/.well-known/jwks.json", auth0_domain))
            .with_audience(audience)
            .with_issuer(format!("https://{}/", auth0_domain));
        Auth0Jwks { auth0_domain, jwks }
    }

    pub fn with_algorithms<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jwks = self.jwks.with_algorithms(algorithms);
        self
    }

    pub fn with_jwks_source(mut self, source: Arc<dyn JwksSource>) -> Self {
        self.jwks = self.jwks.with_jwks_source(source);
        self
    }

    pub fn with_token_decoder(mut self, decoder: Arc<dyn TokenDecoder>) -> Self {
        self.jwks = self.jwks.with_token_decoder(decoder);
        self
    }

    pub fn jwks_url(&self) -> &str {
        self.jwks.jwks_url()
    }
}

#[async_trait]
impl Authentication for Auth0Jwks {
    async fn authenticate(&self, input_output: &mut InputOutput) -> Result<bool, AppError> {
        self.jwks.authenticate(input_output).await
    }

    fn clear_credential_cache(&self) {
        self.jwks.clear_credential_cache();
    }

    fn documentation_security_scheme(&self) -> Option<Value> {
        Some(json!({
            "type": "oauth2",
            "description": "Authentication with Auth0",
            "name": "authorization",
            "in": "header",
            "scheme": "bearer",
            "bearerFormat": "JWT",
            "flows": {
                "implicit": {
                    "authorizationUrl": format!("https://{}/authorize", self.auth0_domain),
                    "scopes": {},
                }
            },
        }))
    }

    /// First label of the domain: `example` for `example.com`.
    fn documentation_security_scheme_name(&self) -> Option<String> {
        self.auth0_domain.split('.').next().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::jwks::fakes::{FakeDecoder, FakeJwks};

    fn auth(source: Arc<FakeJwks>, decoder: Arc<FakeDecoder>) -> Auth0Jwks {
        Auth0Jwks::new("example.com", "sup")
            .with_jwks_source(source)
            .with_token_decoder(decoder)
    }

    #[tokio::test]
    async fn success() {
        let source = Arc::new(FakeJwks::default());
        let decoder = Arc::new(FakeDecoder::with_kid(json!(3)));
        let auth0 = auth(source.clone(), decoder.clone());
        let mut io = InputOutput::new().with_header("Authorization", "Bearer asdfqwer");

        assert!(auth0.authenticate(&mut io).await.unwrap());
        assert_eq!(
            vec!["https://example.com/.well-known/jwks.json".to_string()],
            *source.urls.lock().unwrap()
        );
        assert_eq!(
            vec![(
                "asdfqwer".to_string(),
                json!({"kid": 3}),
                vec!["RS256".to_string()],
                Some("sup".to_string()),
                Some("https://example.com/".to_string())
            )],
            *decoder.decoded.lock().unwrap()
        );
        assert_eq!(json!({"id": 5}), Value::Object(io.authorization_data().clone()));

        auth0.authenticate(&mut io).await.unwrap();
        assert_eq!(1, source.urls.lock().unwrap().len());
        auth0.clear_credential_cache();
        auth0.authenticate(&mut io).await.unwrap();
        assert_eq!(2, source.urls.lock().unwrap().len());
    }

    #[tokio::test]
    async fn key_mismatch() {
        let auth0 = auth(Arc::new(FakeJwks::default()), Arc::new(FakeDecoder::with_kid(json!(5))));
        let mut io = InputOutput::new().with_header("Authorization", "Bearer asdfqwer");
        let err = auth0.authenticate(&mut io).await.unwrap_err();
        assert_eq!("No matching keys found", err.to_string());
    }

    #[tokio::test]
    async fn string_kids_match_numeric_keys() {
        let auth0 = auth(Arc::new(FakeJwks::default()), Arc::new(FakeDecoder::with_kid(json!("1"))));
        let mut io = InputOutput::new().with_header("Authorization", "Bearer asdfqwer");
        assert!(auth0.authenticate(&mut io).await.unwrap());
    }

    #[tokio::test]
    async fn missing_bearer() {
        let source = Arc::new(FakeJwks::default());
        let auth0 = auth(source.clone(), Arc::new(FakeDecoder::with_kid(json!(5))));
        let mut io = InputOutput::new().with_header("Authorization", "asdfqwer");
        let err = auth0.authenticate(&mut io).await.unwrap_err();
        assert_eq!("Missing 'Bearer ' prefix in authorization header", err.to_string());
        assert!(source.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn trailing_slash_on_the_domain() {
        assert_eq!(
            "https://example.com/.well-known/jwks.json",
            Auth0Jwks::new("example.com/", "sup").jwks_url()
        );
    }

    #[test]
    fn doc() {
        let auth0 = Auth0Jwks::new("example.com", "sup");
        assert_eq!(
            Some(json!({
                "type": "oauth2",
                "description": "Authentication with Auth0",
                "name": "authorization",
                "in": "header",
                "scheme": "bearer",
                "bearerFormat": "JWT",
                "flows": {"implicit": {"authorizationUrl": "https://example.com/authorize", "scopes": {}}},
            })),
            auth0.documentation_security_scheme()
        );
        assert_eq!(Some("example".to_string()), auth0.documentation_security_scheme_name());
    }
}
