//! JWT bearer authentication verified against a published JSON Web Key Set.

use super::{bearer_token, Authentication};
use crate::error::{AppError, BackendError, ClientError};
use crate::extractors::InputOutput;
use async_trait::async_trait;
use jsonwebtoken::{jwk::Jwk, Algorithm, DecodingKey, Validation};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Where the key set comes from.
#[async_trait]
pub trait JwksSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, BackendError>;
}

#[async_trait]
impl JwksSource for reqwest::Client {
    async fn fetch(&self, url: &str) -> Result<Value, BackendError> {
        Ok(self.get(url).send().await?.error_for_status()?.json().await?)
    }
}

/// Token inspection and verification.
pub trait TokenDecoder: Send + Sync {
    /// `kid` from the token's header, read without verifying the token.
    fn key_id(&self, token: &str) -> Result<Option<Value>, ClientError>;

    /// Verify `token` with `key` (one JWKS entry) and return its claims. The audience and
    /// issuer are only checked when given.
    fn decode(
        &self,
        token: &str,
        key: &Value,
        algorithms: &[String],
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<Map<String, Value>, String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonWebTokenDecoder;

impl TokenDecoder for JsonWebTokenDecoder {
    fn key_id(&self, token: &str) -> Result<Option<Value>, ClientError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| ClientError::new(format!("Invalid JWT header: {}", e)))?;
        Ok(header.kid.map(Value::String))
    }

    fn decode(
        &self,
        token: &str,
        key: &Value,
        algorithms: &[String],
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<Map<String, Value>, String> {
        let jwk: Jwk = serde_json::from_value(key.clone()).map_err(|e| format!("invalid JWK: {}", e))?;
        let decoding_key = DecodingKey::from_jwk(&jwk).map_err(|e| e.to_string())?;
        let algorithms = algorithms
            .iter()
            .map(|a| Algorithm::from_str(a).map_err(|e| format!("{}: {}", a, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = algorithms.first() else {
            return Err("no algorithms configured".to_string());
        };
        let mut validation = Validation::new(*first);
        validation.algorithms = algorithms;
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        jsonwebtoken::decode::<Map<String, Value>>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| e.to_string())
    }
}

/// Bearer JWTs checked against the keys published at `jwks_url`. On success the token's
/// claims become the request's authorization data.
pub struct Jwks {
    jwks_url: String,
    audience: Option<String>,
    issuer: Option<String>,
    algorithms: Vec<String>,
    source: Arc<dyn JwksSource>,
    decoder: Arc<dyn TokenDecoder>,
    cache: RwLock<Option<Arc<Value>>>,
}

impl fmt::Debug for Jwks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwks")
            .field("jwks_url", &self.jwks_url)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("algorithms", &self.algorithms)
            .finish()
    }
}

/// Key ids may be published as strings or numbers; compare them loosely.
fn same_kid(a: &Value, b: &Value) -> bool {
    a == b || crate::column_types::condition_value(a) == crate::column_types::condition_value(b)
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Storage("jwks cache lock poisoned".into())
}

impl Jwks {
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Jwks {
            jwks_url: jwks_url.into(),
            audience: None,
            issuer: None,
            algorithms: vec!["RS256".to_string()],
            source: Arc::new(reqwest::Client::new()),
            decoder: Arc::new(JsonWebTokenDecoder),
            cache: RwLock::new(None),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_algorithms<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_jwks_source(mut self, source: Arc<dyn JwksSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_token_decoder(mut self, decoder: Arc<dyn TokenDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// The key set, fetched on first use and cached until `clear_credential_cache`.
    async fn key_set(&self) -> Result<Arc<Value>, BackendError> {
        let cached = self.cache.read().map_err(poisoned)?.clone();
        if let Some(jwks) = cached {
            return Ok(jwks);
        }
        tracing::debug!(url = %self.jwks_url, "fetching jwks");
        let jwks = Arc::new(self.source.fetch(&self.jwks_url).await?);
        *self.cache.write().map_err(poisoned)? = Some(jwks.clone());
        Ok(jwks)
    }
}

#[async_trait]
impl Authentication for Jwks {
    async fn authenticate(&self, input_output: &mut InputOutput) -> Result<bool, AppError> {
        let token = bearer_token(input_output, "Bearer ")?;
        let kid = self.decoder.key_id(&token)?;
        let jwks = self.key_set().await?;
        let key = kid
            .as_ref()
            .and_then(|kid| {
                jwks.get("keys")
                    .and_then(Value::as_array)
                    .and_then(|keys| keys.iter().find(|k| k.get("kid").is_some_and(|k| same_kid(k, kid))))
            })
            .ok_or_else(|| ClientError::new("No matching keys found"))?;

        match self.decoder.decode(
            &token,
            key,
            &self.algorithms,
            self.audience.as_deref(),
            self.issuer.as_deref(),
        ) {
            Ok(claims) => {
                input_output.set_authorization_data(claims);
                Ok(true)
            }
            Err(reason) => {
                tracing::warn!(%reason, "jwt verification failed");
                Ok(false)
            }
        }
    }

    fn clear_credential_cache(&self) {
        if let Ok(mut jwks) = self.cache.write() {
            *jwks = None;
        }
    }

    fn documentation_security_scheme(&self) -> Option<Value> {
        Some(json!({
            "type": "http",
            "description": "JWT bearer authentication",
            "scheme": "bearer",
            "bearerFormat": "JWT",
        }))
    }

    fn documentation_security_scheme_name(&self) -> Option<String> {
        Some("jwt".to_string())
    }
}
