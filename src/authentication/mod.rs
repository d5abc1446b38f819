//! Authentication schemes. A scheme decides whether a request may proceed, may attach identity
//! data to it, supplies headers for outbound calls and describes itself for the API docs.

mod auth0_jwks;
mod authorization;
mod jwks;
mod public;
mod secret_bearer;

pub use auth0_jwks::Auth0Jwks;
pub use authorization::{Authorization, ClaimEquals};
pub use jwks::{JsonWebTokenDecoder, Jwks, JwksSource, TokenDecoder};
pub use public::Public;
pub use secret_bearer::SecretBearer;

use crate::error::{AppError, ClientError, ConfigError};
use crate::extractors::InputOutput;
use async_trait::async_trait;
use serde_json::Value;

pub const AUTHORIZATION_HEADER: &str = "authorization";

#[async_trait]
pub trait Authentication: Send + Sync {
    /// `Ok(false)` means the credentials were checked and rejected. A `ClientError` means the
    /// request did not carry credentials in a usable form.
    async fn authenticate(&self, input_output: &mut InputOutput) -> Result<bool, AppError>;

    /// Headers to send when this scheme authenticates outbound requests.
    fn headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(Vec::new())
    }

    /// Forget any cached credentials so the next call fetches fresh ones.
    fn clear_credential_cache(&self) {}

    /// OpenAPI security scheme object, if the scheme is documented.
    fn documentation_security_scheme(&self) -> Option<Value> {
        None
    }

    fn documentation_security_scheme_name(&self) -> Option<String> {
        None
    }
}

/// Token from the authorization header after `prefix`, which is matched case-insensitively.
pub fn bearer_token(input_output: &InputOutput, prefix: &str) -> Result<String, ClientError> {
    let header = input_output
        .request_header(AUTHORIZATION_HEADER, true)?
        .unwrap_or_default();
    match header.get(..prefix.len()) {
        Some(start) if start.eq_ignore_ascii_case(prefix) => Ok(header[prefix.len()..].trim().to_string()),
        _ => Err(ClientError::new(format!(
            "Missing '{}' prefix in authorization header",
            prefix
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_tokens() {
        let io = InputOutput::new().with_header("Authorization", "bearer asdfqwer");
        assert_eq!("asdfqwer", bearer_token(&io, "Bearer ").unwrap());

        let io = InputOutput::new().with_header("Authorization", "asdfqwer");
        assert_eq!(
            "Missing 'Bearer ' prefix in authorization header",
            bearer_token(&io, "Bearer ").unwrap_err().to_string()
        );
        assert_eq!(
            "Missing required header 'authorization'",
            bearer_token(&InputOutput::new(), "Bearer ").unwrap_err().to_string()
        );
    }
}
