//! Open access.

use super::Authentication;
use crate::error::AppError;
use crate::extractors::InputOutput;
use async_trait::async_trait;

/// No authentication: every request is let through.
#[derive(Clone, Copy, Debug, Default)]
pub struct Public;

#[async_trait]
impl Authentication for Public {
    async fn authenticate(&self, _input_output: &mut InputOutput) -> Result<bool, AppError> {
        Ok(true)
    }
}
