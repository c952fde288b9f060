use async_trait::async_trait;
use serde_json::Value;
use strum_macros::{Display, IntoStaticStr};

#[cfg(test)]
use mockall::automock;

use super::FormParams;
use crate::common::error::OfferError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub enum HttpMethod {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

/// Authenticated JSON endpoint caller for the trade offer web API.
///
/// Implementations own the API key, the service interface prefix and any
/// timeout policy. A failed or timed out request should come back as
/// [`OfferError::Transport`] or [`OfferError::HttpStatus`]. The returned value
/// is the full decoded body, including the `response` envelope.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebApi: Send + Sync {
    async fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        version: u32,
        params: FormParams,
    ) -> Result<Value, OfferError>;
}
