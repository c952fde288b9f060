use async_trait::async_trait;
use serde_json::Value;
use url::Url;

#[cfg(test)]
use mockall::automock;

use super::FormParams;
use crate::common::error::OfferError;

#[derive(Clone, Debug, PartialEq)]
pub struct WebResponse {
    pub status: u16,
    pub body: Value,
}

impl WebResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Session authenticated form POST transport for the community site.
///
/// Offer creation and acceptance go through here rather than the web API, and
/// both need the session id of a logged in user.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommunitySession: Send + Sync {
    fn session_id(&self) -> String;

    async fn post(
        &self,
        url: Url,
        headers: FormParams,
        form: FormParams,
    ) -> Result<WebResponse, OfferError>;
}
