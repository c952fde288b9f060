use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;
use url::Url;

use crate::common::error::OfferError;
use crate::interface::{CommunitySession, FormParams, HttpMethod, WebApi, WebResponse};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiCall {
    pub method: HttpMethod,
    pub endpoint: String,
    pub version: u32,
    pub params: FormParams,
}

impl ApiCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Web API stand-in that replays queued replies in order and records calls.
#[derive(Default)]
pub struct StubWebApi {
    replies: Mutex<VecDeque<Result<Value, OfferError>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl StubWebApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, body: Value) -> Self {
        self.push_reply(Ok(body));
        self
    }

    pub fn push_reply(&self, reply: Result<Value, OfferError>) {
        lock(&self.replies).push_back(reply);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl WebApi for StubWebApi {
    async fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        version: u32,
        params: FormParams,
    ) -> Result<Value, OfferError> {
        lock(&self.calls).push(ApiCall {
            method,
            endpoint: endpoint.to_string(),
            version,
            params,
        });
        lock(&self.replies).pop_front().unwrap_or_else(|| {
            Err(OfferError::Transport(format!(
                "No stub reply queued for {}",
                endpoint
            )))
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostCall {
    pub url: Url,
    pub headers: FormParams,
    pub form: FormParams,
}

impl PostCall {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Community session stand-in with a fixed session id.
pub struct StubCommunity {
    session_id: String,
    replies: Mutex<VecDeque<Result<WebResponse, OfferError>>>,
    posts: Mutex<Vec<PostCall>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl StubCommunity {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            replies: Mutex::new(VecDeque::new()),
            posts: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }

    /// Holds every following post until the returned gate is notified once per post.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn with_reply(self, body: Value) -> Self {
        self.push_reply(Ok(WebResponse::ok(body)));
        self
    }

    pub fn push_reply(&self, reply: Result<WebResponse, OfferError>) {
        lock(&self.replies).push_back(reply);
    }

    pub fn posts(&self) -> Vec<PostCall> {
        lock(&self.posts).clone()
    }
}

#[async_trait]
impl CommunitySession for StubCommunity {
    fn session_id(&self) -> String {
        self.session_id.clone()
    }

    async fn post(
        &self,
        url: Url,
        headers: FormParams,
        form: FormParams,
    ) -> Result<WebResponse, OfferError> {
        let target = url.to_string();
        lock(&self.posts).push(PostCall { url, headers, form });
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.replies).pop_front().unwrap_or_else(|| {
            Err(OfferError::Transport(format!(
                "No stub reply queued for {}",
                target
            )))
        })
    }
}
