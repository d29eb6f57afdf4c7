//! Scripted in-memory transport.
//!
//! Responses are queued up front and handed out in order; every request is
//! recorded so callers can assert on paths, bodies and call counts.

use crate::error::{Result, SdkError};
use crate::net::client::{HttpMethod, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn push_response(&self, body: Value) -> &Self {
        lock(&self.responses).push_back(Ok(body));
        self
    }

    /// Queue a failure for the next call.
    pub fn push_error(&self, error: SdkError) -> &Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// All requests made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn respond(&self, call: RecordedCall) -> Result<Value> {
        let path = call.path.clone();
        lock(&self.calls).push(call);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(SdkError::Transport(format!("No scripted response for {}", path))))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.respond(RecordedCall {
            method: HttpMethod::Post,
            path: path.to_string(),
            body: Some(body),
        })
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.respond(RecordedCall {
            method: HttpMethod::Get,
            path: path.to_string(),
            body: None,
        })
    }
}
