//! In-memory gateway that replays a script. Used by tests of the sync layers.

use crate::error::{GatewayError, GatewayResult};
use crate::request::FetchRequest;
use crate::response::PagedResponse;
use crate::FetchGateway;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// Replays scripted responses in order and records every request it sees.
///
/// Requests are validated the same way the HTTP gateway validates them, so a
/// malformed request fails without consuming a scripted response.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<GatewayResult<PagedResponse>>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page of `records` with the given cursors.
    pub fn push_page(&self, records: Vec<Value>, before: Option<i64>, after: Option<i64>) {
        self.push_response(PagedResponse::new(records).with_cursors(before, after));
    }

    pub fn push_response(&self, response: PagedResponse) {
        self.script.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: GatewayError) {
        self.script.lock().push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Scripted responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl FetchGateway for ScriptedGateway {
    async fn fetch(&self, request: FetchRequest) -> GatewayResult<PagedResponse> {
        request.validate()?;
        self.requests.lock().push(request);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Network("script exhausted".to_string())))
    }
}
