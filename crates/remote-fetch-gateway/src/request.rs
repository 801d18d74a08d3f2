//! Outgoing fetch requests.

use crate::error::{GatewayError, GatewayResult};

/// One gateway call: endpoint path relative to the API base, the scope's
/// query parameters and optional pagination cursors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub after: Option<i64>,
    pub before: Option<i64>,
    pub size: Option<u32>,
}

impl FetchRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_after(mut self, after: Option<i64>) -> Self {
        self.after = after;
        self
    }

    pub fn with_before(mut self, before: Option<i64>) -> Self {
        self.before = before;
        self
    }

    pub fn with_size(mut self, size: Option<u32>) -> Self {
        self.size = size;
        self
    }

    /// Reject requests that can never succeed.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.endpoint.trim_matches('/').is_empty() {
            return Err(GatewayError::Validation("endpoint is empty".to_string()));
        }
        if self.size == Some(0) {
            return Err(GatewayError::Validation(
                "page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Query string pairs: scope params first, then `after`, `before`, `size`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.params.clone();
        if let Some(after) = self.after {
            pairs.push(("after".to_string(), after.to_string()));
        }
        if let Some(before) = self.before {
            pairs.push(("before".to_string(), before.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        pairs
    }
}
