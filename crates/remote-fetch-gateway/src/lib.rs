//! Remote side of the cache sync.
//!
//! A [`FetchGateway`] turns a [`FetchRequest`] (endpoint, scope query params,
//! optional cursors and page size) into a decoded [`PagedResponse`], or a
//! [`GatewayError`] classified by [`GatewayErrorKind`].
//!
//! [`HttpFetchGateway`] is the production implementation over `reqwest`.
//! [`ScriptedGateway`] replays canned pages and records every request, for
//! tests of the layers above.

mod error;
mod http;
mod request;
mod response;
mod scripted;

pub use error::{GatewayError, GatewayErrorKind, GatewayResult};
pub use http::{AccessTokenProvider, HttpFetchGateway, StaticAccessToken};
pub use request::FetchRequest;
pub use response::{PagedResponse, Paging};
pub use scripted::ScriptedGateway;

use async_trait::async_trait;

/// Source of remote collections.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    /// Fetch one page (or the whole collection when no cursor or size is set).
    async fn fetch(&self, request: FetchRequest) -> GatewayResult<PagedResponse>;
}
