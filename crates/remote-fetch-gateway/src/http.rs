//! HTTP gateway over the Frollo REST API.

use crate::error::{GatewayError, GatewayResult};
use crate::request::FetchRequest;
use crate::response::PagedResponse;
use crate::FetchGateway;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Supplies the bearer token attached to every request.
///
/// Token refresh lives with the host's authentication layer; the gateway
/// only asks for whatever token is current.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> GatewayResult<Option<String>>;
}

/// Fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticAccessToken(Option<String>);

impl StaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> GatewayResult<Option<String>> {
        Ok(self.0.clone())
    }
}

/// [`FetchGateway`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetchGateway {
    http_client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl HttpFetchGateway {
    /// Create a gateway whose requests time out after `timeout`.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http_client, tokens))
    }

    /// Create a gateway around an already configured client.
    pub fn with_client(
        base_url: Url,
        http_client: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            tokens,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request, query string included.
    pub fn request_url(&self, request: &FetchRequest) -> GatewayResult<Url> {
        request.validate()?;

        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.endpoint.trim_start_matches('/')
        ))?;

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

#[async_trait]
impl FetchGateway for HttpFetchGateway {
    async fn fetch(&self, request: FetchRequest) -> GatewayResult<PagedResponse> {
        let url = self.request_url(&request)?;

        tracing::debug!(endpoint = %request.endpoint, after = ?request.after, size = ?request.size, "Fetching page");

        let mut builder = self
            .http_client
            .get(url)
            .header("Accept", "application/json");
        if let Some(token) = self.tokens.access_token().await? {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(
                endpoint = %request.endpoint,
                status = %status,
                body_summary = %body_summary,
                "Fetch failed"
            );
            return Err(GatewayError::from_status(status.as_u16(), body_summary));
        }

        let body = response.bytes().await?;
        let page = PagedResponse::from_slice(&body).inspect_err(|err| {
            tracing::error!(
                endpoint = %request.endpoint,
                error = %err,
                "Undecodable response body"
            );
        })?;

        tracing::debug!(
            endpoint = %request.endpoint,
            records = page.records.len(),
            after = ?page.paging.after,
            "Fetched page"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn gateway(base: &str, timeout: Duration, token: StaticAccessToken) -> HttpFetchGateway {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpFetchGateway::with_client(Url::parse(base).unwrap(), client, Arc::new(token))
    }

    /// Serve one canned response and hand back the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api/v2", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });

        (base, handle)
    }

    #[test]
    fn request_url_joins_base_and_query() {
        let gateway = gateway(
            "https://api.example.com/api/v2/",
            Duration::from_secs(5),
            StaticAccessToken::anonymous(),
        );
        let request = FetchRequest::new("/budgets/100/periods")
            .with_params(vec![("from_date".into(), "2024-01-01".into())])
            .with_after(Some(20))
            .with_size(Some(10));

        let url = gateway.request_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v2/budgets/100/periods?from_date=2024-01-01&after=20&size=10"
        );
    }

    #[test]
    fn request_url_without_query_has_no_question_mark() {
        let gateway = gateway(
            "https://api.example.com/api/v2",
            Duration::from_secs(5),
            StaticAccessToken::anonymous(),
        );
        let url = gateway.request_url(&FetchRequest::new("messages")).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v2/messages");
    }

    #[tokio::test]
    async fn fetch_decodes_page_and_sends_bearer_token() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"data":[{"id":1},{"id":2}],"paging":{"cursors":{"before":"0","after":"2"},"total":5}}"#,
        )
        .await;
        let gateway = gateway(&base, Duration::from_secs(5), StaticAccessToken::new("tok-123"));

        let page = gateway
            .fetch(FetchRequest::new("messages").with_size(Some(2)))
            .await
            .unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.paging.after, Some(2));
        assert_eq!(page.paging.total, Some(5));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/v2/messages?size=2 "));
        assert!(head.to_lowercase().contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"error":"expired"}"#).await;
        let gateway = gateway(&base, Duration::from_secs(5), StaticAccessToken::anonymous());

        let err = gateway.fetch(FetchRequest::new("budgets")).await.unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Authentication);
        assert_eq!(err.status(), Some(401));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn server_failure_maps_to_server_with_digest() {
        let (base, server) = serve_once("503 Service Unavailable", "down").await;
        let gateway = gateway(&base, Duration::from_secs(5), StaticAccessToken::anonymous());

        let err = gateway.fetch(FetchRequest::new("budgets")).await.unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Server);
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("len=4"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_success_body_is_server_kind() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;
        let gateway = gateway(&base, Duration::from_secs(5), StaticAccessToken::anonymous());

        let err = gateway.fetch(FetchRequest::new("reports")).await.unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Server);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_network() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let gateway = gateway(&base, Duration::from_secs(5), StaticAccessToken::anonymous());
        let err = gateway.fetch(FetchRequest::new("accounts")).await.unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Network);
    }

    #[tokio::test]
    async fn timeout_is_network() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let gateway = gateway(&base, Duration::from_millis(200), StaticAccessToken::anonymous());
        let err = gateway.fetch(FetchRequest::new("accounts")).await.unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Network);
    }

    #[tokio::test]
    async fn invalid_request_never_hits_the_network() {
        let gateway = gateway(
            "http://127.0.0.1:9/api",
            Duration::from_secs(5),
            StaticAccessToken::anonymous(),
        );
        let err = gateway
            .fetch(FetchRequest::new("").with_size(Some(10)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GatewayErrorKind::Validation);
    }

    #[test]
    fn body_summary_hides_content() {
        let summary = summarize_response_body("secret-token-value");
        assert!(summary.starts_with("len=18,digest="));
        assert!(!summary.contains("secret"));
    }
}
