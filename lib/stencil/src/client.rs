//! Default connector built on hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http::header::USER_AGENT;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::{
    Error, Request, Response, Result,
    config::{ConnectorConfig, ConnectorConfigBuilder},
    middleware::LoggingLayer,
    tls::https_connector,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future type for the Tower `Service` implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// `BoxCloneService` is not `Sync`; the mutex is only held while cloning.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Client
// ============================================================================

/// hyper client without middleware.
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ConnectorConfig,
}

impl RawHyperClient {
    fn new(config: ConnectorConfig) -> Self {
        let connector = https_connector(config.connect_timeout);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Build a hyper request from an assembled request.
    ///
    /// The configured `User-Agent` is only added when the request has none.
    fn build_hyper_request(
        request: Request<Bytes>,
        user_agent: &str,
    ) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder().method(method).uri(url.as_str());

        if !headers.contains_key(USER_AGENT) {
            builder = builder.header(USER_AGENT, user_agent);
        }
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Extract response headers as a `HashMap`.
    ///
    /// Repeated headers are joined with `, `.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        let mut extracted: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let Ok(value) = value.to_str() else {
                continue;
            };
            extracted
                .entry(name.to_string())
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        extracted
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = Self::build_hyper_request(request, &self.config.user_agent)?;

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = tokio::time::timeout(self.config.timeout, response.into_body().collect())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Service<Request<Bytes>> for RawHyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Connector
// ============================================================================

/// Default [`Connector`](crate::Connector): hyper-util over rustls, with tower middleware support.
///
/// # Example
///
/// ```ignore
/// use stencil::HyperConnector;
/// use std::time::Duration;
///
/// let connector = HyperConnector::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
///
/// let invoker = stencil::builder(connector).get().https().host("api.example.com").build()?;
/// ```
#[derive(Clone)]
pub struct HyperConnector {
    service: SyncService,
    config: ConnectorConfig,
}

impl std::fmt::Debug for HyperConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperConnector {
    /// Create a connector with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConnectorConfig::default())
    }

    /// Create a connector with custom configuration and no middleware.
    #[must_use]
    pub fn with_config(config: ConnectorConfig) -> Self {
        let raw = RawHyperClient::new(config.clone());
        Self {
            service: SyncService::new(BoxCloneService::new(raw)),
            config,
        }
    }

    /// Create a new connector builder.
    #[must_use]
    pub fn builder() -> HyperConnectorBuilder {
        HyperConnectorBuilder::default()
    }

    /// Get the connector configuration.
    #[must_use]
    pub const fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

impl Default for HyperConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::Connector for HyperConnector {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.service.call(request).await
    }
}

impl Service<Request<Bytes>> for HyperConnector {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperConnector`].
///
/// ```ignore
/// use stencil::HyperConnector;
/// use stencil::middleware::LoggingLayer;
///
/// let connector = HyperConnector::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Default)]
pub struct HyperConnectorBuilder {
    config: ConnectorConfigBuilder,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperConnectorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperConnectorBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperConnectorBuilder {
    /// Set the `User-Agent` sent when a template declares none.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Add a Tower layer.
    ///
    /// Layers are applied in order: first added = outermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Log requests and responses at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log requests and responses at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the connector.
    #[must_use]
    pub fn build(self) -> HyperConnector {
        let config = self.config.build();
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new(config.clone()));

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperConnector {
            service: SyncService::new(service),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_default() {
        let connector = HyperConnector::new();
        assert_eq!(connector.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn connector_builder() {
        let connector = HyperConnector::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_per_host(16)
            .with_logging()
            .build();

        assert_eq!(connector.config().timeout, Duration::from_secs(60));
        assert_eq!(connector.config().pool_idle_per_host, 16);
    }

    #[test]
    fn build_hyper_request_keeps_repeated_headers() {
        let url = url::Url::parse("https://api.example.com/posts").expect("url");
        let request = Request::builder(http::Method::POST, url)
            .append_header(http::header::ACCEPT, http::HeaderValue::from_static("a/b"))
            .append_header(http::header::ACCEPT, http::HeaderValue::from_static("c/d"))
            .body(Bytes::from_static(b"{}"))
            .build();

        let hyper_request =
            RawHyperClient::build_hyper_request(request, "stencil/test").expect("request");

        assert_eq!(*hyper_request.method(), http::Method::POST);
        assert_eq!(hyper_request.uri(), "https://api.example.com/posts");
        assert_eq!(
            hyper_request.headers().get_all(http::header::ACCEPT).iter().count(),
            2
        );
        assert_eq!(
            hyper_request.headers().get(USER_AGENT).and_then(|v| v.to_str().ok()),
            Some("stencil/test")
        );
    }

    #[test]
    fn declared_user_agent_replaces_the_default() {
        let url = url::Url::parse("https://api.example.com/").expect("url");
        let request = Request::builder(http::Method::GET, url)
            .header(USER_AGENT, http::HeaderValue::from_static("custom/2.0"))
            .build();

        let hyper_request =
            RawHyperClient::build_hyper_request(request, "stencil/test").expect("request");

        let agents: Vec<_> = hyper_request.headers().get_all(USER_AGENT).iter().collect();
        assert_eq!(agents, ["custom/2.0"]);
    }

    #[test]
    fn extract_headers_joins_repeated_values() {
        let mut headers = http::HeaderMap::new();
        headers.append("set-cookie", http::HeaderValue::from_static("a=1"));
        headers.append("set-cookie", http::HeaderValue::from_static("b=2"));

        let extracted = RawHyperClient::extract_headers(&headers);
        assert_eq!(extracted.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
    }
}
