//! Connector logging.
//!
//! Emits one `tracing` event when an assembled request leaves the connector and
//! one when its outcome is known. Query strings can carry bound argument
//! values, so they are left out of the logged URL unless asked for.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that logs every request sent through the connector.
///
/// # Example
///
/// ```ignore
/// use stencil::HyperConnector;
/// use stencil::middleware::LoggingLayer;
///
/// let connector = HyperConnector::builder()
///     .layer(LoggingLayer::debug().with_query())
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
    query: bool,
}

/// How much the logging layer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Headers and body size too, at debug level.
    Debug,
    /// Method, URL and outcome only.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Info-level logging without query strings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level logging without query strings.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            query: false,
        }
    }

    /// Include the query string in the logged URL.
    #[must_use]
    pub const fn with_query(mut self) -> Self {
        self.query = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            layer: *self,
        }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    layer: LoggingLayer,
}

/// Outcome of a send, as reported in logs.
#[derive(Debug, Clone, Copy)]
enum Outcome<'a> {
    Success(u16),
    HttpError(u16),
    Failed(&'a Error),
}

impl<'a> Outcome<'a> {
    fn of(result: &'a Result<Response<Bytes>>) -> Self {
        match result {
            Ok(response) if response.is_success() => Self::Success(response.status()),
            Ok(response) => Self::HttpError(response.status()),
            Err(err) => Self::Failed(err),
        }
    }
}

fn logged_url(url: &url::Url, query: bool) -> String {
    if query {
        return url.to_string();
    }
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method().clone();
        let url = logged_url(request.url(), self.layer.query);
        let span = span!(Level::INFO, "stencil_send", %method, %url);

        if self.layer.level == LogLevel::Debug {
            debug!(
                parent: &span,
                headers = ?request.headers(),
                body_len = request.body().map_or(0, Bytes::len),
                "sending request"
            );
        } else {
            info!(parent: &span, "sending request");
        }

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match Outcome::of(&result) {
                    Outcome::Success(status) => {
                        info!(status, elapsed_ms, "request completed");
                    }
                    Outcome::HttpError(status) => {
                        warn!(status, elapsed_ms, "request answered with HTTP error");
                    }
                    Outcome::Failed(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn layer_levels() {
        assert_eq!(LoggingLayer::new().level, LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level, LogLevel::Debug);
        assert!(LoggingLayer::debug().with_query().query);
    }

    #[test]
    fn query_is_hidden_by_default() {
        let url = url::Url::parse("https://api.example.com/search?token=s3cret").expect("url");
        assert_eq!(logged_url(&url, false), "https://api.example.com/search");
        assert_eq!(logged_url(&url, true), url.as_str());
    }

    #[test]
    fn outcome_classification() {
        let response = |status| Ok(Response::new(status, HashMap::new(), Bytes::new()));

        assert!(matches!(Outcome::of(&response(201)), Outcome::Success(201)));
        assert!(matches!(Outcome::of(&response(404)), Outcome::HttpError(404)));
        assert!(matches!(
            Outcome::of(&Err(Error::Timeout)),
            Outcome::Failed(Error::Timeout)
        ));
    }
}
