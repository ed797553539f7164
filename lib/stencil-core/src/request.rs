//! Assembled HTTP requests.
//!
//! A [`Request`] is what a template invocation hands to a [`Connector`](crate::Connector):
//! method, full URL, headers and an optional body.
//!
//! # Example
//!
//! ```
//! use stencil_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let request = Request::<Bytes>::builder(Method::Get.into(), "https://api.example.com".parse().expect("url"))
//!     .header(http::header::ACCEPT, http::HeaderValue::from_static("application/json"))
//!     .build();
//! ```

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: http::Method,
    url: url::Url,
    headers: HeaderMap,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: http::Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (http::Method, url::Url, HeaderMap, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }

    /// Rebuild a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: http::Method,
        url: url::Url,
        headers: HeaderMap,
        body: Option<B>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: http::Method,
    url: url::Url,
    headers: HeaderMap,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any previous values for that name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a header value, keeping previous values for that name.
    #[must_use]
    pub fn append_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Declares headers.
    ///
    /// Every name present in `headers` overwrites the values already set for
    /// it; all of its values are then appended in order.
    #[must_use]
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for name in headers.keys() {
            self.headers.remove(name);
            for value in headers.get_all(name) {
                self.headers.append(name.clone(), value.clone());
            }
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static(crate::ContentType::Json.as_str()),
            )
            .body(body))
    }
}

#[cfg(test)]
mod tests {
    use http::header::{ACCEPT, CONTENT_TYPE};

    use super::*;

    fn url(s: &str) -> url::Url {
        url::Url::parse(s).expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let url = url("https://api.example.com/users");
        let request = Request::<Bytes>::builder(http::Method::GET, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .build();

        assert_eq!(*request.method(), http::Method::GET);
        assert_eq!(request.url().as_str(), "https://api.example.com/users");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn request_builder_declared_headers_overwrite() {
        let mut declared = HeaderMap::new();
        declared.append(ACCEPT, HeaderValue::from_static("text/plain"));
        declared.append(ACCEPT, HeaderValue::from_static("text/html"));

        let request = Request::<Bytes>::builder(http::Method::GET, url("http://localhost/"))
            .header(ACCEPT, HeaderValue::from_static("*/*"))
            .append_header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("1"),
            )
            .headers(&declared)
            .build();

        let accept: Vec<_> = request
            .headers()
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(accept, ["text/plain", "text/html"]);
        assert_eq!(request.header("x-trace"), Some("1"));
    }

    #[test]
    fn request_builder_json() {
        #[derive(serde::Serialize)]
        struct Post {
            title: String,
        }

        let request = Request::builder(http::Method::POST, url("https://api.example.com/posts"))
            .json(&Post {
                title: "Hi".to_string(),
            })
            .expect("json")
            .build();

        assert_eq!(
            request.header(CONTENT_TYPE.as_str()),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(
            request.body().map(Bytes::as_ref),
            Some(br#"{"title":"Hi"}"#.as_slice())
        );
    }
}
