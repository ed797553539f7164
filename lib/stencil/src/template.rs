//! The declared shape of a request family.
//!
//! A [`Template`] is plain data. The staged builder produces it, the invoker
//! freezes it, and every invocation works on its own deep copy: binding values
//! into a snapshot never touches the frozen template or any other snapshot.

use std::fmt;
use std::num::NonZeroU16;

use base64::Engine;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use stencil_core::{ContentType, Error, ParamLocation, Request, Result};

use crate::Variable;

/// URL scheme of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    /// Plain `http`.
    Http,
    /// `https`.
    #[default]
    Https,
}

impl Scheme {
    /// Scheme name as it appears in a URL.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a credentials pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Both username and password are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }

    fn authorization(&self) -> Result<HeaderValue> {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        let mut value = HeaderValue::try_from(format!("Basic {encoded}"))
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable declared shape of a request.
///
/// Obtained from the staged builder (see [`crate::builder`]) or from a built
/// [`Invoker`](crate::Invoker).
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) method: http::Method,
    pub(crate) scheme: Scheme,
    pub(crate) host: String,
    pub(crate) port: Option<NonZeroU16>,
    pub(crate) path: Vec<Variable>,
    pub(crate) query: Vec<Variable>,
    pub(crate) headers: HeaderMap,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) body: Option<Bytes>,
    pub(crate) error: Option<String>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            method: http::Method::GET,
            scheme: Scheme::default(),
            host: String::new(),
            port: None,
            path: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            credentials: None,
            body: None,
            error: None,
        }
    }
}

impl Template {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// URL scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, `None` when the URL omits it.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port.map(NonZeroU16::get)
    }

    /// Path variables in declaration order.
    #[must_use]
    pub fn path(&self) -> &[Variable] {
        &self.path
    }

    /// Query variables in declaration order.
    #[must_use]
    pub fn query(&self) -> &[Variable] {
        &self.query
    }

    /// Declared headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Declared credentials, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Request body set by an argument.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Record a deferred construction error. The first one wins.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    /// Bind `value` to the first parameter named `name` in the `location` list.
    ///
    /// Static slots with that name are skipped. Binding the same name again
    /// replaces the value in that first parameter; later duplicates stay unbound.
    pub(crate) fn bind(&mut self, location: ParamLocation, name: &str, value: &str) -> Result<()> {
        let variables = match location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
        };

        if variables.iter_mut().any(|v| v.name() == name && v.bind(value)) {
            Ok(())
        } else {
            Err(Error::binding(name, location))
        }
    }

    /// Set the body and its content type.
    pub(crate) fn set_body(&mut self, body: Bytes, content_type: ContentType) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.body = Some(body);
    }

    /// Assemble the URL: `scheme://host[:port][/path][?query]`.
    ///
    /// Slots that render empty are left out entirely, so unbound parameters
    /// never produce empty segments or dangling separators.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);

        if let Some(port) = self.port {
            url.push(':');
            url.push_str(&port.to_string());
        }

        let path = join_rendered(&self.path, ParamLocation::Path, "/");
        if !path.is_empty() {
            url.push('/');
            url.push_str(&path);
        }

        let query = join_rendered(&self.query, ParamLocation::Query, "&");
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        url
    }

    /// Turn a completed snapshot into a request for the connector.
    pub(crate) fn into_request(self) -> Result<Request<Bytes>> {
        let url = url::Url::parse(&self.url())?;

        let mut builder = Request::builder(self.method, url).headers(&self.headers);

        if let Some(credentials) = self.credentials.as_ref().filter(|c| !c.is_empty()) {
            builder = builder.header(AUTHORIZATION, credentials.authorization()?);
        }

        if let Some(body) = self.body {
            builder = builder.body(body);
        }

        Ok(builder.build())
    }
}

fn join_rendered(variables: &[Variable], location: ParamLocation, separator: &str) -> String {
    variables
        .iter()
        .map(|v| v.render(location))
        .filter(|rendered| !rendered.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn localhost() -> Template {
        Template {
            host: "localhost".to_string(),
            ..Template::default()
        }
    }

    #[test]
    fn url_without_port_path_or_query() {
        check!(localhost().url() == "https://localhost");
    }

    #[test]
    fn url_renders_nonzero_port() {
        let template = Template {
            port: NonZeroU16::new(17500),
            ..localhost()
        };
        check!(template.url() == "https://localhost:17500");
    }

    #[test]
    fn unbound_path_params_are_omitted() {
        let template = Template {
            path: vec![Variable::segment("api"), Variable::param("id")],
            ..localhost()
        };
        check!(template.url() == "https://localhost/api");
    }

    #[test]
    fn unbound_slot_between_segments_leaves_no_double_slash() {
        let mut template = Template {
            scheme: Scheme::Http,
            path: vec![
                Variable::segment("users"),
                Variable::param("id"),
                Variable::segment("posts"),
            ],
            query: vec![Variable::param("page"), Variable::pair("format", "json")],
            ..localhost()
        };
        check!(template.url() == "http://localhost/users/posts?format=json");

        template.bind(ParamLocation::Path, "id", "7").expect("bind id");
        template.bind(ParamLocation::Query, "page", "2").expect("bind page");
        check!(template.url() == "http://localhost/users/7/posts?page=2&format=json");
    }

    #[test]
    fn bind_searches_only_the_requested_list() {
        let mut template = Template {
            path: vec![Variable::param("id")],
            ..localhost()
        };

        let_assert!(Err(err) = template.bind(ParamLocation::Query, "id", "1"));
        check!(err.to_string() == "failed to bind value to URL query parameter 'id'");
    }

    #[test]
    fn bind_skips_static_slots_with_the_same_name() {
        let mut template = Template {
            path: vec![Variable::segment("id"), Variable::param("id")],
            ..localhost()
        };

        template.bind(ParamLocation::Path, "id", "9").expect("bind");
        check!(template.url() == "https://localhost/id/9");
    }

    #[test]
    fn duplicate_names_bind_first_match_only() {
        let mut template = Template {
            path: vec![Variable::param("id"), Variable::param("id")],
            ..localhost()
        };

        template.bind(ParamLocation::Path, "id", "1").expect("first bind");
        template.bind(ParamLocation::Path, "id", "2").expect("second bind");
        check!(template.url() == "https://localhost/2");
    }

    #[test]
    fn rebinding_a_single_slot_replaces_its_value() {
        let mut template = Template {
            path: vec![Variable::param("id")],
            ..localhost()
        };

        template.bind(ParamLocation::Path, "id", "1").expect("first bind");
        template.bind(ParamLocation::Path, "id", "2").expect("second bind");
        check!(template.url() == "https://localhost/2");
    }

    #[test]
    fn into_request_applies_credentials_and_headers() {
        let mut template = Template {
            credentials: Some(Credentials::new("user", "pass")),
            ..localhost()
        };
        template
            .headers
            .append("x-api-version", HeaderValue::from_static("2"));
        template.set_body(Bytes::from_static(b"hello"), ContentType::PlainText);

        let request = template.into_request().expect("request");

        check!(request.header("authorization") == Some("Basic dXNlcjpwYXNz"));
        check!(request.header("x-api-version") == Some("2"));
        check!(request.header("content-type") == Some("text/plain; charset=utf-8"));
        check!(request.body() == Some(&Bytes::from_static(b"hello")));
    }

    #[test]
    fn default_port_is_normalized_in_the_request() {
        let template = Template {
            port: NonZeroU16::new(443),
            ..localhost()
        };
        check!(template.url() == "https://localhost:443");

        let request = template.into_request().expect("request");
        check!(request.url().as_str() == "https://localhost/");
        check!(request.url().port_or_known_default() == Some(443));
    }

    #[test]
    fn empty_credentials_are_not_applied() {
        let template = Template {
            credentials: Some(Credentials::new("", "")),
            ..localhost()
        };

        let request = template.into_request().expect("request");
        check!(request.header("authorization").is_none());
    }

    #[test]
    fn malformed_host_fails_assembly() {
        let template = Template {
            host: "exa mple.com".to_string(),
            ..Template::default()
        };

        let_assert!(Err(Error::InvalidUrl(_)) = template.into_request());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        check!(!debug.contains("hunter2"));
    }
}
