//! Staged template builder.
//!
//! The builder is a type-state machine. Each stage only exposes the steps that
//! are legal at that point, so declaring a request out of order does not
//! compile:
//!
//! ```text
//! method -> scheme -> host -> [port] -> {path | query | header | credentials | extractor}* -> build
//! ```
//!
//! Every step borrows the builder and returns a new one, leaving the original
//! untouched. A partially declared chain can therefore be branched into several
//! templates:
//!
//! ```ignore
//! let api = stencil::builder(connector).get().https().host("api.example.com").path_segment("v1");
//!
//! let users = api.path_segment("users").path_param("id").build()?;
//! let posts = api.path_segment("posts").query_param("page").build()?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU16;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use stencil_core::{Connector, Error, Method, Result};

use crate::template::{Credentials, Scheme};
use crate::{Invoker, JsonStringExtractor, ResultExtractor, Template, Variable};

/// Builder stages.
pub mod stage {
    /// Waiting for the HTTP method.
    #[derive(Debug)]
    pub enum DefineMethod {}

    /// Waiting for the URL scheme.
    #[derive(Debug)]
    pub enum DefineScheme {}

    /// Waiting for the host.
    #[derive(Debug)]
    pub enum DefineHost {}

    /// Host set; a port may be declared, or any declaration step taken.
    #[derive(Debug)]
    pub enum DefinePort {}

    /// Declaring path, query, headers, credentials and extractor.
    #[derive(Debug)]
    pub enum Declare {}

    /// Stages from which declaration steps and `build` are reachable.
    pub trait PostHost: sealed::Sealed {}

    impl PostHost for DefinePort {}
    impl PostHost for Declare {}

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::DefinePort {}
        impl Sealed for super::Declare {}
    }
}

use stage::{Declare, DefineHost, DefineMethod, DefinePort, DefineScheme, PostHost};

/// Start declaring a template whose invocations are sent through `connector`.
#[must_use]
pub fn builder<C: Connector>(connector: C) -> TemplateBuilder<DefineMethod, C> {
    TemplateBuilder::new(connector)
}

/// A template under construction, at stage `S`.
pub struct TemplateBuilder<S, C, X = JsonStringExtractor> {
    connector: Arc<C>,
    extractor: Arc<X>,
    template: Template,
    _stage: PhantomData<fn() -> S>,
}

impl<S, C, X> Clone for TemplateBuilder<S, C, X> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            extractor: Arc::clone(&self.extractor),
            template: self.template.clone(),
            _stage: PhantomData,
        }
    }
}

impl<S, C, X> fmt::Debug for TemplateBuilder<S, C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateBuilder")
            .field("stage", &std::any::type_name::<S>())
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl<S, C, X> TemplateBuilder<S, C, X> {
    /// The template declared so far.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    fn step<T>(&self, declare: impl FnOnce(&mut Template)) -> TemplateBuilder<T, C, X> {
        let mut template = self.template.clone();
        declare(&mut template);
        TemplateBuilder {
            connector: Arc::clone(&self.connector),
            extractor: Arc::clone(&self.extractor),
            template,
            _stage: PhantomData,
        }
    }
}

impl<C> TemplateBuilder<DefineMethod, C> {
    /// Create a builder sending through `connector`.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            extractor: Arc::new(JsonStringExtractor),
            template: Template::default(),
            _stage: PhantomData,
        }
    }
}

impl<C, X> TemplateBuilder<DefineMethod, C, X> {
    /// Declare the HTTP method.
    #[must_use]
    pub fn method(&self, method: Method) -> TemplateBuilder<DefineScheme, C, X> {
        self.step(|t| t.method = method.into())
    }

    /// Declare a method outside [`Method`], such as `PROPFIND`.
    ///
    /// An invalid method token is reported by `build`.
    #[must_use]
    pub fn custom_method(&self, method: &str) -> TemplateBuilder<DefineScheme, C, X> {
        self.step(|t| match http::Method::from_bytes(method.as_bytes()) {
            Ok(method) => t.method = method,
            Err(e) => t.fail(format!("invalid method '{method}': {e}")),
        })
    }

    /// `GET`.
    #[must_use]
    pub fn get(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Get)
    }

    /// `POST`.
    #[must_use]
    pub fn post(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Post)
    }

    /// `PUT`.
    #[must_use]
    pub fn put(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Put)
    }

    /// `DELETE`.
    #[must_use]
    pub fn delete(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Delete)
    }

    /// `PATCH`.
    #[must_use]
    pub fn patch(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Patch)
    }

    /// `HEAD`.
    #[must_use]
    pub fn head(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Head)
    }

    /// `OPTIONS`.
    #[must_use]
    pub fn options(&self) -> TemplateBuilder<DefineScheme, C, X> {
        self.method(Method::Options)
    }
}

impl<C, X> TemplateBuilder<DefineScheme, C, X> {
    /// Declare the URL scheme.
    #[must_use]
    pub fn scheme(&self, scheme: Scheme) -> TemplateBuilder<DefineHost, C, X> {
        self.step(|t| t.scheme = scheme)
    }

    /// `http`.
    #[must_use]
    pub fn http(&self) -> TemplateBuilder<DefineHost, C, X> {
        self.scheme(Scheme::Http)
    }

    /// `https`.
    #[must_use]
    pub fn https(&self) -> TemplateBuilder<DefineHost, C, X> {
        self.scheme(Scheme::Https)
    }
}

impl<C, X> TemplateBuilder<DefineHost, C, X> {
    /// Declare the host. An empty host is reported by `build`.
    #[must_use]
    pub fn host(&self, host: impl Into<String>) -> TemplateBuilder<DefinePort, C, X> {
        let host = host.into();
        self.step(|t| {
            if host.is_empty() {
                t.fail("host must not be empty");
            }
            t.host = host;
        })
    }

    /// `localhost`.
    #[must_use]
    pub fn localhost(&self) -> TemplateBuilder<DefinePort, C, X> {
        self.host("localhost")
    }
}

impl<C, X> TemplateBuilder<DefinePort, C, X> {
    /// Declare the port. `0` leaves it unset, omitting it from the URL.
    ///
    /// The scheme's default port (`80` for `http`, `443` for `https`) is kept
    /// in [`Template::url`] but normalized away in the assembled request URL.
    #[must_use]
    pub fn port(&self, port: u16) -> TemplateBuilder<Declare, C, X> {
        self.step(|t| t.port = NonZeroU16::new(port))
    }
}

impl<S: PostHost, C, X> TemplateBuilder<S, C, X> {
    /// Append a fixed path segment.
    #[must_use]
    pub fn path_segment(&self, segment: impl Into<String>) -> TemplateBuilder<Declare, C, X> {
        let variable = Variable::segment(segment);
        self.step(|t| t.path.push(variable))
    }

    /// Append a named path parameter, bound per call with [`Arg::path`](crate::Arg::path).
    #[must_use]
    pub fn path_param(&self, name: impl Into<String>) -> TemplateBuilder<Declare, C, X> {
        let variable = Variable::param(name);
        self.step(|t| t.path.push(variable))
    }

    /// Append a fixed `name=value` query pair.
    #[must_use]
    pub fn query_segment(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> TemplateBuilder<Declare, C, X> {
        let variable = Variable::pair(name, value);
        self.step(|t| t.query.push(variable))
    }

    /// Append a named query parameter, bound per call with [`Arg::query`](crate::Arg::query).
    #[must_use]
    pub fn query_param(&self, name: impl Into<String>) -> TemplateBuilder<Declare, C, X> {
        let variable = Variable::param(name);
        self.step(|t| t.query.push(variable))
    }

    /// Append a header value. Invalid names or values are reported by `build`.
    #[must_use]
    pub fn header(&self, name: &str, value: &str) -> TemplateBuilder<Declare, C, X> {
        self.step(|t| {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    t.headers.append(name, value);
                }
                (Err(e), _) => t.fail(format!("invalid header name '{name}': {e}")),
                (_, Err(e)) => t.fail(format!("invalid value for header '{name}': {e}")),
            }
        })
    }

    /// Append every value of `headers`, in order.
    #[must_use]
    pub fn headers(&self, headers: &HeaderMap) -> TemplateBuilder<Declare, C, X> {
        self.step(|t| {
            for (name, value) in headers {
                t.headers.append(name.clone(), value.clone());
            }
        })
    }

    /// Declare HTTP basic authentication credentials.
    ///
    /// An empty username and password pair is kept but not sent.
    #[must_use]
    pub fn credentials(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> TemplateBuilder<Declare, C, X> {
        let credentials = Credentials::new(username, password);
        self.step(|t| t.credentials = Some(credentials))
    }

    /// Declare how responses are decoded.
    ///
    /// Without this step, responses go through [`JsonStringExtractor`].
    #[must_use]
    pub fn result_extractor<Y>(&self, extractor: Y) -> TemplateBuilder<Declare, C, Y> {
        TemplateBuilder {
            connector: Arc::clone(&self.connector),
            extractor: Arc::new(extractor),
            template: self.template.clone(),
            _stage: PhantomData,
        }
    }

    /// Freeze the template into an [`Invoker`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Build`] if an earlier step recorded an invalid declaration.
    pub fn build(&self) -> Result<Invoker<C, X>>
    where
        C: Connector,
        X: ResultExtractor,
    {
        if let Some(message) = &self.template.error {
            return Err(Error::build(message.clone()));
        }

        Ok(Invoker::new(
            Arc::clone(&self.connector),
            Arc::clone(&self.extractor),
            self.template.clone(),
        ))
    }
}
