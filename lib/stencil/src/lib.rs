//! Reusable HTTP request templates.
//!
//! Declare the static shape of a family of requests once, with a staged
//! builder, then invoke it as often as needed with per-call [`Arg`]s. The
//! frozen template is never mutated: every invocation binds its arguments into
//! a private copy, so one [`Invoker`] can serve many concurrent calls.
//!
//! # Example
//!
//! ```ignore
//! use stencil::prelude::*;
//!
//! let get_post = stencil::builder(HyperConnector::new())
//!     .get()
//!     .https()
//!     .host("jsonplaceholder.typicode.com")
//!     .path_segment("posts")
//!     .path_param("id")
//!     .build()?;
//!
//! let (status, pretty_json) = get_post.invoke(&[Arg::path("id", "1")]).await?;
//! ```
//!
//! Steps can only be taken in declaration order; this does not compile:
//!
//! ```compile_fail
//! let _ = stencil::builder(stencil::HyperConnector::new()).https();
//! ```

mod arg;
mod client;
mod config;
mod extractor;
mod invoker;
pub mod middleware;
pub mod prelude;
mod staged;
mod template;
mod tls;
mod variable;

pub use arg::Arg;
pub use client::{BoxedService, HyperConnector, HyperConnectorBuilder, ServiceFuture};
pub use config::{ConnectorConfig, ConnectorConfigBuilder, DEFAULT_USER_AGENT};
pub use extractor::{
    BytesExtractor, ExtractorFn, JsonExtractor, JsonStringExtractor, PlainStringExtractor,
    ResultExtractor, extractor_fn,
};
pub use invoker::Invoker;
pub use staged::{TemplateBuilder, builder, stage};
pub use template::{Credentials, Scheme, Template};
pub use variable::Variable;

// Re-export core types
pub use stencil_core::{
    Connector, ContentType, Error, HeaderMap, HeaderName, HeaderValue, Method, ParamLocation,
    Request, RequestBuilder, Response, Result, StatusCode, from_json, header, to_json,
};
