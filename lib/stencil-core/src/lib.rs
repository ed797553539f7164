//! Core types and traits for the stencil HTTP request template engine.
//!
//! This crate provides the transport-independent pieces stencil is built on:
//! - [`Method`] - HTTP method enum used by the template builder
//! - [`Request`] and [`RequestBuilder`] - assembled HTTP requests
//! - [`Response`] - HTTP response handed to result extractors
//! - [`Error`] and [`Result`] - Error handling
//! - [`Connector`] - The transport boundary that sends assembled requests
//! - [`ParamLocation`] - Where a named template parameter lives (path or query)
//! - [`ContentType`] - Content types set by body arguments

mod body;
mod connector;
mod error;
mod location;
mod method;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, to_json};
pub use connector::Connector;
pub use error::{Error, Result};
pub use location::ParamLocation;
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
