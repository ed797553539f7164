//! Prelude module for convenient imports.
//!
//! ```ignore
//! use stencil::prelude::*;
//! ```

pub use crate::{
    Arg, BytesExtractor, Connector, ContentType, Error, HyperConnector, Invoker, JsonExtractor,
    JsonStringExtractor, Method, PlainStringExtractor, Request, Response, Result,
    ResultExtractor, Scheme, builder, extractor_fn,
};
pub use serde::{Deserialize, Serialize};
