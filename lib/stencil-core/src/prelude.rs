//! Prelude module for convenient imports.
//!
//! ```ignore
//! use stencil_core::prelude::*;
//! ```

pub use crate::{
    Connector, ContentType, Error, Method, ParamLocation, Request, RequestBuilder, Response,
    Result, from_json, to_json,
};
