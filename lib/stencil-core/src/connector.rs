//! The transport boundary.
//!
//! A [`Connector`] receives a fully assembled [`Request`] and returns either a
//! [`Response`] or a transport failure. Timeouts, TLS and connection reuse are
//! the connector's business; the template engine only assembles and decodes.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Sends assembled requests.
///
/// # Example
///
/// ```ignore
/// use stencil_core::{Connector, Request, Response, Result};
/// use bytes::Bytes;
///
/// struct Canned;
///
/// impl Connector for Canned {
///     async fn send(&self, _request: Request<Bytes>) -> Result<Response<Bytes>> {
///         Ok(Response::new(200, Default::default(), Bytes::from(r#"{"success": true}"#)))
///     }
/// }
/// ```
pub trait Connector: Send + Sync {
    /// Send a request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn send(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C: Connector> Connector for Arc<C> {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request)
    }
}

impl<C: Connector> Connector for &C {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request)
    }
}
