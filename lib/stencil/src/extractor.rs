//! Result extraction strategies.
//!
//! A [`ResultExtractor`] turns a received response into a decoded value. The
//! response is passed by value, so its body is released when the extractor
//! returns, on success and on failure alike.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use stencil_core::{Error, Response, Result};

/// Decodes a response into a value.
pub trait ResultExtractor: Send + Sync {
    /// Decoded value type.
    type Output: Send;

    /// Decode the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be interpreted. The invoker reports
    /// it as [`Error::Decoding`] together with the response status.
    fn extract(&self, response: Response<Bytes>) -> Result<Self::Output>;
}

/// Default strategy: re-indent a JSON body with two spaces per level.
///
/// Object keys keep their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStringExtractor;

impl ResultExtractor for JsonStringExtractor {
    type Output = String;

    fn extract(&self, response: Response<Bytes>) -> Result<String> {
        let status = response.status();
        let value: serde_json::Value = serde_json::from_slice(response.body())
            .map_err(|e| Error::decoding(status, e.to_string()))?;
        serde_json::to_string_pretty(&value).map_err(|e| Error::decoding(status, e.to_string()))
    }
}

/// Returns the body as UTF-8 text, unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStringExtractor;

impl ResultExtractor for PlainStringExtractor {
    type Output = String;

    fn extract(&self, response: Response<Bytes>) -> Result<String> {
        let status = response.status();
        response
            .text()
            .map_err(|e| Error::decoding(status, e.to_string()))
    }
}

/// Returns the raw body bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesExtractor;

impl ResultExtractor for BytesExtractor {
    type Output = Bytes;

    fn extract(&self, response: Response<Bytes>) -> Result<Bytes> {
        Ok(response.into_body())
    }
}

/// Deserializes a JSON body into `T`.
pub struct JsonExtractor<T>(PhantomData<fn() -> T>);

impl<T> JsonExtractor<T> {
    /// Create the extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonExtractor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonExtractor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for JsonExtractor<T> {}

impl<T> fmt::Debug for JsonExtractor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonExtractor")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> ResultExtractor for JsonExtractor<T>
where
    T: serde::de::DeserializeOwned + Send,
{
    type Output = T;

    fn extract(&self, response: Response<Bytes>) -> Result<T> {
        let status = response.status();
        response
            .json()
            .map_err(|e| Error::decoding(status, e.to_string()))
    }
}

/// Extractor backed by a closure. See [`extractor_fn`].
#[derive(Clone, Copy)]
pub struct ExtractorFn<F>(F);

impl<F> fmt::Debug for ExtractorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorFn").finish_non_exhaustive()
    }
}

/// Use a closure as a [`ResultExtractor`].
///
/// # Example
///
/// ```
/// use stencil::extractor_fn;
///
/// let status_only = extractor_fn(|response: stencil::Response| Ok(response.status()));
/// ```
pub fn extractor_fn<F, T>(f: F) -> ExtractorFn<F>
where
    F: Fn(Response<Bytes>) -> Result<T> + Send + Sync,
    T: Send,
{
    ExtractorFn(f)
}

impl<F, T> ResultExtractor for ExtractorFn<F>
where
    F: Fn(Response<Bytes>) -> Result<T> + Send + Sync,
    T: Send,
{
    type Output = T;

    fn extract(&self, response: Response<Bytes>) -> Result<T> {
        (self.0)(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};

    use super::*;

    fn response(status: u16, body: &'static str) -> Response<Bytes> {
        Response::new(status, HashMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn json_string_pretty_prints() {
        let output = JsonStringExtractor
            .extract(response(200, r#"{"success": true}"#))
            .expect("extract");
        check!(output == "{\n  \"success\": true\n}");
    }

    #[test]
    fn json_string_keeps_key_order() {
        let output = JsonStringExtractor
            .extract(response(200, r#"{"z":1,"a":[1,2]}"#))
            .expect("extract");
        check!(output == "{\n  \"z\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn json_string_reports_status_on_invalid_body() {
        let body = response(502, "<html>bad gateway</html>");
        let_assert!(Err(err) = JsonStringExtractor.extract(body));
        check!(err.status() == Some(502));
    }

    #[test]
    fn plain_string_is_unmodified() {
        let output = PlainStringExtractor
            .extract(response(200, "  not json \n"))
            .expect("extract");
        check!(output == "  not json \n");
    }

    #[test]
    fn plain_string_rejects_invalid_utf8() {
        let body = Response::new(200, HashMap::new(), Bytes::from_static(&[0xff, 0xfe]));
        let_assert!(Err(Error::Decoding { status: 200, .. }) = PlainStringExtractor.extract(body));
    }

    #[test]
    fn bytes_are_unmodified() {
        let output = BytesExtractor.extract(response(200, "raw")).expect("extract");
        check!(output == Bytes::from_static(b"raw"));
    }

    #[test]
    fn typed_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Created {
            id: u64,
        }

        let output = JsonExtractor::<Created>::new()
            .extract(response(201, r#"{"id":101}"#))
            .expect("extract");
        check!(output == Created { id: 101 });

        let_assert!(Err(err) = JsonExtractor::<Created>::new().extract(response(201, "{}")));
        check!(err.to_string().contains("id"));
    }

    #[test]
    fn closure_extractor() {
        let status_only = extractor_fn(|response: Response<Bytes>| Ok(response.status()));
        check!(status_only.extract(response(204, "")).expect("extract") == 204);
    }
}
