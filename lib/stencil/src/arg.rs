//! Per-invocation arguments.
//!
//! An [`Arg`] is applied to an invocation's private copy of the template: it
//! binds a value to a named path or query parameter, or sets the body.
//! Arguments are cheap to clone and can be reused across invocations.

use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use stencil_core::{ContentType, Error, ParamLocation, Result, to_json};

use crate::Template;

/// An argument to a template invocation.
///
/// # Example
///
/// ```ignore
/// let (status, post) = invoker
///     .invoke(&[Arg::path("id", "42"), Arg::query("fields", "title")])
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Arg {
    kind: ArgKind,
}

#[derive(Debug, Clone)]
enum ArgKind {
    Bind {
        location: ParamLocation,
        name: String,
        value: String,
    },
    Body {
        body: Bytes,
        content_type: ContentType,
    },
    Json(Arc<JsonBody>),
}

impl Arg {
    /// Bind `value` to the path parameter `name`.
    #[must_use]
    pub fn path(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::bind(ParamLocation::Path, name, value)
    }

    /// Bind `value` to the query parameter `name`.
    #[must_use]
    pub fn query(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::bind(ParamLocation::Query, name, value)
    }

    fn bind(location: ParamLocation, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Bind {
                location,
                name: name.into(),
                value: value.into(),
            },
        }
    }

    /// Send `body` as `application/octet-stream`.
    #[must_use]
    pub fn body(body: impl Into<Bytes>) -> Self {
        Self::body_with_type(body, ContentType::OctetStream)
    }

    /// Send `text` as `text/plain; charset=utf-8`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::body_with_type(text.into(), ContentType::PlainText)
    }

    /// Send `body` with an explicit content type.
    #[must_use]
    pub fn body_with_type(body: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            kind: ArgKind::Body {
                body: body.into(),
                content_type,
            },
        }
    }

    /// Send `value` encoded as JSON.
    ///
    /// The value is encoded the first time the argument is applied. The bytes,
    /// or the encoding error, are kept and reused by every later invocation
    /// given this argument or one of its clones.
    #[must_use]
    pub fn json<T>(value: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        Self {
            kind: ArgKind::Json(Arc::new(JsonBody {
                encode: Box::new(move || to_json(&value)),
                encoded: OnceLock::new(),
            })),
        }
    }

    pub(crate) fn apply_to(&self, template: &mut Template) -> Result<()> {
        match &self.kind {
            ArgKind::Bind {
                location,
                name,
                value,
            } => template.bind(*location, name, value),
            ArgKind::Body { body, content_type } => {
                template.set_body(body.clone(), *content_type);
                Ok(())
            }
            ArgKind::Json(json) => {
                template.set_body(json.bytes()?, ContentType::Json);
                Ok(())
            }
        }
    }
}

type Encoder = Box<dyn Fn() -> Result<Bytes> + Send + Sync>;

/// A JSON payload encoded at most once.
struct JsonBody {
    encode: Encoder,
    encoded: OnceLock<std::result::Result<Bytes, Arc<str>>>,
}

impl JsonBody {
    fn bytes(&self) -> Result<Bytes> {
        self.encoded
            .get_or_init(|| (self.encode)().map_err(|e| Arc::from(e.to_string())))
            .clone()
            .map_err(Error::Encoding)
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonBody")
            .field("encoded", &self.encoded.get())
            .finish_non_exhaustive()
    }
}
