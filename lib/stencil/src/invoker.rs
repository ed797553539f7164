//! Invoking a frozen template.

use std::fmt;
use std::sync::Arc;

use stencil_core::{Connector, Error, Result};
use tracing::{Instrument, Level, debug, span, warn};

use crate::{Arg, JsonStringExtractor, ResultExtractor, Template};

/// A frozen template, callable any number of times.
///
/// The template is never mutated after `build`: each call to
/// [`invoke`](Self::invoke) works on its own deep copy, so an invoker can be
/// cloned and used from many tasks at once without any locking.
pub struct Invoker<C, X = JsonStringExtractor> {
    connector: Arc<C>,
    extractor: Arc<X>,
    template: Arc<Template>,
}

impl<C, X> Clone for Invoker<C, X> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            extractor: Arc::clone(&self.extractor),
            template: Arc::clone(&self.template),
        }
    }
}

impl<C, X> fmt::Debug for Invoker<C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl<C, X> Invoker<C, X>
where
    C: Connector,
    X: ResultExtractor,
{
    pub(crate) fn new(connector: Arc<C>, extractor: Arc<X>, template: Template) -> Self {
        Self {
            connector,
            extractor,
            template: Arc::new(template),
        }
    }

    /// The frozen template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Apply `args` to a copy of the template, send it and decode the response.
    ///
    /// Arguments are applied in order; the first one that fails aborts the
    /// call before anything is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::Binding`] / [`Error::Encoding`] if an argument cannot be applied
    /// - [`Error::InvalidUrl`] / [`Error::InvalidRequest`] if assembly fails
    /// - whatever the connector reports if sending fails
    /// - [`Error::Decoding`] if the extractor fails; it carries the response status
    pub async fn invoke(&self, args: &[Arg]) -> Result<(u16, X::Output)> {
        let span = span!(
            Level::INFO,
            "stencil_invoke",
            method = %self.template.method(),
            host = %self.template.host()
        );

        async move {
            let snapshot = self.complete(args)?;
            let request = snapshot.into_request()?;
            debug!(url = %request.url(), "sending request");

            let response = self.connector.send(request).await.inspect_err(|err| {
                warn!(error = %err, "connector failed");
            })?;

            let status = response.status();
            self.extractor
                .extract(response)
                .map(|value| (status, value))
                .map_err(|err| {
                    warn!(status, error = %err, "failed to decode response");
                    match err {
                        Error::Decoding { .. } => err,
                        other => Error::decoding(status, other.to_string()),
                    }
                })
        }
        .instrument(span)
        .await
    }

    /// Deep-copy the template and apply every argument to the copy.
    fn complete(&self, args: &[Arg]) -> Result<Template> {
        let mut snapshot = Template::clone(&self.template);
        debug!(args = args.len(), "applying arguments");

        for arg in args {
            arg.apply_to(&mut snapshot).inspect_err(|err| {
                warn!(error = %err, "argument rejected");
            })?;
        }

        Ok(snapshot)
    }
}
