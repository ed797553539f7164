//! Named slots in a URL path or query string.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use stencil_core::ParamLocation;

/// Characters escaped in a bound path value.
///
/// Unreserved characters and sub-delimiters pass through; anything that
/// would end or split the segment (`/`, `?`, `#`) is encoded.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// A slot in a template's path or query list.
///
/// [`Variable::Static`] slots are literal text and never accept a value.
/// [`Variable::Bindable`] slots take their value from arguments, the last
/// one applied wins, and render to nothing until bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variable {
    /// Fixed path segment or query pair.
    Static {
        /// Segment text, or query key.
        name: String,
        /// Query value; always empty for path segments.
        value: String,
    },
    /// Named parameter filled in by an argument.
    Bindable {
        /// Parameter name arguments refer to.
        name: String,
        /// Bound value, `None` until bound.
        value: Option<String>,
    },
}

impl Variable {
    /// A fixed path segment, rendered verbatim.
    #[must_use]
    pub fn segment(name: impl Into<String>) -> Self {
        Self::Static {
            name: name.into(),
            value: String::new(),
        }
    }

    /// A fixed `name=value` query pair.
    #[must_use]
    pub fn pair(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Static {
            name: name.into(),
            value: value.into(),
        }
    }

    /// An unbound named parameter.
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Bindable {
            name: name.into(),
            value: None,
        }
    }

    /// Identifying name of the slot.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Static { name, .. } | Self::Bindable { name, .. } => name,
        }
    }

    /// Returns `true` if this slot is a parameter that has not been bound yet.
    #[must_use]
    pub const fn is_unbound(&self) -> bool {
        matches!(self, Self::Bindable { value: None, .. })
    }

    /// Try to bind `value` to this slot.
    ///
    /// Static slots refuse. Parameters always accept, replacing any earlier value.
    pub fn bind(&mut self, value: impl Into<String>) -> bool {
        match self {
            Self::Bindable { value: slot, .. } => {
                *slot = Some(value.into());
                true
            }
            Self::Static { .. } => false,
        }
    }

    /// Render the slot for the given list, or an empty string when it must be omitted.
    #[must_use]
    pub fn render(&self, location: ParamLocation) -> Cow<'_, str> {
        match (self, location) {
            (Self::Static { name, .. }, ParamLocation::Path) => Cow::Borrowed(name),
            (Self::Static { name, value }, ParamLocation::Query) => {
                Cow::Owned(query_pair(name, value))
            }
            (Self::Bindable { value, .. }, _) if value.as_deref().is_none_or(str::is_empty) => {
                Cow::Borrowed("")
            }
            (Self::Bindable { value, .. }, ParamLocation::Path) => Cow::Owned(
                utf8_percent_encode(value.as_deref().unwrap_or_default(), PATH_SEGMENT_ENCODE_SET)
                    .to_string(),
            ),
            (Self::Bindable { name, value }, ParamLocation::Query) => {
                Cow::Owned(query_pair(name, value.as_deref().unwrap_or_default()))
            }
        }
    }
}

fn query_pair(name: &str, value: &str) -> String {
    let name: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    let value: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{name}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_slots_never_bind() {
        let mut segment = Variable::segment("api");
        assert!(!segment.bind("v2"));
        assert_eq!(segment.render(ParamLocation::Path), "api");

        let mut pair = Variable::pair("format", "json");
        assert!(!pair.bind("xml"));
        assert_eq!(pair.render(ParamLocation::Query), "format=json");
    }

    #[test]
    fn params_take_the_last_value() {
        let mut id = Variable::param("id");
        assert!(id.is_unbound());
        assert!(id.bind("42"));
        assert!(id.bind("43"));
        assert!(!id.is_unbound());
        assert_eq!(id.render(ParamLocation::Path), "43");
    }

    #[test]
    fn unbound_and_empty_params_render_empty() {
        let id = Variable::param("id");
        assert_eq!(id.render(ParamLocation::Path), "");
        assert_eq!(id.render(ParamLocation::Query), "");

        let mut q = Variable::param("q");
        assert!(q.bind(""));
        assert_eq!(q.render(ParamLocation::Query), "");
    }

    #[test]
    fn path_values_are_percent_encoded() {
        let mut name = Variable::param("name");
        name.bind("a b/c?d");
        assert_eq!(name.render(ParamLocation::Path), "a%20b%2Fc%3Fd");
    }

    #[test]
    fn query_pairs_are_form_encoded() {
        let mut q = Variable::param("search term");
        q.bind("rust & tokio=1");
        assert_eq!(
            q.render(ParamLocation::Query),
            "search+term=rust+%26+tokio%3D1"
        );
    }

    #[test]
    fn query_encoding_of_tilde_and_star() {
        let mut q = Variable::param("q");
        q.bind("a~b*c");
        assert_eq!(q.render(ParamLocation::Query), "q=a%7Eb*c");
    }

    #[test]
    fn clones_are_independent() {
        let declared = Variable::param("id");
        let mut first = declared.clone();
        let mut second = declared.clone();

        first.bind("1");
        second.bind("2");

        assert!(declared.is_unbound());
        assert_eq!(first.render(ParamLocation::Path), "1");
        assert_eq!(second.render(ParamLocation::Path), "2");
    }
}
