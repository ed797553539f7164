//! Parameter locations within a request template.

use std::fmt;

/// Where a named template parameter is declared.
///
/// Path and query variables live in separate lists; binding a value only
/// ever searches the list of the matching location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// URL path variable (e.g. the `id` in `/users/{id}`).
    Path,
    /// URL query variable (e.g. the `q` in `?q=rust`).
    Query,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_location_display() {
        assert_eq!(ParamLocation::Path.to_string(), "path");
        assert_eq!(ParamLocation::Query.to_string(), "query");
    }
}
