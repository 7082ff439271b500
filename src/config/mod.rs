//! Router behaviour switches.
//!
//! All fields default to the behaviour most servers want, so a partial JSON
//! document only needs to name the switches it changes.

use serde::{Deserialize, Serialize};

use crate::error::RouteResult;

/// Options consulted by [`Router::resolve`](crate::router::Router::resolve).
///
/// # Examples
///
/// ```
/// use rttp_router::config::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{ "redirect_fixed_path": true }"#).unwrap();
/// assert!(config.redirect_fixed_path);
/// assert!(config.redirect_trailing_slash);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Redirect `/foo/` to `/foo` (or the reverse) when only the other
    /// spelling is registered.
    pub redirect_trailing_slash: bool,

    /// On a miss, clean the path and retry it case-insensitively; redirect
    /// to the registered spelling if one is found.
    pub redirect_fixed_path: bool,

    /// Answer 405 instead of 404 when the path is registered under another
    /// method.
    pub handle_method_not_allowed: bool,

    /// Match against the raw (still percent-encoded) request path when the
    /// caller supplies one.
    pub use_raw_path: bool,

    /// Percent-decode parameter values. Only applies with `use_raw_path`.
    pub unescape_path_values: bool,

    /// Collapse repeated slashes and dot segments before matching.
    pub remove_extra_slash: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: false,
            handle_method_not_allowed: false,
            use_raw_path: false,
            unescape_path_values: true,
            remove_extra_slash: false,
        }
    }
}

impl RouterConfig {
    /// Parse a configuration from a JSON object. Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Config`](crate::error::RouteError::Config) if
    /// the document is not valid JSON or a field has the wrong type.
    pub fn from_json(json: &str) -> RouteResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;

    #[test]
    fn defaults() {
        let config = RouterConfig::default();
        assert!(config.redirect_trailing_slash);
        assert!(!config.redirect_fixed_path);
        assert!(!config.handle_method_not_allowed);
        assert!(!config.use_raw_path);
        assert!(config.unescape_path_values);
        assert!(!config.remove_extra_slash);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(RouterConfig::from_json("{}").unwrap(), RouterConfig::default());
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = RouterConfig::from_json(
            r#"{ "handle_method_not_allowed": true, "redirect_trailing_slash": false }"#,
        )
        .unwrap();
        assert!(config.handle_method_not_allowed);
        assert!(!config.redirect_trailing_slash);
        assert!(config.unescape_path_values);
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = RouterConfig::from_json(r#"{ "use_raw_path": "yes" }"#).unwrap_err();
        assert!(matches!(err, RouteError::Config(_)));
    }

    #[test]
    fn serializes_every_switch() {
        let json = serde_json::to_value(RouterConfig::default()).unwrap();
        assert_eq!(json["redirect_trailing_slash"], true);
        assert_eq!(json["remove_extra_slash"], false);
    }
}
