//! Registration-time configuration errors.
//!
//! Every variant describes a route table that cannot be built. These are meant
//! to be surfaced while the application is being set up, before any request is
//! served; request-time misses are never reported through this type.

use thiserror::Error;

/// Errors produced while registering routes or loading router configuration.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("path must begin with '/' in path '{path}'")]
    PathMustStartWithSlash { path: String },

    #[error("invalid HTTP method '{method}': must be non-empty upper-case ASCII letters")]
    InvalidMethod { method: String },

    #[error("there must be at least one handler for path '{path}'")]
    EmptyHandlers { path: String },

    #[error("wildcards must be named with a non-empty name in path '{path}'")]
    UnnamedWildcard { path: String },

    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{path}'")]
    MultipleWildcardsInSegment { segment: String, path: String },

    #[error("catch-all routes are only allowed at the end of the path in path '{path}'")]
    CatchAllNotAtEnd { path: String },

    #[error("no / before catch-all in path '{path}'")]
    MissingSlashBeforeCatchAll { path: String },

    #[error("parameter name '{name}' is used more than once in path '{path}'")]
    DuplicateParamName { name: String, path: String },

    #[error(
        "'{segment}' in new path '{path}' conflicts with existing wildcard '{wildcard}' in existing prefix '{prefix}'"
    )]
    WildcardConflict {
        segment: String,
        path: String,
        wildcard: String,
        prefix: String,
    },

    #[error(
        "catch-all wildcard '{segment}' in new path '{path}' conflicts with existing path segment in existing prefix '{prefix}'"
    )]
    CatchAllConflict {
        segment: String,
        path: String,
        prefix: String,
    },

    #[error("handlers are already registered for path '{path}'")]
    DuplicateRoute { path: String },

    #[error("invalid router configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
