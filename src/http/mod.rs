//! HTTP vocabulary shared between the router and its callers.
//!
//! This module provides [`Method`], the key of the per-method tree set, and
//! [`StatusCode`], the status a dispatcher should answer with for each
//! non-matching [`Resolution`](crate::router::Resolution).

use std::fmt;

use crate::error::{RouteError, RouteResult};

/// The subset of HTTP status codes the resolver can recommend.
///
/// # Examples
///
/// ```
/// use rttp_router::http::StatusCode;
///
/// let status = StatusCode::MovedPermanently;
/// assert_eq!(status.as_u16(), 301);
/// assert_eq!(status.canonical_reason(), "Moved Permanently");
/// assert!(status.is_redirect());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 3xx Redirection
    MovedPermanently = 301,
    TemporaryRedirect = 307,

    // 4xx Client Error
    NotFound = 404,
    MethodNotAllowed = 405,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::MovedPermanently => "Moved Permanently",
            Self::TemporaryRedirect => "Temporary Redirect",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
        }
    }

    /// Returns `true` for 3xx codes.
    pub fn is_redirect(self) -> bool {
        (300..400).contains(&self.as_u16())
    }

    /// The redirect status for a request made with `method`.
    ///
    /// `GET` is answered with `301`; every other method gets `307` so the
    /// client repeats the request with the same method and body.
    pub fn redirect_for(method: &Method) -> Self {
        if *method == Method::Get {
            Self::MovedPermanently
        } else {
            Self::TemporaryRedirect
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

/// An HTTP request method, the key of the per-method tree set.
///
/// The nine standard methods are unit variants; anything else registered or
/// received is kept verbatim in `Custom`.
///
/// # Examples
///
/// ```
/// use rttp_router::http::Method;
///
/// let method: Method = "GET".parse().unwrap();
/// assert_eq!(method, Method::Get);
/// assert_eq!(method.as_str(), "GET");
/// assert_eq!("MKCOL".parse::<Method>().unwrap(), Method::Custom("MKCOL".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    /// Never answered with a redirect by the resolver.
    Connect,
    Trace,
    /// An extension method such as `PROPFIND`.
    Custom(String),
}

impl Method {
    /// Every standard method, in the order `Routes::any` registers them.
    pub const STANDARD: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Head,
        Method::Options,
        Method::Delete,
        Method::Connect,
        Method::Trace,
    ];

    /// Parses a method name supplied at route registration.
    ///
    /// Unlike [`FromStr`](std::str::FromStr), which accepts whatever arrives on
    /// the wire, registration only accepts non-empty names made of upper-case
    /// ASCII letters.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMethod`] for `""`, `"get"`,
    /// `"INVALID-METHOD"` and the like.
    pub fn for_route(name: &str) -> RouteResult<Self> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(RouteError::InvalidMethod {
                method: name.to_owned(),
            });
        }
        let Ok(method) = name.parse::<Method>();
        Ok(method)
    }

    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Custom(other.to_owned()),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
