//! # rttp-router
//!
//! A radix-tree HTTP request router: one compact prefix tree per method,
//! static-over-parameter matching with backtracking, trailing-slash and
//! case-insensitive redirect hints, and allocation-free lookups with
//! reusable per-request buffers.
//!
//! ## Quick Start
//!
//! ```rust
//! use rttp_router::{Method, Resolution, Router, Routes};
//!
//! let mut router = Router::new();
//! router.get("/", ["index"]).unwrap();
//! router.get("/files/*filepath", ["serve_file"]).unwrap();
//!
//! let mut ctx = router.new_context();
//! match router.resolve(&Method::Get, "/files/css/site.css", None, &mut ctx) {
//!     Resolution::Matched { handlers, .. } => {
//!         assert_eq!(handlers[..], ["serve_file"]);
//!         assert_eq!(ctx.params().get("filepath"), Some("/css/site.css"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod path;
pub mod router;
pub mod tree;

pub use config::RouterConfig;
pub use context::{Context, Param, Params};
pub use error::{RouteError, RouteResult};
pub use http::{Method, StatusCode};
pub use router::{RedirectKind, Resolution, RouteInfo, Router, RouterGroup, Routes, SharedRouter};
pub use tree::{HandlersChain, NodeValue};
