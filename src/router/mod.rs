//! Request routing: map HTTP methods and URL patterns to handler chains.
//!
//! A [`Router`] keeps one radix [`tree`](crate::tree) per HTTP method. Three
//! pattern styles are supported and may be mixed within one route:
//!
//! | Pattern              | Example match              | Captured params                  |
//! |----------------------|----------------------------|----------------------------------|
//! | `/users`             | `/users`                   | *(none)*                         |
//! | `/users/:id`         | `/users/42`                | `id → "42"`                      |
//! | `/files/*filepath`   | `/files/docs/readme.txt`   | `filepath → "/docs/readme.txt"`  |
//!
//! A static segment always beats a parameter at the same position; if the
//! static branch dead-ends deeper down, matching backtracks and retries the
//! parameter. Registration is validated up front, and a rejected route
//! leaves the router untouched.
//!
//! The router never runs handlers. Handler chains are opaque values of type
//! `T`; [`Router::resolve`] tells the caller which chain to run, or which
//! redirect or error status to answer with.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::RouterConfig;
use crate::context::Context;
use crate::error::{RouteError, RouteResult};
use crate::http::{Method, StatusCode};
use crate::path::{clean_path, count_params, count_sections, join_paths};
use crate::tree::{HandlersChain, Node, NodeValue};

mod group;
mod shared;

pub use group::RouterGroup;
pub use shared::SharedRouter;

/// Registration surface shared by [`Router`] and [`RouterGroup`].
///
/// Implementors provide [`handle_all`](Routes::handle_all); every other
/// method is a shorthand for it.
pub trait Routes<T> {
    /// Register `handlers` for `path` under each method name in `methods`.
    ///
    /// Either every method is registered or, on error, none is.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] describing why the route table cannot be built.
    fn handle_all(&mut self, methods: &[&str], path: &str, handlers: Vec<T>) -> RouteResult<()>;

    /// Register `handlers` for `method` requests matching `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rttp_router::{Router, Routes};
    ///
    /// let mut router = Router::new();
    /// router.handle("PROPFIND", "/dav/*path", ["propfind"]).unwrap();
    /// assert!(router.handle("propfind", "/dav/x", ["nope"]).is_err());
    /// ```
    fn handle(
        &mut self,
        method: &str,
        path: &str,
        handlers: impl IntoIterator<Item = T>,
    ) -> RouteResult<()> {
        self.handle_all(&[method], path, handlers.into_iter().collect())
    }

    fn get(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("GET", path, handlers)
    }

    fn post(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("POST", path, handlers)
    }

    fn put(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("PUT", path, handlers)
    }

    fn delete(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("DELETE", path, handlers)
    }

    fn patch(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("PATCH", path, handlers)
    }

    fn head(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("HEAD", path, handlers)
    }

    fn options(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("OPTIONS", path, handlers)
    }

    fn connect(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("CONNECT", path, handlers)
    }

    fn trace(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        self.handle("TRACE", path, handlers)
    }

    /// Register `handlers` for `path` under all nine standard methods.
    fn any(&mut self, path: &str, handlers: impl IntoIterator<Item = T>) -> RouteResult<()> {
        let standard = Method::STANDARD;
        let methods: Vec<&str> = standard.iter().map(Method::as_str).collect();
        self.handle_all(&methods, path, handlers.into_iter().collect())
    }

    /// Register `handlers` for `path` under each of `methods`.
    fn match_methods(
        &mut self,
        methods: &[Method],
        path: &str,
        handlers: impl IntoIterator<Item = T>,
    ) -> RouteResult<()> {
        let methods: Vec<&str> = methods.iter().map(Method::as_str).collect();
        self.handle_all(&methods, path, handlers.into_iter().collect())
    }
}

/// The routes registered for one HTTP method.
#[derive(Debug, Clone)]
pub struct MethodTree<T> {
    method: Method,
    root: Node<T>,
}

impl<T> MethodTree<T> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }
}

/// A registered route, as reported by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    pub handlers: usize,
}

/// Which kind of correction a [`Resolution::Redirect`] makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// One trailing slash was added or removed.
    TrailingSlash,
    /// The path was cleaned and its letter case corrected.
    FixedPath,
}

/// What a dispatcher should do with a request.
#[derive(Debug)]
pub enum Resolution<'r, T> {
    /// Run `handlers`; path parameters are in the [`Context`].
    Matched {
        handlers: &'r HandlersChain<T>,
        full_path: &'r str,
    },
    /// Answer with `status` and a `Location` header pointing at `location`.
    Redirect {
        location: String,
        status: StatusCode,
        kind: RedirectKind,
    },
    /// The path exists under the `allowed` methods only; run the
    /// method-not-allowed chain.
    MethodNotAllowed {
        handlers: &'r HandlersChain<T>,
        allowed: Vec<Method>,
    },
    /// Nothing matched; run the not-found chain.
    NotFound { handlers: &'r HandlersChain<T> },
}

impl<T> Resolution<'_, T> {
    /// The status a dispatcher answers with, or `None` for a match.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Matched { .. } => None,
            Self::Redirect { status, .. } => Some(*status),
            Self::MethodNotAllowed { .. } => Some(StatusCode::MethodNotAllowed),
            Self::NotFound { .. } => Some(StatusCode::NotFound),
        }
    }
}

/// HTTP request router holding one radix tree per method.
///
/// `T` is the handler type. The router only stores and hands back handler
/// chains, so `T` can be anything from a function pointer to an
/// `Arc<dyn Fn(..)>`.
///
/// # Examples
///
/// ```
/// use rttp_router::{Method, Resolution, Router, Routes};
///
/// let mut router = Router::new();
/// router.get("/users/:id", ["show_user"]).unwrap();
/// router.get("/users/new", ["new_user_form"]).unwrap();
///
/// let mut ctx = router.new_context();
/// match router.resolve(&Method::Get, "/users/42", None, &mut ctx) {
///     Resolution::Matched { handlers, full_path } => {
///         assert_eq!(handlers[0], "show_user");
///         assert_eq!(full_path, "/users/:id");
///         assert_eq!(ctx.params().get("id"), Some("42"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    trees: Vec<MethodTree<T>>,
    config: RouterConfig,
    global: Vec<T>,
    no_route: Vec<T>,
    no_method: Vec<T>,
    all_no_route: HandlersChain<T>,
    all_no_method: HandlersChain<T>,
    max_params: usize,
    max_sections: usize,
    max_backtrack: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Create an empty router with the default [`RouterConfig`].
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create an empty router with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use rttp_router::{Router, RouterConfig};
    ///
    /// let config = RouterConfig {
    ///     handle_method_not_allowed: true,
    ///     ..RouterConfig::default()
    /// };
    /// let router: Router<&str> = Router::with_config(config);
    /// assert!(router.config().handle_method_not_allowed);
    /// ```
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            trees: Vec::new(),
            config,
            global: Vec::new(),
            no_route: Vec::new(),
            no_method: Vec::new(),
            all_no_route: Arc::from(Vec::new()),
            all_no_method: Arc::from(Vec::new()),
            max_params: 0,
            max_sections: 0,
            max_backtrack: 0,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The per-method trees, in the order their methods were first registered.
    pub fn trees(&self) -> &[MethodTree<T>] {
        &self.trees
    }

    /// The tree for `method`, if any route was registered under it.
    pub fn tree(&self, method: &Method) -> Option<&Node<T>> {
        self.trees.iter().find(|t| t.method == *method).map(|t| &t.root)
    }

    /// The largest number of parameters any registered pattern can bind.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// The largest number of `/`-separated sections in any registered pattern.
    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    /// The most backtracking frames a match against any method tree can
    /// hold at once.
    pub fn max_backtrack(&self) -> usize {
        self.max_backtrack
    }

    /// Create a request context whose buffers are large enough for every
    /// registered route. The backtracking stack never grows during a match.
    /// Parameter values are owned strings, so the first match that fills a
    /// slot, or a later longer value, still allocates for that value.
    pub fn new_context<'r>(&self) -> Context<'r, T> {
        Context::with_capacity(self.max_params, self.max_sections.max(self.max_backtrack))
    }

    /// Every registered route, grouped by method, depth-first in probe order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes = Vec::new();
        for tree in &self.trees {
            tree.root.for_each_route(&mut |path, handlers| {
                routes.push(RouteInfo {
                    method: tree.method.clone(),
                    path: path.to_owned(),
                    handlers: handlers.len(),
                });
            });
        }
        routes
    }

    /// Match `path` in the tree for `method`.
    ///
    /// Parameters are written to `ctx`. With `unescape`, parameter values are
    /// percent-decoded. A method with no routes yields an empty value.
    pub fn find<'r>(
        &'r self,
        method: &Method,
        path: &str,
        ctx: &mut Context<'r, T>,
        unescape: bool,
    ) -> NodeValue<'r, T> {
        let (params, backtrack) = ctx.buffers();
        match self.tree(method) {
            Some(root) => root.get_value(path, Some(params), backtrack, unescape),
            None => {
                params.clear();
                NodeValue::default()
            }
        }
    }

    /// The registered spelling of `path` under `method`, ignoring ASCII case
    /// and, with `fix_trailing_slash`, one missing or extra trailing slash.
    ///
    /// # Examples
    ///
    /// ```
    /// use rttp_router::{Method, Router, Routes};
    ///
    /// let mut router = Router::new();
    /// router.get("/Foo", [()]).unwrap();
    /// assert_eq!(router.fix_path(&Method::Get, "/foo", true).as_deref(), Some("/Foo"));
    /// ```
    pub fn fix_path(
        &self,
        method: &Method,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        self.tree(method)?
            .find_case_insensitive_path(path, fix_trailing_slash)
    }

    /// Decide how to answer a request.
    ///
    /// `path` is the decoded request path. `raw_path` is the path as it
    /// arrived on the wire; it is only used with
    /// [`use_raw_path`](RouterConfig::use_raw_path). Parameters of a match
    /// are left in `ctx`; on any other outcome `ctx` holds no parameters.
    pub fn resolve<'r>(
        &'r self,
        method: &Method,
        path: &str,
        raw_path: Option<&str>,
        ctx: &mut Context<'r, T>,
    ) -> Resolution<'r, T> {
        let mut unescape = false;
        let mut path = Cow::Borrowed(path);
        if let Some(raw) = raw_path.filter(|raw| self.config.use_raw_path && !raw.is_empty()) {
            path = Cow::Borrowed(raw);
            unescape = self.config.unescape_path_values;
        }
        if self.config.remove_extra_slash {
            path = Cow::Owned(clean_path(&path));
        }

        if let Some(root) = self.tree(method) {
            let (params, backtrack) = ctx.buffers();
            let value = root.get_value(&path, Some(params), backtrack, unescape);
            if let (Some(handlers), Some(full_path)) = (value.handlers, value.full_path) {
                return Resolution::Matched {
                    handlers,
                    full_path,
                };
            }
            ctx.reset();

            if *method != Method::Connect && path != "/" {
                if value.tsr && self.config.redirect_trailing_slash {
                    let location = toggle_trailing_slash(&path);
                    debug!(
                        method = %method,
                        path = %path,
                        location = %location,
                        "trailing slash redirect"
                    );
                    return Resolution::Redirect {
                        location,
                        status: StatusCode::redirect_for(method),
                        kind: RedirectKind::TrailingSlash,
                    };
                }
                if self.config.redirect_fixed_path {
                    let fixed = root.find_case_insensitive_path(
                        &clean_path(&path),
                        self.config.redirect_trailing_slash,
                    );
                    if let Some(location) = fixed {
                        debug!(
                            method = %method,
                            path = %path,
                            location = %location,
                            "fixed path redirect"
                        );
                        return Resolution::Redirect {
                            location,
                            status: StatusCode::redirect_for(method),
                            kind: RedirectKind::FixedPath,
                        };
                    }
                }
            }
        }

        if self.config.handle_method_not_allowed {
            let (_, backtrack) = ctx.buffers();
            let mut allowed = Vec::new();
            for tree in self.trees.iter().filter(|t| t.method != *method) {
                let value = tree.root.get_value(&path, None, backtrack, unescape);
                if value.handlers.is_some() {
                    allowed.push(tree.method.clone());
                }
            }
            backtrack.clear();
            if !allowed.is_empty() {
                trace!(method = %method, path = %path, ?allowed, "method not allowed");
                return Resolution::MethodNotAllowed {
                    handlers: &self.all_no_method,
                    allowed,
                };
            }
        }

        trace!(method = %method, path = %path, "no route");
        Resolution::NotFound {
            handlers: &self.all_no_route,
        }
    }
}

impl<T: Clone> Router<T> {
    /// Start a route group rooted at `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rttp_router::{Router, Routes};
    ///
    /// let mut router = Router::new();
    /// let mut api = router.group("/api");
    /// api.use_handlers(["auth"]);
    /// api.get("/users", ["list_users"]).unwrap();
    ///
    /// let routes = router.routes();
    /// assert_eq!(routes[0].path, "/api/users");
    /// assert_eq!(routes[0].handlers, 2);
    /// ```
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_, T> {
        RouterGroup::new(self, join_paths("/", prefix), Vec::new())
    }

    /// Append global handlers. They run before the handlers of every route
    /// registered afterwards and before the not-found and
    /// method-not-allowed chains.
    pub fn use_handlers(&mut self, handlers: impl IntoIterator<Item = T>) -> &mut Self {
        self.global.extend(handlers);
        self.rebuild_fallbacks();
        self
    }

    /// Set the chain returned with [`Resolution::NotFound`].
    pub fn no_route(&mut self, handlers: impl IntoIterator<Item = T>) -> &mut Self {
        self.no_route = handlers.into_iter().collect();
        self.rebuild_fallbacks();
        self
    }

    /// Set the chain returned with [`Resolution::MethodNotAllowed`].
    pub fn no_method(&mut self, handlers: impl IntoIterator<Item = T>) -> &mut Self {
        self.no_method = handlers.into_iter().collect();
        self.rebuild_fallbacks();
        self
    }

    fn rebuild_fallbacks(&mut self) {
        self.all_no_route = self.combine(&self.no_route);
        self.all_no_method = self.combine(&self.no_method);
    }

    fn combine(&self, handlers: &[T]) -> HandlersChain<T> {
        self.global.iter().chain(handlers).cloned().collect()
    }

    fn try_handle_all(
        &mut self,
        methods: &[&str],
        path: &str,
        handlers: Vec<T>,
    ) -> RouteResult<()> {
        let methods = methods
            .iter()
            .map(|m| Method::for_route(m))
            .collect::<RouteResult<Vec<_>>>()?;
        if !path.starts_with('/') {
            return Err(RouteError::PathMustStartWithSlash {
                path: path.to_owned(),
            });
        }
        let chain = self.combine(&handlers);
        if chain.is_empty() {
            return Err(RouteError::EmptyHandlers {
                path: path.to_owned(),
            });
        }

        // insert into copies so a failure leaves every live tree untouched
        let mut staged: Vec<MethodTree<T>> = Vec::with_capacity(methods.len());
        for method in methods {
            let index = match staged.iter().position(|t| t.method == method) {
                Some(index) => index,
                None => {
                    let root = self.tree(&method).cloned().unwrap_or_else(Node::root);
                    staged.push(MethodTree { method, root });
                    staged.len() - 1
                }
            };
            staged[index].root.add_route(path, Arc::clone(&chain))?;
        }

        for tree in staged {
            debug!(method = %tree.method, path, handlers = chain.len(), "route registered");
            match self.trees.iter_mut().find(|t| t.method == tree.method) {
                Some(live) => *live = tree,
                None => self.trees.push(tree),
            }
        }
        self.max_params = self.max_params.max(count_params(path));
        self.max_sections = self.max_sections.max(count_sections(path));
        self.max_backtrack = self
            .trees
            .iter()
            .map(|tree| tree.root.backtrack_depth())
            .max()
            .unwrap_or(0);
        Ok(())
    }
}

impl<T: Clone> Routes<T> for Router<T> {
    fn handle_all(&mut self, methods: &[&str], path: &str, handlers: Vec<T>) -> RouteResult<()> {
        let result = self.try_handle_all(methods, path, handlers);
        if let Err(error) = &result {
            warn!(?methods, path, %error, "route rejected");
        }
        result
    }
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        _ => format!("{path}/"),
    }
}
