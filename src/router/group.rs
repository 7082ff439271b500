//! Route groups: a shared path prefix plus middleware handlers.

use super::{Router, Routes};
use crate::error::RouteResult;
use crate::path::join_paths;

/// A set of routes registered under a common prefix.
///
/// Handlers added with [`use_handlers`](RouterGroup::use_handlers) run
/// before the handlers of every route registered through the group, after
/// the router's global handlers. Nested groups inherit both the prefix and
/// the handlers of their parent at the time they are created.
pub struct RouterGroup<'a, T> {
    router: &'a mut Router<T>,
    base_path: String,
    handlers: Vec<T>,
}

impl<'a, T: Clone> RouterGroup<'a, T> {
    pub(super) fn new(router: &'a mut Router<T>, base_path: String, handlers: Vec<T>) -> Self {
        Self {
            router,
            base_path,
            handlers,
        }
    }

    /// The absolute prefix of this group.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Append middleware handlers for routes registered through this group
    /// from now on.
    pub fn use_handlers(&mut self, handlers: impl IntoIterator<Item = T>) -> &mut Self {
        self.handlers.extend(handlers);
        self
    }

    /// Start a nested group below this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rttp_router::Router;
    ///
    /// let mut router: Router<&str> = Router::new();
    /// let mut api = router.group("/api");
    /// let v1 = api.group("v1/");
    /// assert_eq!(v1.base_path(), "/api/v1/");
    /// ```
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_, T> {
        RouterGroup {
            base_path: join_paths(&self.base_path, prefix),
            handlers: self.handlers.clone(),
            router: &mut *self.router,
        }
    }

    /// The absolute pattern for `relative` in this group.
    pub fn absolute_path(&self, relative: &str) -> String {
        join_paths(&self.base_path, relative)
    }
}

impl<T: Clone> Routes<T> for RouterGroup<'_, T> {
    fn handle_all(&mut self, methods: &[&str], path: &str, handlers: Vec<T>) -> RouteResult<()> {
        let absolute = self.absolute_path(path);
        let chain = self.handlers.iter().cloned().chain(handlers).collect();
        self.router.handle_all(methods, &absolute, chain)
    }
}

#[cfg(test)]
mod tests {
    use crate::http::Method;
    use crate::router::{Resolution, Router, Routes};

    #[test]
    fn group_prefixes_and_middleware() {
        let mut router: Router<&str> = Router::new();
        router.use_handlers(["global"]);
        {
            let mut api = router.group("/api");
            api.use_handlers(["auth"]);
            api.get("/users/:id", ["show"]).unwrap();

            let mut admin = api.group("admin");
            admin.use_handlers(["admin_only"]);
            admin.delete("/users/:id", ["destroy"]).unwrap();
        }

        let mut ctx = router.new_context();
        match router.resolve(&Method::Get, "/api/users/3", None, &mut ctx) {
            Resolution::Matched { handlers, full_path } => {
                assert_eq!(handlers[..], ["global", "auth", "show"]);
                assert_eq!(full_path, "/api/users/:id");
            }
            other => panic!("unexpected {other:?}"),
        }
        match router.resolve(&Method::Delete, "/api/admin/users/3", None, &mut ctx) {
            Resolution::Matched { handlers, .. } => {
                assert_eq!(handlers[..], ["global", "auth", "admin_only", "destroy"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn base_paths_are_joined() {
        let mut router: Router<&str> = Router::new();
        let mut root = router.group("");
        assert_eq!(root.base_path(), "/");
        let mut v1 = root.group("/v1");
        assert_eq!(v1.base_path(), "/v1");
        assert_eq!(v1.absolute_path("items/"), "/v1/items/");
        assert_eq!(v1.absolute_path(""), "/v1");
        let nested = v1.group("/nested/");
        assert_eq!(nested.base_path(), "/v1/nested/");
    }

    #[test]
    fn empty_relative_path_registers_the_base() {
        let mut router: Router<&str> = Router::new();
        router.group("/status").get("", ["ok"]).unwrap();
        assert_eq!(router.routes()[0].path, "/status");
    }

    #[test]
    fn group_errors_propagate() {
        let mut router: Router<&str> = Router::new();
        let mut api = router.group("/api");
        api.get("/:id", ["a"]).unwrap();
        assert!(api.get("/:name", ["b"]).is_err());
    }
}
