//! Compact prefix tree (radix tree) holding the routes of one HTTP method.
//!
//! Each [`Node`] owns a label, the bytes of the pattern it consumes, and
//! its static children are indexed by their first byte in `indices`, a small
//! table scanned linearly and kept parallel to `children`. A node has at most
//! one wildcard child, either a `:param` that consumes one path segment or a
//! `/*catch-all` that consumes the remainder of the path.
//!
//! ```text
//! /user/:id          root "/"
//! /user/new            └─ "user/"
//! /files/*filepath         ├─ "new"        (static)
//!                          └─ ":id"        (param)
//!                      └─ "files"
//!                          └─ "/*filepath" (catch-all)
//! ```
//!
//! The tree is mutated only while routes are registered
//! ([`Node::add_route`]). Matching ([`Node::get_value`]) and path correction
//! ([`Node::find_case_insensitive_path`]) take `&self` and never allocate
//! node memory, so a built tree can be shared by any number of readers.

use std::fmt;
use std::sync::Arc;

mod fix;
mod insert;
mod lookup;

#[cfg(test)]
mod proptests;

/// The ordered handler chain registered for a route.
pub type HandlersChain<T> = Arc<[T]>;

/// What a node matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// A literal run of bytes.
    #[default]
    Static,
    /// The top of a method tree; matches like a static node.
    Root,
    /// `:name`, one non-empty path segment.
    Param,
    /// `/*name`, everything from the slash to the end of the path.
    CatchAll,
}

/// A radix tree node.
pub struct Node<T> {
    label: Vec<u8>,
    /// First byte of each static child, same order as `children`.
    indices: Vec<u8>,
    children: Vec<Node<T>>,
    wild_child: Option<Box<Node<T>>>,
    kind: NodeKind,
    /// Parameter name for wildcard nodes, empty otherwise.
    key: Box<str>,
    /// Number of routes terminating at or passing through this node.
    priority: u32,
    handlers: Option<HandlersChain<T>>,
    full_path: String,
}

/// The outcome of a single tree walk.
pub struct NodeValue<'r, T> {
    pub handlers: Option<&'r HandlersChain<T>>,
    pub full_path: Option<&'r str>,
    /// A route exists for the same path with one trailing slash added or removed.
    pub tsr: bool,
}

impl<T> Default for NodeValue<'_, T> {
    fn default() -> Self {
        Self {
            handlers: None,
            full_path: None,
            tsr: false,
        }
    }
}

/// Saved matcher state for retrying the wildcard child of `node` after its
/// static branch failed deeper down.
pub struct BacktrackFrame<'r, T> {
    /// Byte offset into the request path just past `node`'s own match.
    offset: usize,
    node: &'r Node<T>,
    /// Number of parameters bound when the frame was pushed.
    params: usize,
}

impl<T> Node<T> {
    /// An empty tree.
    pub fn root() -> Self {
        Self {
            priority: 0,
            ..Self::with_label(Vec::new(), NodeKind::Root, "/")
        }
    }

    fn with_label(label: Vec<u8>, kind: NodeKind, full_path: &str) -> Self {
        Self {
            label,
            indices: Vec::new(),
            children: Vec::new(),
            wild_child: None,
            kind,
            key: Box::from(""),
            priority: 1,
            handlers: None,
            full_path: full_path.to_owned(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// The label as text. Static labels can end inside a multi-byte
    /// character, so this is lossy.
    pub fn label(&self) -> String {
        String::from_utf8_lossy(&self.label).into_owned()
    }

    /// The registered pattern this node was created for.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn handlers(&self) -> Option<&HandlersChain<T>> {
        self.handlers.as_ref()
    }

    /// Static children in probe order (descending priority).
    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub fn wildcard_child(&self) -> Option<&Node<T>> {
        self.wild_child.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
            && self.children.is_empty()
            && self.wild_child.is_none()
            && self.handlers.is_none()
    }

    fn child_index(&self, c: u8) -> Option<usize> {
        self.indices.iter().position(|&i| i == c)
    }

    /// Calls `visit` with the pattern and handler chain of every route below
    /// this node, static children first, in probe order.
    pub fn for_each_route<'a>(&'a self, visit: &mut impl FnMut(&'a str, &'a HandlersChain<T>)) {
        if let Some(handlers) = &self.handlers {
            visit(&self.full_path, handlers);
        }
        for child in &self.children {
            child.for_each_route(visit);
        }
        if let Some(wild) = &self.wild_child {
            wild.for_each_route(visit);
        }
    }
}

impl<T> Node<T> {
    /// The most backtracking frames a single match below this node can hold
    /// at once.
    ///
    /// A frame is pushed when the walk enters a static child of a node that
    /// also has a wildcard child, and popped before that wildcard is tried,
    /// so only such nodes on one root-to-leaf path count.
    pub fn backtrack_depth(&self) -> usize {
        let through_static = self
            .children
            .iter()
            .map(Node::backtrack_depth)
            .max()
            .map_or(0, |depth| depth + usize::from(self.wild_child.is_some()));
        let through_wild = self.wild_child.as_deref().map_or(0, Node::backtrack_depth);
        through_static.max(through_wild)
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            indices: self.indices.clone(),
            children: self.children.clone(),
            wild_child: self.wild_child.clone(),
            kind: self.kind,
            key: self.key.clone(),
            priority: self.priority,
            handlers: self.handlers.clone(),
            full_path: self.full_path.clone(),
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label())
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("handlers", &self.handlers.as_ref().map(|h| h.len()))
            .field("children", &self.children)
            .field("wild_child", &self.wild_child)
            .finish()
    }
}

/// Length of the leading path segment: bytes up to the next `/` or the end.
fn segment_end(path: &[u8]) -> usize {
    path.iter().position(|&b| b == b'/').unwrap_or(path.len())
}

/// Length of the longest common prefix of `a` and `b`, in bytes.
fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn lcp_counts_bytes() {
        assert_eq!(longest_common_prefix(b"/search/", b"/support"), 2);
        assert_eq!(longest_common_prefix(b"abc", b"abc"), 3);
        assert_eq!(longest_common_prefix(b"", b"abc"), 0);
    }

    #[test]
    fn routes_are_visited_static_first() {
        let root = tree(&["/user/:id", "/user/new", "/files/*filepath"]);
        let mut seen = Vec::new();
        root.for_each_route(&mut |path, _| seen.push(path.to_owned()));
        assert_eq!(seen.len(), 3);
        let new_pos = seen.iter().position(|p| p == "/user/new").unwrap();
        let id_pos = seen.iter().position(|p| p == "/user/:id").unwrap();
        assert!(new_pos < id_pos);
    }

    #[test]
    fn backtrack_depth_counts_branching_nodes() {
        assert_eq!(tree(&["/a/b/c"]).backtrack_depth(), 0);
        assert_eq!(tree(&["/user/:id", "/user/new"]).backtrack_depth(), 1);
        // two branch points inside one section
        assert_eq!(tree(&["/a:x", "/ab:y", "/abc"]).backtrack_depth(), 2);
        assert_eq!(tree(&["/:a/x", "/s/:b/y", "/s/t/z"]).backtrack_depth(), 2);
    }

    #[test]
    fn clone_shares_handler_chains() {
        let root = tree(&["/a"]);
        let copy = root.clone();
        assert!(Arc::ptr_eq(root.handlers().unwrap(), copy.handlers().unwrap()));
    }

    #[test]
    fn debug_output_names_labels() {
        let root = tree(&["/hello"]);
        let out = format!("{root:?}");
        assert!(out.contains("/hello"));
        assert!(out.contains("Root"));
    }
}
