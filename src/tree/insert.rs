//! Route registration: pattern validation, prefix splitting, wildcard
//! placement and conflict detection.

use super::{HandlersChain, Node, NodeKind, longest_common_prefix, segment_end};
use crate::error::{RouteError, RouteResult};

/// Position of the first wildcard in a pattern fragment.
struct Wildcard {
    start: usize,
    /// Exclusive end: the next `/` or the end of the fragment.
    end: usize,
    /// `false` when a second `:` or `*` appears before `end`.
    valid: bool,
}

fn find_wildcard(path: &[u8]) -> Option<Wildcard> {
    let start = path.iter().position(|&c| c == b':' || c == b'*')?;
    let mut valid = true;
    for (offset, &c) in path[start + 1..].iter().enumerate() {
        match c {
            b'/' => {
                return Some(Wildcard {
                    start,
                    end: start + 1 + offset,
                    valid,
                });
            }
            b':' | b'*' => valid = false,
            _ => {}
        }
    }
    Some(Wildcard {
        start,
        end: path.len(),
        valid,
    })
}

/// Length of the static run at the head of `path`. A catch-all's leading
/// slash belongs to the catch-all node, not to the static run.
fn static_prefix_len(path: &[u8]) -> usize {
    match find_wildcard(path) {
        Some(w) if path[w.start] == b'*' => w.start.saturating_sub(1),
        Some(w) => w.start,
        None => path.len(),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Checks the wildcard syntax of a whole pattern before the tree is touched.
pub(crate) fn validate_pattern(path: &str) -> RouteResult<()> {
    if !path.starts_with('/') {
        return Err(RouteError::PathMustStartWithSlash {
            path: path.to_owned(),
        });
    }

    let bytes = path.as_bytes();
    let mut names: Vec<&str> = Vec::new();
    let mut pos = 0;
    while let Some(w) = find_wildcard(&bytes[pos..]) {
        let (start, end) = (pos + w.start, pos + w.end);
        let segment = &path[start..end];

        if !w.valid {
            return Err(RouteError::MultipleWildcardsInSegment {
                segment: segment.to_owned(),
                path: path.to_owned(),
            });
        }
        if segment.len() < 2 {
            return Err(RouteError::UnnamedWildcard {
                path: path.to_owned(),
            });
        }
        if bytes[start] == b'*' {
            if end != bytes.len() {
                return Err(RouteError::CatchAllNotAtEnd {
                    path: path.to_owned(),
                });
            }
            if bytes[start - 1] != b'/' {
                return Err(RouteError::MissingSlashBeforeCatchAll {
                    path: path.to_owned(),
                });
            }
        }

        let name = &segment[1..];
        if names.contains(&name) {
            return Err(RouteError::DuplicateParamName {
                name: name.to_owned(),
                path: path.to_owned(),
            });
        }
        names.push(name);
        pos = end;
    }
    Ok(())
}

impl<T> Node<T> {
    /// Registers `full` with `handlers` in the tree rooted at `self`.
    ///
    /// # Errors
    ///
    /// Malformed patterns and patterns that would be ambiguous next to the
    /// existing routes are rejected. On error the tree may have been
    /// partially restructured; [`Router`](crate::Router) inserts into a
    /// clone so a failed registration is never visible.
    pub fn add_route(&mut self, full: &str, handlers: HandlersChain<T>) -> RouteResult<()> {
        validate_pattern(full)?;
        self.priority += 1;

        let path = full.as_bytes();
        if self.is_empty() {
            let end = static_prefix_len(path);
            self.label = path[..end].to_vec();
            self.kind = NodeKind::Root;
            self.attach(&path[end..], full, handlers);
            return Ok(());
        }
        self.insert_at(path, 0, full, handlers)
    }

    /// Inserts the pattern remainder `path` below `self`. `consumed` is the
    /// number of pattern bytes matched by the ancestors.
    fn insert_at(
        &mut self,
        path: &[u8],
        consumed: usize,
        full: &str,
        handlers: HandlersChain<T>,
    ) -> RouteResult<()> {
        let i = longest_common_prefix(path, &self.label);
        if i < self.label.len() {
            self.split(i, &full.as_bytes()[..consumed + i]);
        }

        let rest = &path[i..];
        let consumed = consumed + i;
        if rest.is_empty() {
            if self.handlers.is_some() {
                return Err(RouteError::DuplicateRoute {
                    path: full.to_owned(),
                });
            }
            self.handlers = Some(handlers);
            self.full_path = full.to_owned();
            return Ok(());
        }

        match rest[0] {
            b':' => self.insert_wildcard(rest, consumed, full, handlers),
            b'/' if rest.get(1) == Some(&b'*') => {
                self.insert_wildcard(rest, consumed, full, handlers)
            }
            // the slash before this catch-all is already part of a static label
            b'*' => Err(RouteError::CatchAllConflict {
                segment: lossy(rest),
                path: full.to_owned(),
                prefix: lossy(&full.as_bytes()[..consumed]),
            }),
            c => {
                if c == b'/'
                    && self
                        .wild_child
                        .as_ref()
                        .is_some_and(|w| w.kind == NodeKind::CatchAll)
                {
                    let wild = self.wild_child.as_deref().map(Node::label).unwrap_or_default();
                    return Err(RouteError::WildcardConflict {
                        segment: lossy(&rest[..segment_end(&rest[1..]) + 1]),
                        path: full.to_owned(),
                        prefix: format!("{}{wild}", lossy(&full.as_bytes()[..consumed])),
                        wildcard: wild,
                    });
                }
                match self.child_index(c) {
                    Some(pos) => {
                        let pos = self.increment_child_prio(pos);
                        self.children[pos].insert_at(rest, consumed, full, handlers)
                    }
                    None => {
                        self.attach(rest, full, handlers);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Inserts a remainder that starts with `:name` or `/*name` below `self`.
    fn insert_wildcard(
        &mut self,
        rest: &[u8],
        consumed: usize,
        full: &str,
        handlers: HandlersChain<T>,
    ) -> RouteResult<()> {
        let catch_all = rest[0] == b'/';

        if let Some(wild) = self.wild_child.as_deref_mut() {
            let same_param = wild.kind == NodeKind::Param
                && rest.starts_with(&wild.label)
                && rest.get(wild.label.len()).is_none_or(|&c| c == b'/');
            if same_param {
                wild.priority += 1;
                return wild.insert_at(rest, consumed, full, handlers);
            }
            if wild.kind == NodeKind::CatchAll && rest == wild.label.as_slice() {
                return Err(RouteError::DuplicateRoute {
                    path: full.to_owned(),
                });
            }

            let segment = if catch_all {
                rest
            } else {
                &rest[..segment_end(rest)]
            };
            let wildcard = wild.label();
            return Err(RouteError::WildcardConflict {
                segment: lossy(segment),
                path: full.to_owned(),
                prefix: format!("{}{wildcard}", lossy(&full.as_bytes()[..consumed])),
                wildcard,
            });
        }

        if catch_all && self.child_index(b'/').is_some() {
            return Err(RouteError::CatchAllConflict {
                segment: lossy(rest),
                path: full.to_owned(),
                prefix: lossy(&full.as_bytes()[..consumed]),
            });
        }

        self.attach(rest, full, handlers);
        Ok(())
    }

    /// Splits `self` at label byte `i`: the tail and everything hanging off
    /// the node move into a new static child.
    fn split(&mut self, i: usize, full_prefix: &[u8]) {
        let first = self.label[i];
        let child = Node {
            label: self.label.split_off(i),
            indices: std::mem::take(&mut self.indices),
            children: std::mem::take(&mut self.children),
            wild_child: self.wild_child.take(),
            kind: NodeKind::Static,
            key: Box::from(""),
            priority: self.priority.saturating_sub(1),
            handlers: self.handlers.take(),
            full_path: std::mem::replace(&mut self.full_path, lossy(full_prefix)),
        };
        self.indices = vec![first];
        self.children = vec![child];
    }

    /// Bumps the priority of child `pos` and moves it forward past every
    /// sibling with a lower priority. Returns the child's new position.
    fn increment_child_prio(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let prio = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < prio {
            self.children.swap(new_pos - 1, new_pos);
            self.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }

    /// Hangs a fresh chain of nodes for `path` below `self`. Nothing below
    /// `self` shares a prefix with `path`.
    fn attach(&mut self, mut path: &[u8], full: &str, handlers: HandlersChain<T>) {
        let mut n = self;
        loop {
            if path.is_empty() {
                n.handlers = Some(handlers);
                n.full_path = full.to_owned();
                return;
            }

            if path.starts_with(b"/*") {
                let mut child = Node::wildcard(NodeKind::CatchAll, path, full);
                child.handlers = Some(handlers);
                n.wild_child = Some(Box::new(child));
                return;
            }

            if path[0] == b':' {
                let end = segment_end(path);
                let child = Node::wildcard(NodeKind::Param, &path[..end], full);
                n = &mut **n.wild_child.insert(Box::new(child));
                path = &path[end..];
                continue;
            }

            let end = static_prefix_len(path);
            let child = Node::with_label(path[..end].to_vec(), NodeKind::Static, full);
            n.indices.push(path[0]);
            n.children.push(child);
            let last = n.children.len() - 1;
            n = &mut n.children[last];
            path = &path[end..];
        }
    }

    fn wildcard(kind: NodeKind, label: &[u8], full: &str) -> Self {
        let skip = if kind == NodeKind::CatchAll { 2 } else { 1 };
        let mut node = Node::with_label(label.to_vec(), kind, full);
        node.key = String::from_utf8_lossy(&label[skip..]).into();
        node
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tree::test_support::{check_invariants, tree};

    fn insert(root: &mut Node<usize>, path: &str) -> RouteResult<()> {
        root.add_route(path, Arc::from(vec![0]))
    }

    #[test]
    fn validation_rejects_malformed_patterns() {
        let cases: &[(&str, fn(&RouteError) -> bool)] = &[
            ("user", |e| matches!(e, RouteError::PathMustStartWithSlash { .. })),
            ("/user/:", |e| matches!(e, RouteError::UnnamedWildcard { .. })),
            ("/src/*", |e| matches!(e, RouteError::UnnamedWildcard { .. })),
            ("/:foo:bar", |e| matches!(e, RouteError::MultipleWildcardsInSegment { .. })),
            ("/:foo*bar", |e| matches!(e, RouteError::MultipleWildcardsInSegment { .. })),
            ("/src/*filepath/x", |e| matches!(e, RouteError::CatchAllNotAtEnd { .. })),
            ("/src*filepath", |e| matches!(e, RouteError::MissingSlashBeforeCatchAll { .. })),
            ("/:id/x/:id", |e| matches!(e, RouteError::DuplicateParamName { .. })),
        ];
        for (pattern, expected) in cases {
            let err = validate_pattern(pattern).unwrap_err();
            assert!(expected(&err), "{pattern}: unexpected {err:?}");
        }
    }

    #[test]
    fn validation_accepts_mid_segment_params() {
        validate_pattern("/info/:user/project/:project").unwrap();
        validate_pattern("/files/v:version").unwrap();
        validate_pattern("/src/*filepath").unwrap();
    }

    #[test]
    fn first_route_fills_the_root() {
        let root = tree(&["/user/:id"]);
        assert_eq!(root.label(), "/user/");
        assert_eq!(root.kind(), NodeKind::Root);
        let param = root.wildcard_child().unwrap();
        assert_eq!(param.kind(), NodeKind::Param);
        assert_eq!(param.label(), ":id");
        assert_eq!(&*param.key, "id");
        check_invariants(&root);
    }

    #[test]
    fn common_prefix_is_split() {
        let root = tree(&["/search/", "/support"]);
        assert_eq!(root.label(), "/s");
        let labels: Vec<_> = root.children().iter().map(Node::label).collect();
        assert_eq!(labels, vec!["earch/", "upport"]);
        assert_eq!(root.children()[0].full_path(), "/search/");
        check_invariants(&root);
    }

    #[test]
    fn catch_all_hangs_off_the_segment_before_its_slash() {
        let root = tree(&["/files/*filepath"]);
        assert_eq!(root.label(), "/files");
        let catch_all = root.wildcard_child().unwrap();
        assert_eq!(catch_all.kind(), NodeKind::CatchAll);
        assert_eq!(catch_all.label(), "/*filepath");
        assert_eq!(&*catch_all.key, "filepath");
        assert!(catch_all.handlers().is_some());
    }

    #[test]
    fn catch_all_at_root() {
        let root = tree(&["/*any"]);
        assert_eq!(root.label(), "");
        assert_eq!(root.wildcard_child().unwrap().label(), "/*any");
    }

    #[test]
    fn shared_param_nodes_are_reused() {
        let root = tree(&["/user/:id", "/user/:id/profile", "/user/:id/posts"]);
        let param = root.wildcard_child().unwrap();
        assert_eq!(param.priority(), 3);
        assert_eq!(param.children().len(), 1);
        assert_eq!(check_invariants(&root), 3);
    }

    #[test]
    fn children_sorted_by_priority() {
        let root = tree(&["/a", "/b/1", "/b/2", "/b/3", "/c/1", "/c/2"]);
        let labels: Vec<_> = root.children().iter().map(Node::label).collect();
        assert_eq!(labels, vec!["b/", "c/", "a"]);
        assert_eq!(root.indices, b"bca");
        assert_eq!(root.priority(), 6);
        check_invariants(&root);
    }

    #[test]
    fn param_conflicts_with_differently_named_param() {
        let mut root = tree(&["/user/:id"]);
        let err = insert(&mut root, "/user/:name").unwrap_err();
        match err {
            RouteError::WildcardConflict {
                segment,
                wildcard,
                prefix,
                ..
            } => {
                assert_eq!(segment, ":name");
                assert_eq!(wildcard, ":id");
                assert_eq!(prefix, "/user/:id");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wildcard_conflicts() {
        let mut root = tree(&["/cmd/:tool/:sub", "/src/*filepath", "/search/:query"]);
        for pattern in [
            "/cmd/:badvar",
            "/cmd/:tool/:badsub",
            "/src/*otherpath",
            "/search/:queryx",
            "/src/:file",
            "/search/*rest",
        ] {
            let err = insert(&mut root, pattern).unwrap_err();
            assert!(
                matches!(
                    err,
                    RouteError::WildcardConflict { .. } | RouteError::CatchAllConflict { .. }
                ),
                "{pattern}: unexpected {err:?}"
            );
        }
    }

    #[test]
    fn catch_all_conflicts_with_static_segment() {
        let mut root = tree(&["/src/*filepath"]);
        assert!(insert(&mut root, "/src/").is_err());
        assert!(insert(&mut root, "/src/some").is_err());

        let mut root = tree(&["/src/"]);
        assert!(matches!(
            insert(&mut root, "/src/*filepath"),
            Err(RouteError::CatchAllConflict { .. })
        ));

        let mut root = tree(&["/src/a"]);
        assert!(matches!(
            insert(&mut root, "/src/*filepath"),
            Err(RouteError::CatchAllConflict { .. })
        ));
    }

    #[test]
    fn catch_all_next_to_plain_segment_is_fine() {
        let root = tree(&["/src", "/src/*filepath", "/srcs"]);
        assert_eq!(check_invariants(&root), 3);
    }

    #[test]
    fn static_and_param_siblings_coexist() {
        let root = tree(&["/user/:id", "/user/new", "/user/newest", "/user/:id/edit"]);
        assert_eq!(check_invariants(&root), 4);
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let mut root = tree(&["/", "/doc/", "/src/*filepath", "/search/:query", "/user_:name"]);
        for pattern in ["/", "/doc/", "/src/*filepath", "/search/:query", "/user_:name"] {
            assert!(
                matches!(insert(&mut root, pattern), Err(RouteError::DuplicateRoute { .. })),
                "{pattern} should be a duplicate"
            );
        }
    }

    #[test]
    fn route_ending_at_split_point_gets_handlers() {
        let root = tree(&["/user/:id", "/user"]);
        assert_eq!(root.label(), "/user");
        assert!(root.handlers().is_some());
        assert_eq!(root.full_path(), "/user");
        check_invariants(&root);
    }

    #[test]
    fn multibyte_labels_split_on_bytes() {
        let root = tree(&["/ä", "/ö"]);
        assert_eq!(root.children().len(), 2);
        check_invariants(&root);
    }
}
