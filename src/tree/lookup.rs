//! Request-time matching.
//!
//! The walk prefers static children over the wildcard child. Whenever it
//! descends into a static child while a wildcard sibling exists, it records a
//! [`BacktrackFrame`]; if that branch later fails, the walk resumes at the
//! frame and tries the wildcard instead, with the parameter list truncated
//! back to what it held at the time.

use super::{BacktrackFrame, Node, NodeKind, NodeValue, segment_end};
use crate::context::Params;

impl<T> Node<T> {
    /// Matches `full` against the tree rooted at `self`.
    ///
    /// When `params` is `Some`, bound parameters are written to it (cleared
    /// first); otherwise the walk only decides whether a route matches.
    /// `backtrack` is scratch space and is cleared on entry. With `unescape`,
    /// parameter values are percent-decoded.
    ///
    /// On a miss the returned value has no handlers; its `tsr` flag reports
    /// whether adding or removing one trailing slash would have matched.
    pub fn get_value<'r>(
        &'r self,
        full: &str,
        mut params: Option<&mut Params<'r>>,
        backtrack: &mut Vec<BacktrackFrame<'r, T>>,
        unescape: bool,
    ) -> NodeValue<'r, T> {
        backtrack.clear();
        if let Some(p) = params.as_deref_mut() {
            p.clear();
        }

        let bytes = full.as_bytes();
        let mut n = self;
        let mut path = bytes;
        let mut bound = 0usize;
        let mut tsr = false;
        let mut resumed = false;

        'walk: loop {
            let missed_tsr = 'node: {
                if !resumed {
                    match n.kind {
                        NodeKind::Static | NodeKind::Root => {
                            if !path.starts_with(&n.label) {
                                // the request lacks the trailing slash this node ends with
                                break 'node n.handlers.is_some()
                                    && n.label.len() == path.len() + 1
                                    && n.label.ends_with(b"/")
                                    && n.label.starts_with(path);
                            }
                            path = &path[n.label.len()..];
                        }
                        NodeKind::Param => {
                            let end = segment_end(path);
                            let start = bytes.len() - path.len();
                            let Some(value) = full.get(start..start + end).filter(|v| !v.is_empty())
                            else {
                                break 'node false;
                            };
                            if let Some(p) = params.as_deref_mut() {
                                p.push(&n.key, value, unescape);
                            }
                            bound += 1;
                            path = &path[end..];
                        }
                        NodeKind::CatchAll => {
                            let start = bytes.len() - path.len();
                            let Some(value) = full.get(start..).filter(|v| v.starts_with('/'))
                            else {
                                break 'node false;
                            };
                            if let Some(p) = params.as_deref_mut() {
                                p.push(&n.key, value, unescape);
                            }
                            bound += 1;
                            path = &[];
                        }
                    }
                }
                let skip_static = std::mem::take(&mut resumed);

                if path.is_empty() {
                    if let Some(handlers) = &n.handlers {
                        return NodeValue {
                            handlers: Some(handlers),
                            full_path: Some(n.full_path.as_str()),
                            tsr: false,
                        };
                    }
                    // a route exists with one more trailing slash
                    let slash_child = n.child_index(b'/').is_some_and(|i| {
                        let child = &n.children[i];
                        child.label == b"/" && child.handlers.is_some()
                    });
                    let catch_all = n
                        .wild_child
                        .as_deref()
                        .is_some_and(|w| w.kind == NodeKind::CatchAll);
                    break 'node slash_child || catch_all;
                }

                if path == b"/" && n.handlers.is_some() {
                    tsr = true;
                }

                if !skip_static {
                    if let Some(i) = n.child_index(path[0]) {
                        if n.wild_child.is_some() {
                            backtrack.push(BacktrackFrame {
                                offset: bytes.len() - path.len(),
                                node: n,
                                params: bound,
                            });
                        }
                        n = &n.children[i];
                        continue 'walk;
                    }
                }
                if let Some(wild) = n.wild_child.as_deref() {
                    n = wild;
                    continue 'walk;
                }
                false
            };

            tsr |= missed_tsr;
            let Some(frame) = backtrack.pop() else {
                return NodeValue {
                    tsr,
                    ..NodeValue::default()
                };
            };
            n = frame.node;
            path = &bytes[frame.offset..];
            bound = frame.params;
            if let Some(p) = params.as_deref_mut() {
                p.truncate(bound);
            }
            resumed = true;
        }
    }
}
