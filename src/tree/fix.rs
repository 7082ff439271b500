//! Case-insensitive path recovery, used to build redirects for requests whose
//! path differs from a registered route only in ASCII letter case and,
//! optionally, one trailing slash.

use super::{Node, NodeKind, segment_end};

impl<T> Node<T> {
    /// Finds the registered spelling of `path`, ignoring ASCII case.
    ///
    /// With `fix_trailing_slash`, a single missing or extra trailing slash is
    /// corrected as well. Static parts of the result take the case of the
    /// registered route; parameter values are copied from `path` verbatim.
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut out = Vec::with_capacity(path.len() + 1);
        if self.fix_rec(path.as_bytes(), &mut out, fix_trailing_slash) {
            String::from_utf8(out).ok()
        } else {
            None
        }
    }

    fn fix_rec(&self, path: &[u8], out: &mut Vec<u8>, fix_ts: bool) -> bool {
        let rest = match self.kind {
            NodeKind::Static | NodeKind::Root => {
                let len = self.label.len();
                if path.len() >= len && path[..len].eq_ignore_ascii_case(&self.label) {
                    out.extend_from_slice(&self.label);
                    &path[len..]
                } else {
                    let add_slash = fix_ts
                        && self.handlers.is_some()
                        && len == path.len() + 1
                        && self.label.ends_with(b"/")
                        && self.label[..path.len()].eq_ignore_ascii_case(path);
                    if add_slash {
                        out.extend_from_slice(&self.label);
                    }
                    return add_slash;
                }
            }
            NodeKind::Param => {
                let end = segment_end(path);
                if end == 0 {
                    return false;
                }
                out.extend_from_slice(&path[..end]);
                &path[end..]
            }
            NodeKind::CatchAll => {
                if !path.starts_with(b"/") {
                    return false;
                }
                out.extend_from_slice(path);
                return self.handlers.is_some();
            }
        };

        if rest.is_empty() {
            if self.handlers.is_some() {
                return true;
            }
            if fix_ts {
                let slash_child = self.child_index(b'/').is_some_and(|i| {
                    let child = &self.children[i];
                    child.label == b"/" && child.handlers.is_some()
                });
                let catch_all = self
                    .wild_child
                    .as_deref()
                    .is_some_and(|w| w.kind == NodeKind::CatchAll);
                if slash_child || catch_all {
                    out.push(b'/');
                    return true;
                }
            }
            return false;
        }

        let mark = out.len();
        for (i, &c) in self.indices.iter().enumerate() {
            if c.eq_ignore_ascii_case(&rest[0]) {
                if self.children[i].fix_rec(rest, out, fix_ts) {
                    return true;
                }
                out.truncate(mark);
            }
        }
        if let Some(wild) = self.wild_child.as_deref() {
            if wild.fix_rec(rest, out, fix_ts) {
                return true;
            }
            out.truncate(mark);
        }

        // drop the extra trailing slash
        fix_ts && rest == b"/" && self.handlers.is_some()
    }
}
