//! Path utilities: lexical cleaning, group path joining, and the sizing scans
//! used to pre-size per-request scratch buffers.

/// Returns the canonical form of `p`.
///
/// The following rules are applied lexically, without touching any file
/// system or route table:
///
/// 1. Repeated slashes collapse into one.
/// 2. `.` elements are dropped.
/// 3. `..` elements remove the preceding element; at the root they are ignored.
/// 4. The result is always rooted, and keeps a trailing slash when the input
///    ended with `/` or `/.`.
///
/// # Examples
///
/// ```
/// use rttp_router::path::clean_path;
///
/// assert_eq!(clean_path("/abc//def/./ghi/../jkl/"), "/abc/def/jkl/");
/// assert_eq!(clean_path("foo"), "/foo");
/// assert_eq!(clean_path(""), "/");
/// ```
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_owned();
    }

    let mut elements: Vec<&str> = Vec::new();
    for element in p.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                elements.pop();
            }
            real => elements.push(real),
        }
    }

    let mut out = String::with_capacity(p.len() + 1);
    for element in &elements {
        out.push('/');
        out.push_str(element);
    }

    let trailing = p.len() > 1 && matches!(p.rsplit('/').next(), Some("" | "."));
    if out.is_empty() || trailing {
        out.push('/');
    }
    out
}

/// Joins a group's absolute base path with a route's relative path.
///
/// The result is cleaned; a trailing slash on `relative` is preserved.
///
/// # Examples
///
/// ```
/// use rttp_router::path::join_paths;
///
/// assert_eq!(join_paths("/api", "v1/users"), "/api/v1/users");
/// assert_eq!(join_paths("/api/", "/users/"), "/api/users/");
/// assert_eq!(join_paths("/api", ""), "/api");
/// ```
pub fn join_paths(absolute: &str, relative: &str) -> String {
    if relative.is_empty() {
        return absolute.to_owned();
    }

    let mut joined = clean_path(&format!("{absolute}/{relative}"));
    if relative.ends_with('/') {
        if !joined.ends_with('/') {
            joined.push('/');
        }
    } else if joined.len() > 1 && joined.ends_with('/') {
        joined.pop();
    }
    joined
}

/// Number of wildcard markers (`:` and `*`) in a route pattern.
///
/// This is an upper bound on the number of parameters a match on the pattern
/// can bind.
pub fn count_params(pattern: &str) -> usize {
    pattern.bytes().filter(|&b| b == b':' || b == b'*').count()
}

/// Number of `/` separators in a route pattern, its section depth.
pub fn count_sections(pattern: &str) -> usize {
    pattern.bytes().filter(|&b| b == b'/').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_keeps_canonical_paths() {
        for p in ["/", "/abc", "/a/b/c", "/abc/", "/a/b/c/"] {
            assert_eq!(clean_path(p), p);
        }
    }

    #[test]
    fn clean_collapses_slashes() {
        assert_eq!(clean_path("//"), "/");
        assert_eq!(clean_path("/abc//"), "/abc/");
        assert_eq!(clean_path("/abc//def//ghi"), "/abc/def/ghi");
        assert_eq!(clean_path("//abc"), "/abc");
    }

    #[test]
    fn clean_resolves_dot_elements() {
        assert_eq!(clean_path("/abc/."), "/abc/");
        assert_eq!(clean_path("/abc/./def"), "/abc/def");
        assert_eq!(clean_path("/./abc/def"), "/abc/def");
        assert_eq!(clean_path("/abc/def/.."), "/abc");
        assert_eq!(clean_path("/abc/def/../ghi/../jkl"), "/abc/jkl");
        assert_eq!(clean_path("/abc/../../.."), "/");
        assert_eq!(clean_path("/../abc"), "/abc");
    }

    #[test]
    fn clean_roots_relative_input() {
        assert_eq!(clean_path("abc"), "/abc");
        assert_eq!(clean_path("abc/def/"), "/abc/def/");
        assert_eq!(clean_path("."), "/");
        assert_eq!(clean_path(".."), "/");
    }

    #[test]
    fn join_handles_slashes_on_both_sides() {
        assert_eq!(join_paths("/", ""), "/");
        assert_eq!(join_paths("/a", ""), "/a");
        assert_eq!(join_paths("/a/", ""), "/a/");
        assert_eq!(join_paths("/a/", "/"), "/a/");
        assert_eq!(join_paths("/a", "/"), "/a/");
        assert_eq!(join_paths("/a", "/hola"), "/a/hola");
        assert_eq!(join_paths("/a/", "/hola"), "/a/hola");
        assert_eq!(join_paths("/a/", "/hola/"), "/a/hola/");
        assert_eq!(join_paths("/a/", "/hola//"), "/a/hola/");
        assert_eq!(join_paths("/", "/"), "/");
    }

    #[test]
    fn sizing_counts() {
        assert_eq!(count_params("/path/:param1/static/*catch-all"), 2);
        assert_eq!(count_params("/static"), 0);
        assert_eq!(count_sections("/path/:param1/static/*catch-all"), 4);
        assert_eq!(count_sections("/"), 1);
    }
}
