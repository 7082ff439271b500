//! Per-request scratch state: the parameter list and the backtracking stack.
//!
//! A [`Context`] is owned by exactly one in-flight request. Dispatchers that pool
//! contexts call [`Context::reset`] between requests: both buffers drop back to
//! zero length but keep their allocations, so a warmed-up context matches
//! without allocating and never leaks values from the previous request.

use std::fmt;

use crate::tree::BacktrackFrame;

/// A single path parameter bound by a match: the name from the pattern and the
/// value taken from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'r> {
    pub key: &'r str,
    pub value: String,
}

/// Path parameters extracted from the matched route, in pattern order.
///
/// Keys borrow from the route tree. Value strings are recycled: truncating the
/// list only moves the logical length, so the next push reuses the old
/// allocation.
#[derive(Default, Clone)]
pub struct Params<'r> {
    slots: Vec<Param<'r>>,
    len: usize,
}

impl<'r> Params<'r> {
    /// Create a new empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `capacity` parameters
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Get the value bound to `key`, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_name(key).map(|p| p.value.as_str())
    }

    /// Get the first binding named `key`
    pub fn by_name(&self, key: &str) -> Option<&Param<'r>> {
        self.as_slice().iter().find(|p| p.key == key)
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bound parameters as a slice, in pattern order
    pub fn as_slice(&self) -> &[Param<'r>] {
        &self.slots[..self.len]
    }

    /// Iterate over `(key, value)` pairs in pattern order
    pub fn iter(&self) -> impl Iterator<Item = (&'r str, &str)> + '_ {
        self.as_slice().iter().map(|p| (p.key, p.value.as_str()))
    }

    /// Drop every binding, keeping the allocations
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Append a binding. With `unescape`, `+` and percent-escapes in `raw` are
    /// decoded; a value that does not decode to UTF-8 is kept verbatim.
    pub(crate) fn push(&mut self, key: &'r str, raw: &str, unescape: bool) {
        if self.len == self.slots.len() {
            self.slots.push(Param {
                key,
                value: String::with_capacity(raw.len()),
            });
        }
        let slot = &mut self.slots[self.len];
        slot.key = key;
        write_value(&mut slot.value, raw, unescape);
        self.len += 1;
    }
}

fn write_value(slot: &mut String, raw: &str, unescape: bool) {
    slot.clear();
    if unescape && raw.bytes().any(|b| b == b'%' || b == b'+') {
        let spaced = raw.replace('+', " ");
        match urlencoding::decode(&spaced) {
            Ok(decoded) => slot.push_str(&decoded),
            Err(_) => slot.push_str(raw),
        }
    } else {
        slot.push_str(raw);
    }
}

impl PartialEq for Params<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Params<'_> {}

impl fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Per-request routing state: reusable parameter and backtracking buffers.
///
/// `'r` is the lifetime of the router the context matches against. Create one
/// with [`Router::new_context`](crate::router::Router::new_context) so both
/// buffers are sized from the registered routes.
pub struct Context<'r, T> {
    params: Params<'r>,
    backtrack: Vec<BacktrackFrame<'r, T>>,
}

impl<'r, T> Context<'r, T> {
    /// Create a context with room for `max_params` parameters and
    /// `max_frames` backtracking frames
    pub fn with_capacity(max_params: usize, max_frames: usize) -> Self {
        Self {
            params: Params::with_capacity(max_params),
            backtrack: Vec::with_capacity(max_frames),
        }
    }

    /// Parameters bound by the most recent match
    pub fn params(&self) -> &Params<'r> {
        &self.params
    }

    /// Reset both buffers to zero length without releasing their memory
    pub fn reset(&mut self) {
        self.params.clear();
        self.backtrack.clear();
    }

    pub(crate) fn buffers(&mut self) -> (&mut Params<'r>, &mut Vec<BacktrackFrame<'r, T>>) {
        (&mut self.params, &mut self.backtrack)
    }

    pub(crate) fn backtrack_capacity(&self) -> usize {
        self.backtrack.capacity()
    }
}

impl<T> Default for Context<'_, T> {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}
