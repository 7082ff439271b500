//! Live registration: a router that can gain routes while it serves traffic.
//!
//! Readers load the current snapshot without locking. Writers serialize on
//! one mutex, mutate a private copy and publish it with a single atomic
//! swap, so a reader sees either the old or the new route table, never a
//! tree in the middle of a split.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use super::Router;
use crate::error::RouteResult;

/// A [`Router`] shared between request tasks and a registering writer.
///
/// # Examples
///
/// ```
/// use rttp_router::{Method, Router, Routes, SharedRouter};
///
/// let shared = SharedRouter::new(Router::new());
/// shared.update(|router| router.get("/ping", ["pong"])).unwrap();
///
/// let router = shared.load();
/// let mut ctx = router.new_context();
/// assert!(router.find(&Method::Get, "/ping", &mut ctx, false).handlers.is_some());
/// ```
pub struct SharedRouter<T> {
    current: ArcSwap<Router<T>>,
    writer: Mutex<()>,
}

impl<T: Clone> SharedRouter<T> {
    pub fn new(router: Router<T>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
            writer: Mutex::new(()),
        }
    }

    /// The current route table. The snapshot stays valid, and unchanged,
    /// for as long as the caller holds it.
    pub fn load(&self) -> Arc<Router<T>> {
        self.current.load_full()
    }

    /// Apply `register` to a copy of the current router and publish the
    /// copy if it succeeds. On error the published router is unchanged.
    ///
    /// # Errors
    ///
    /// Whatever `register` returns.
    pub fn update<F>(&self, register: F) -> RouteResult<()>
    where
        F: FnOnce(&mut Router<T>) -> RouteResult<()>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Router::clone(&self.current.load());
        register(&mut next)?;
        self.current.store(Arc::new(next));
        Ok(())
    }
}
