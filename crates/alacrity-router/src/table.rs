//! Method-aware route table.
//!
//! Owns one [`PathMatcher`] per HTTP method. GET and POST get dedicated
//! matchers since they dominate real traffic; every other method goes through
//! a per-method map. No synthetic string keys are built on the lookup path.

use std::collections::HashMap;

use http::Method;

use crate::matcher::{Matched, PathMatcher, PatternError, RouteId};
use crate::params::Params;

/// Opaque handle returned by [`RouteTable::add_route`], used to reverse the
/// registration later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHandle {
    method: Method,
    id: RouteId,
}

impl RouteHandle {
    /// The method the route was registered under.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// A successful method + path lookup.
///
/// Holds a non-owning reference back into the table, so the match can be
/// handed to [`RouteTable::remove_route`] (via [`RouteMatch::handle`]) to
/// reverse the registration it came from.
#[derive(Debug)]
pub struct RouteMatch<'r, T> {
    matched: Matched<'r, T>,
    handle: RouteHandle,
}

impl<'r, T> RouteMatch<'r, T> {
    /// The queried path, query excluded.
    #[must_use]
    pub fn path(&self) -> &str {
        self.matched.path()
    }

    /// The template that matched.
    #[must_use]
    pub fn name(&self) -> &'r str {
        self.matched.name()
    }

    /// Everything after `?` in the queried path (empty when absent).
    #[must_use]
    pub fn tail(&self) -> &str {
        self.matched.tail()
    }

    /// Raw captured variables; empty for a literal match.
    #[must_use]
    pub fn vars(&self) -> &Params {
        self.matched.vars()
    }

    /// The payload stored at registration.
    #[must_use]
    pub fn payload(&self) -> &'r T {
        self.matched.payload()
    }

    /// Handle identifying the registered route this match resolved to.
    #[must_use]
    pub fn handle(&self) -> &RouteHandle {
        &self.handle
    }
}

/// Routes indexed by HTTP method.
///
/// Registration is a configuration-time activity; the table is expected to be
/// read-only once traffic is flowing. See the crate docs for match-order
/// rules.
pub struct RouteTable<T> {
    get: PathMatcher<T>,
    post: PathMatcher<T>,
    other: HashMap<Method, PathMatcher<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            get: PathMatcher::new(),
            post: PathMatcher::new(),
            other: HashMap::new(),
        }
    }

    /// Registers `template` under `method`, storing `payload` with it.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the template does not compile.
    pub fn add_route(
        &mut self,
        method: &Method,
        template: &str,
        payload: T,
    ) -> Result<RouteHandle, PatternError> {
        let id = self.matcher_mut(method).add(template, payload)?;
        Ok(RouteHandle {
            method: method.clone(),
            id,
        })
    }

    /// Looks up `target` (path with optional `?query`) under `method`.
    ///
    /// Returns `None` when no route matches; a miss is not an error.
    #[must_use]
    pub fn map_route(&self, method: &Method, target: &str) -> Option<RouteMatch<'_, T>> {
        let matched = self.matcher(method)?.lookup(target)?;
        let handle = RouteHandle {
            method: method.clone(),
            id: matched.id(),
        };
        Some(RouteMatch { matched, handle })
    }

    /// Reverses the registration behind `handle`, returning its payload.
    pub fn remove_route(&mut self, handle: &RouteHandle) -> Option<T> {
        match handle.method {
            Method::GET => self.get.remove(handle.id),
            Method::POST => self.post.remove(handle.id),
            _ => self
                .other
                .get_mut(&handle.method)
                .and_then(|m| m.remove(handle.id)),
        }
    }

    /// Returns the total number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.get.len() + self.post.len() + self.other.values().map(PathMatcher::len).sum::<usize>()
    }

    /// Returns `true` when no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matcher(&self, method: &Method) -> Option<&PathMatcher<T>> {
        match *method {
            Method::GET => Some(&self.get),
            Method::POST => Some(&self.post),
            _ => self.other.get(method),
        }
    }

    fn matcher_mut(&mut self, method: &Method) -> &mut PathMatcher<T> {
        match *method {
            Method::GET => &mut self.get,
            Method::POST => &mut self.post,
            _ => self.other.entry(method.clone()).or_default(),
        }
    }
}
