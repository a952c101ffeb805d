//! Ordered middleware lists.

use std::fmt;
use std::sync::Arc;

use crate::middleware::{BoxedMiddleware, Middleware};

/// An ordered, append-only list of middleware.
///
/// Index 0 is the outermost layer once composed. Both the router-wide
/// chain and each route's own chain use this type.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Later entries sit closer to the handler.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.stages.push(Arc::new(middleware));
    }

    /// Appends an already shared middleware.
    pub fn push_boxed(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Appends every middleware of `other`, keeping its order.
    pub fn extend(&mut self, other: &Self) {
        self.stages.extend(other.stages.iter().cloned());
    }

    /// Returns the number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the middleware names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Iterates the chain in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BoxedMiddleware> {
        self.stages.iter()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FromIterator<BoxedMiddleware> for Chain {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnMiddleware;
    use trellis_core::Handler;

    fn noop(name: &str) -> FnMiddleware<fn(Handler) -> Handler> {
        FnMiddleware::new(name, (|next: Handler| next) as fn(Handler) -> Handler)
    }

    #[test]
    fn test_push_keeps_order() {
        let mut chain = Chain::new();
        chain.push(noop("a"));
        chain.push(noop("b"));
        chain.push(noop("c"));

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extend_appends() {
        let mut first = Chain::new();
        first.push(noop("a"));
        let mut second = Chain::new();
        second.push(noop("b"));
        second.push(noop("c"));

        first.extend(&second);
        assert_eq!(first.names(), vec!["a", "b", "c"]);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_empty_chain() {
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(format!("{chain:?}"), "[]");
    }
}
