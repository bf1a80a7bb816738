//! Dissection filters
//!
//! A [`FilterChain`] is an ordered conjunction of predicates over a finished [`Dissection`].
//! Predicates are registered before capture starts and applied read-only afterwards; a frame
//! passes only if every predicate accepts it, checked in registration order with the first
//! rejection short-circuiting the rest.

use crate::dissect::Dissection;

type Predicate = Box<dyn Fn(&Dissection) -> bool + Send + Sync>;

/// Ordered set of accept/reject predicates.
#[derive(Default)]
pub struct FilterChain {
    predicates: Vec<Predicate>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate. Registration order is evaluation order.
    pub fn add<F>(&mut self, predicate: F)
    where
        F: Fn(&Dissection) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// `true` if every predicate accepts the dissection. An empty chain accepts everything.
    pub fn apply(&self, dissection: &Dissection) -> bool {
        self.predicates.iter().all(|p| p(dissection))
    }
}
