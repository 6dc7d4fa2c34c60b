//! Guard combinators.
//!
//! A guard is a predicate over a single [`Value`]; a tuple guard is a
//! predicate over a whole argument list. Everything the dispatcher checks
//! at call time is assembled from the three combinators in this module:
//!
//! - [`intersect`] - every guard must accept (refines a type with extra checks)
//! - [`union`] - any guard may accept, tested in order
//! - [`tuple`] - exact argument count plus one guard per position
//!
//! Combinators are pure: they capture their inputs and never hold mutable
//! state, so the resulting guards are safe to share across threads.

use std::sync::Arc;

use crate::value::Value;

/// A predicate classifying a single runtime value.
pub type Guard = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A predicate over a complete argument list.
pub type TupleGuard = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// Build a [`Guard`] from a closure.
pub fn guard<F>(f: F) -> Guard
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Accept a value only if every guard accepts it.
///
/// An empty list accepts everything. A single guard is returned as is.
pub fn intersect(guards: Vec<Guard>) -> Guard {
    match guards.len() {
        0 => Arc::new(|_: &Value| true),
        1 => Arc::clone(&guards[0]),
        _ => Arc::new(move |value: &Value| guards.iter().all(|g| g(value))),
    }
}

/// Accept a value if any guard accepts it.
///
/// Guards are tried in order and the scan stops at the first acceptance.
/// An empty list accepts nothing.
pub fn union(guards: Vec<Guard>) -> Guard {
    match guards.len() {
        0 => Arc::new(|_: &Value| false),
        1 => Arc::clone(&guards[0]),
        _ => Arc::new(move |value: &Value| guards.iter().any(|g| g(value))),
    }
}

/// Accept an argument list of exactly `slots.len()` values where each
/// position is accepted by the guard at the same index.
pub fn tuple(slots: Vec<Guard>) -> TupleGuard {
    Arc::new(move |args: &[Value]| {
        args.len() == slots.len() && slots.iter().zip(args).all(|(g, arg)| g(arg))
    })
}
