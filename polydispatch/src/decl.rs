//! Declarative overload collection.
//!
//! [`Declarations`] records implementations in the order they are written
//! down and turns them into a [`FunctionSpec`] using the declaration
//! ordering convention:
//!
//! - implementations are grouped by name, groups ordered by each name's
//!   first appearance;
//! - within a group, the most recently declared signature comes first.
//!
//! This mirrors stacking several signature declarations on one named
//! implementation, where the innermost (last written) one is applied last
//! and should win ties. The dispatcher itself knows nothing about this
//! convention; it only sees the resulting order.

use indexmap::IndexMap;
use tracing::debug;

use crate::dispatch::{method, FunctionSpec, Method, Overload};
use crate::registry::TypeToken;
use crate::value::Value;

/// An ordered collection of named overload declarations.
#[derive(Default)]
pub struct Declarations {
    name: Option<String>,
    groups: IndexMap<String, Vec<Overload>>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the function name; otherwise the first declared name is used.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare a signature for the implementation `name`.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        params: Vec<Vec<TypeToken>>,
        method: Method,
    ) -> &mut Self {
        self.groups
            .entry(name.into())
            .or_default()
            .push(Overload::new(params, method));
        self
    }

    /// Declare a signature whose method ignores the receiver.
    pub fn declare_fn<F>(
        &mut self,
        name: impl Into<String>,
        params: Vec<Vec<TypeToken>>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        self.declare(name, params, method(f))
    }

    /// Implementation names in first-appearance order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of declared signatures across all names.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the candidate list in dispatch order.
    pub fn into_function_spec(self) -> FunctionSpec {
        let name = self
            .name
            .or_else(|| self.groups.keys().next().cloned());
        let overloads: Vec<Overload> = self
            .groups
            .into_values()
            .flat_map(|group| group.into_iter().rev())
            .collect();
        debug!(function = ?name, overloads = overloads.len(), "ordered declarations");
        FunctionSpec { name, overloads }
    }
}
