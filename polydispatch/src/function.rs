//! Overloaded function objects.
//!
//! [`OverloadedFn`] wraps a [`Dispatcher`] into a single callable: select a
//! candidate, convert the arguments it widened, run its method and hand the
//! result back untouched.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::{DispatchResult, Dispatcher, FunctionSpec};
use crate::error::ConfigResult;
use crate::registry::TypeRegistry;
use crate::value::Value;

/// Compile `spec` against `registry` into a callable.
///
/// All configuration errors surface here, never at call time.
pub fn compile(registry: &TypeRegistry, spec: &FunctionSpec) -> ConfigResult<OverloadedFn> {
    Ok(OverloadedFn::build(Dispatcher::build(registry, spec)?))
}

/// A compiled overloaded function.
///
/// Cheap to clone; clones share the same dispatcher. Calls never write
/// shared state, so one function may be called from many threads at once.
#[derive(Clone)]
pub struct OverloadedFn {
    dispatcher: Arc<Dispatcher>,
}

impl OverloadedFn {
    pub fn build(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn name(&self) -> &str {
        self.dispatcher.name()
    }

    /// Declared arity: the largest parameter count among the overloads.
    pub fn arity(&self) -> usize {
        self.dispatcher.max_arity()
    }

    /// Smallest and largest parameter counts among the overloads.
    pub fn arity_range(&self) -> (usize, usize) {
        (self.dispatcher.min_arity(), self.dispatcher.max_arity())
    }

    pub fn candidate_count(&self) -> usize {
        self.dispatcher.candidates().len()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Call without a receiver.
    pub fn call(&self, args: Vec<Value>) -> DispatchResult<Value> {
        self.call_with(None, args)
    }

    /// Call with the given receiver passed through to the selected method.
    pub fn call_with(
        &self,
        receiver: Option<&dyn Any>,
        mut args: Vec<Value>,
    ) -> DispatchResult<Value> {
        let candidate = self.dispatcher.select(&args)?;
        candidate.convert_args(&mut args);
        Ok(candidate.invoke(receiver, args))
    }
}

impl fmt::Debug for OverloadedFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverloadedFn")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("candidates", &self.candidate_count())
            .finish()
    }
}
