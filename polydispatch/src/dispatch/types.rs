//! Core type definitions for dispatch.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::registry::TypeToken;
use crate::signature::CompiledSignature;
use crate::value::Value;

/// An implementation behind an overloaded function.
///
/// Receives the caller's receiver (if any) and the arguments after
/// conversion, and returns its result unchanged to the caller.
pub type Method = Arc<dyn Fn(Option<&dyn Any>, Vec<Value>) -> Value + Send + Sync>;

/// Build a [`Method`] that ignores the receiver.
pub fn method<F>(f: F) -> Method
where
    F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
{
    Arc::new(move |_receiver: Option<&dyn Any>, args: Vec<Value>| f(args))
}

/// Build a [`Method`] that reads the receiver.
pub fn method_with_receiver<F>(f: F) -> Method
where
    F: Fn(Option<&dyn Any>, Vec<Value>) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One declared overload: a parameter list and its implementation.
///
/// Each parameter is the set of types it accepts, in preference order.
#[derive(Clone)]
pub struct Overload {
    pub params: Vec<Vec<TypeToken>>,
    pub method: Method,
}

impl Overload {
    pub fn new(params: Vec<Vec<TypeToken>>, method: Method) -> Self {
        Self { params, method }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Everything needed to compile one overloaded function.
///
/// Overloads are tried in the order given here; the first that accepts the
/// arguments wins.
#[derive(Clone, Debug, Default)]
pub struct FunctionSpec {
    pub name: Option<String>,
    pub overloads: Vec<Overload>,
}

impl FunctionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function name reported by errors and introspection.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an overload that ignores the receiver.
    pub fn overload<F>(mut self, params: Vec<Vec<TypeToken>>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        self.overloads.push(Overload::new(params, method(f)));
        self
    }

    /// Append a prepared overload.
    pub fn push(mut self, overload: Overload) -> Self {
        self.overloads.push(overload);
        self
    }
}

/// A compiled overload: the guard deciding its eligibility and the method
/// to run when it is selected.
#[derive(Clone)]
pub struct Candidate {
    pub(crate) signature: CompiledSignature,
    pub(crate) method: Method,
}

impl Candidate {
    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    pub fn signature(&self) -> &CompiledSignature {
        &self.signature
    }

    /// Check exact arity and per-position membership.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.signature.accepts(args)
    }

    /// Replace each argument that needs widening with its converted value.
    ///
    /// Only meaningful for arguments this candidate accepted.
    pub fn convert_args(&self, args: &mut [Value]) {
        for (slot, arg) in self.signature.slots().iter().zip(args.iter_mut()) {
            if let Some(convert) = slot.converter_for(arg) {
                *arg = convert(&*arg);
            }
        }
    }

    /// Run the method.
    pub fn invoke(&self, receiver: Option<&dyn Any>, args: Vec<Value>) -> Value {
        (self.method)(receiver, args)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Candidate")
            .field(&self.signature.render())
            .finish()
    }
}
