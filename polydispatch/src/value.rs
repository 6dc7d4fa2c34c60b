//! Type-erased runtime values.
//!
//! Overloads are selected by inspecting arguments at call time, so every
//! argument travels as a [`Value`]: a shared, thread-safe `dyn Any` that
//! also remembers the Rust type name of its payload for diagnostics.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A runtime value passed to, or returned from, an overloaded function.
///
/// Cloning a `Value` is cheap: the payload is reference counted and never
/// mutated after construction.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// Wrap a payload.
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            inner: Arc::new(payload),
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// The unit value, used as the result of methods with nothing to return.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Check whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the payload as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The [`TypeId`] of the payload.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the payload.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the payload as a plain `Any`, e.g. to pass it on as a receiver.
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self.inner.as_ref()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}
