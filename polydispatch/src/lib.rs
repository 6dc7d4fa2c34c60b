//! Polydispatch: runtime multiple dispatch for Rust.
//!
//! Builds a single callable out of several implementations, each guarded
//! by a declared parameter-type pattern. Every call selects the first
//! implementation whose pattern accepts the runtime arguments, widening
//! arguments through registered conversions where a parameter allows it.
//!
//! # Pipeline
//!
//! 1. **Register**: declare [`TypeToken`]s and attach guards and conversions
//!    to them in a [`TypeRegistry`]
//! 2. **Compile**: turn a [`FunctionSpec`] into an [`OverloadedFn`]; every
//!    configuration mistake is reported here
//! 3. **Call**: [`OverloadedFn::call`] selects, converts and invokes
//!
//! [`Overloads`] bundles a registry with the `add` and `compile` steps.
//!
//! # Example
//!
//! ```
//! use polydispatch::{ConversionSpec, FunctionSpec, GuardSpec, TypeRegistry, Value};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Pair(f64, f64);
//!
//! let mut registry = TypeRegistry::new();
//! let number = registry.declare("number");
//! let pair = registry.nominal::<Pair>();
//! registry.add(GuardSpec::new()
//!     .guard(number, |v| v.is::<f64>())
//!     .guard(pair, |v| v.is::<Pair>()))?;
//! registry.add(ConversionSpec::new().conversion(number, pair, |v| {
//!     Value::new(Pair(*v.downcast_ref::<f64>().unwrap_or(&0.0), 0.0))
//! }))?;
//!
//! let mul = registry.compile(&FunctionSpec::new()
//!     .named("mul")
//!     .overload(vec![vec![number], vec![number]], |args| {
//!         let a = args[0].downcast_ref::<f64>().copied().unwrap_or_default();
//!         let b = args[1].downcast_ref::<f64>().copied().unwrap_or_default();
//!         Value::new(a * b)
//!     })
//!     .overload(vec![vec![pair], vec![pair]], |args| {
//!         let a = args[0].downcast_ref::<Pair>().cloned().unwrap_or(Pair(0.0, 0.0));
//!         let b = args[1].downcast_ref::<Pair>().cloned().unwrap_or(Pair(0.0, 0.0));
//!         Value::new(Pair(a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0))
//!     }))?;
//!
//! let out = mul.call(vec![Value::new(3.0_f64), Value::new(Pair(0.0, 6.0))])?;
//! assert_eq!(out.downcast_ref::<Pair>(), Some(&Pair(0.0, 18.0)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod decl;
pub mod dispatch;
pub mod error;
pub mod function;
pub mod guard;
pub mod registry;
pub mod signature;
pub mod value;

pub use config::{ConversionReach, RegistryConfig};
pub use decl::Declarations;
pub use dispatch::{
    method, method_with_receiver, Candidate, DispatchError, DispatchResult, Dispatcher,
    FunctionSpec, Method, NoMatchError, Overload,
};
pub use error::{ConfigLoadError, ConfigResult, ConfigurationError};
pub use function::{compile, OverloadedFn};
pub use guard::{Guard, TupleGuard};
pub use registry::{
    ConversionEdge, ConversionSpec, Converter, GuardSpec, TypeRegistry, TypeSpec, TypeToken,
};
pub use signature::{compile_parameter, compile_signature, CompiledSignature, ParameterSlot};
pub use value::Value;

/// A [`TypeRegistry`] together with the two operations a host needs:
/// [`add`](Overloads::add) type specs, then [`compile`](Overloads::compile)
/// overloaded functions against them.
#[derive(Default)]
pub struct Overloads {
    registry: TypeRegistry,
}

impl Overloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            registry: TypeRegistry::with_config(config),
        }
    }

    /// Allocate a fresh structural token. See [`TypeRegistry::declare`].
    pub fn declare(&mut self, name: impl Into<String>) -> TypeToken {
        self.registry.declare(name)
    }

    /// The token for the Rust type `T`. See [`TypeRegistry::nominal`].
    pub fn nominal<T: std::any::Any>(&mut self) -> TypeToken {
        self.registry.nominal::<T>()
    }

    /// Register one guard or conversion spec.
    pub fn add(&mut self, spec: impl Into<TypeSpec>) -> ConfigResult<&mut Self> {
        self.registry.add(spec)?;
        Ok(self)
    }

    /// Register several specs in order, stopping at the first rejected one.
    ///
    /// Specs before the rejected one stay registered.
    pub fn add_all<I>(&mut self, specs: I) -> ConfigResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<TypeSpec>,
    {
        for spec in specs {
            self.registry.add(spec)?;
        }
        Ok(self)
    }

    pub fn compile(&self, spec: &FunctionSpec) -> ConfigResult<OverloadedFn> {
        self.registry.compile(spec)
    }

    pub fn compile_declarations(&self, decls: Declarations) -> ConfigResult<OverloadedFn> {
        self.registry.compile_declarations(decls)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }
}
