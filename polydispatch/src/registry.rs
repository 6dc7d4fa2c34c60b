//! Type registry.
//!
//! The registry owns every [`TypeToken`] an overloaded function can refer
//! to, the guards that classify runtime values under each token, and the
//! conversion edges used to widen parameters.
//!
//! Tokens are opaque handles allocated here. Two tokens are the same type
//! only if they are the same handle; the name given at declaration time is
//! used for diagnostics and nothing else. Every registry stamps its tokens
//! with its own id, so a token handed to a registry that did not allocate
//! it is reported as [`ConfigurationError::UnknownType`].
//!
//! The registry only grows. Registration is expected to finish before any
//! function referring to its tokens is compiled; compiled functions copy the
//! guards and converters they need and never read the registry again.

use std::any::{self, Any, TypeId};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::decl::Declarations;
use crate::dispatch::FunctionSpec;
use crate::error::{ConfigResult, ConfigurationError};
use crate::function::{self, OverloadedFn};
use crate::guard::{self, Guard};
use crate::value::Value;

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(0);

/// Opaque identity of a runtime type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken {
    registry: u32,
    index: u32,
}

impl TypeToken {
    /// Position of this token in its registry.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// A one-directional value transform attached to a conversion edge.
pub type Converter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Build a [`Converter`] from a closure.
pub fn converter<F>(f: F) -> Converter
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A registered conversion from values of `from` to values of `to`.
#[derive(Clone)]
pub struct ConversionEdge {
    pub from: TypeToken,
    pub to: TypeToken,
    pub convert: Converter,
}

impl std::fmt::Debug for ConversionEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionEdge")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// An ordered batch of guards to register.
#[derive(Clone, Default)]
pub struct GuardSpec {
    entries: Vec<(TypeToken, Guard)>,
}

impl GuardSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard for `token`.
    pub fn guard<F>(mut self, token: TypeToken, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.entries.push((token, guard::guard(predicate)));
        self
    }

    /// Append an already shared guard for `token`.
    pub fn shared(mut self, token: TypeToken, predicate: Guard) -> Self {
        self.entries.push((token, predicate));
        self
    }

    pub fn entries(&self) -> &[(TypeToken, Guard)] {
        &self.entries
    }
}

/// An ordered batch of conversions to register.
#[derive(Clone, Default)]
pub struct ConversionSpec {
    edges: Vec<ConversionEdge>,
}

impl ConversionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a conversion from `from` to `to`.
    pub fn conversion<F>(mut self, from: TypeToken, to: TypeToken, convert: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.edges.push(ConversionEdge {
            from,
            to,
            convert: converter(convert),
        });
        self
    }

    /// Append an already shared converter.
    pub fn shared(mut self, from: TypeToken, to: TypeToken, convert: Converter) -> Self {
        self.edges.push(ConversionEdge { from, to, convert });
        self
    }

    pub fn edges(&self) -> &[ConversionEdge] {
        &self.edges
    }
}

/// Anything that [`TypeRegistry::add`] accepts.
#[derive(Clone)]
pub enum TypeSpec {
    Guards(GuardSpec),
    Conversions(ConversionSpec),
}

impl From<GuardSpec> for TypeSpec {
    fn from(spec: GuardSpec) -> Self {
        TypeSpec::Guards(spec)
    }
}

impl From<ConversionSpec> for TypeSpec {
    fn from(spec: ConversionSpec) -> Self {
        TypeSpec::Conversions(spec)
    }
}

/// What a token classifies.
#[derive(Debug, Clone, Copy)]
enum TokenKind {
    /// A primitive marker or sentinel with no Rust type behind it.
    Structural,
    /// A concrete Rust type; eligible for auto-registration.
    Nominal(TypeId),
}

struct TypeEntry {
    name: String,
    kind: TokenKind,
    guards: Vec<Guard>,
}

/// Guards and conversions keyed by [`TypeToken`].
pub struct TypeRegistry {
    id: u32,
    config: RegistryConfig,
    types: Vec<TypeEntry>,
    nominal: FxHashMap<TypeId, TypeToken>,
    conversions: FxHashMap<TypeToken, Vec<ConversionEdge>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            config,
            types: Vec::new(),
            nominal: FxHashMap::default(),
            conversions: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Allocate a fresh structural token.
    ///
    /// Every call returns a new token, even for a name seen before.
    pub fn declare(&mut self, name: impl Into<String>) -> TypeToken {
        self.push_entry(name.into(), TokenKind::Structural)
    }

    /// The token for the Rust type `T`, allocated on first use.
    pub fn nominal<T: Any>(&mut self) -> TypeToken {
        let id = TypeId::of::<T>();
        if let Some(&token) = self.nominal.get(&id) {
            return token;
        }
        let token = self.push_entry(short_type_name::<T>().to_string(), TokenKind::Nominal(id));
        self.nominal.insert(id, token);
        token
    }

    fn push_entry(&mut self, name: String, kind: TokenKind) -> TypeToken {
        let token = TypeToken {
            registry: self.id,
            index: self.types.len() as u32,
        };
        debug!(registry = self.id, token = token.index, %name, ?kind, "declared type");
        self.types.push(TypeEntry {
            name,
            kind,
            guards: Vec::new(),
        });
        token
    }

    /// Number of tokens allocated so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `token` was allocated by this registry.
    pub fn owns(&self, token: TypeToken) -> bool {
        token.registry == self.id && token.index() < self.types.len()
    }

    /// Diagnostic name of a token.
    pub fn name(&self, token: TypeToken) -> &str {
        if !self.owns(token) {
            return "<foreign type>";
        }
        &self.types[token.index()].name
    }

    fn entry(&self, token: TypeToken) -> ConfigResult<&TypeEntry> {
        if !self.owns(token) {
            return Err(self.unknown(token));
        }
        Ok(&self.types[token.index()])
    }

    fn entry_mut(&mut self, token: TypeToken) -> ConfigResult<&mut TypeEntry> {
        if !self.owns(token) {
            return Err(self.unknown(token));
        }
        Ok(&mut self.types[token.index()])
    }

    fn unknown(&self, token: TypeToken) -> ConfigurationError {
        ConfigurationError::UnknownType {
            name: self.name(token).to_string(),
        }
    }

    /// Append a guard to `token`'s guard list.
    ///
    /// Registering the same shared guard twice for one token is a no-op.
    pub fn register_guard(&mut self, token: TypeToken, predicate: Guard) -> ConfigResult<()> {
        let entry = self.entry_mut(token)?;
        if entry.guards.iter().any(|g| Arc::ptr_eq(g, &predicate)) {
            return Ok(());
        }
        entry.guards.push(predicate);
        debug!(token = token.index, guards = entry.guards.len(), "registered guard");
        Ok(())
    }

    /// Append a conversion edge ending at `to`.
    ///
    /// Registering the same shared converter twice for one edge is a no-op.
    pub fn register_conversion(
        &mut self,
        from: TypeToken,
        to: TypeToken,
        convert: Converter,
    ) -> ConfigResult<()> {
        self.entry(from)?;
        self.entry(to)?;
        let edges = self.conversions.entry(to).or_default();
        if edges
            .iter()
            .any(|e| e.from == from && Arc::ptr_eq(&e.convert, &convert))
        {
            return Ok(());
        }
        edges.push(ConversionEdge { from, to, convert });
        debug!(from = from.index, to = to.index, "registered conversion");
        Ok(())
    }

    /// Register every guard or conversion in `spec`, in order.
    ///
    /// Every token is checked before anything is registered, so a rejected
    /// spec leaves the registry unchanged.
    pub fn add(&mut self, spec: impl Into<TypeSpec>) -> ConfigResult<()> {
        match spec.into() {
            TypeSpec::Guards(spec) => {
                for (token, _) in &spec.entries {
                    self.entry(*token)?;
                }
                for (token, predicate) in spec.entries {
                    self.register_guard(token, predicate)?;
                }
            }
            TypeSpec::Conversions(spec) => {
                for edge in &spec.edges {
                    self.entry(edge.from)?;
                    self.entry(edge.to)?;
                }
                for edge in spec.edges {
                    self.register_conversion(edge.from, edge.to, edge.convert)?;
                }
            }
        }
        Ok(())
    }

    /// Conversion edges ending at `to`, in registration order.
    pub fn conversions_to(&self, to: TypeToken) -> &[ConversionEdge] {
        self.conversions.get(&to).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Seed an is-instance-of guard for a nominal token.
    ///
    /// Returns `false` when nothing was seeded: the token already has guards
    /// or it is structural.
    pub fn auto_register(&mut self, token: TypeToken) -> ConfigResult<bool> {
        let entry = self.entry_mut(token)?;
        match entry.kind {
            TokenKind::Nominal(id) if entry.guards.is_empty() => {
                entry.guards.push(instance_guard(id));
                debug!(token = token.index, "auto-registered nominal guard");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Compile `spec` against this registry. See [`function::compile`].
    pub fn compile(&self, spec: &FunctionSpec) -> ConfigResult<OverloadedFn> {
        function::compile(self, spec)
    }

    /// Order `decls` by the declaration convention and compile the result.
    pub fn compile_declarations(&self, decls: Declarations) -> ConfigResult<OverloadedFn> {
        function::compile(self, &decls.into_function_spec())
    }

    /// The guard a value must pass to belong to `token`: the intersection of
    /// every guard registered for it.
    pub fn resolve_guard(&self, token: TypeToken) -> ConfigResult<Guard> {
        let entry = self.entry(token)?;
        if !entry.guards.is_empty() {
            return Ok(guard::intersect(entry.guards.clone()));
        }
        match entry.kind {
            TokenKind::Nominal(id) if self.config.auto_register => Ok(instance_guard(id)),
            _ => Err(self.unknown(token)),
        }
    }
}

fn instance_guard(id: TypeId) -> Guard {
    guard::guard(move |value| value.type_id() == id)
}

/// `a::b::Pair` becomes `Pair`; generic names are kept whole.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = any::type_name::<T>();
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}
