//! Signature compilation.
//!
//! Turns declared parameter types into matchable slots. Each parameter
//! declares a set of accepted types; the compiler widens that set with
//! every type that has a conversion edge into it, then freezes the guards
//! and converters needed to recognise and convert arguments at call time.
//!
//! # Widening
//!
//! 1. Declared types are accepted as they are (no conversion).
//! 2. For each accepted type, conversion edges ending at it add their
//!    source type, unless that type is already accepted. Under
//!    [`ConversionReach::SingleHop`] only edges into declared types are
//!    followed; under [`ConversionReach::Transitive`] newly added types are
//!    expanded too, composing converters along the way.
//! 3. Membership is tested in insertion order: declared types first, then
//!    widened types in the order they were reached.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::config::ConversionReach;
use crate::error::ConfigResult;
use crate::guard::{self, Guard, TupleGuard};
use crate::registry::{Converter, TypeRegistry, TypeToken};
use crate::value::Value;

/// One accepted type within a parameter slot.
#[derive(Clone)]
struct SlotMember {
    token: TypeToken,
    guard: Guard,
    /// `None` for declared types.
    converter: Option<Converter>,
}

/// A compiled parameter: what it accepts and how to convert what it accepts.
#[derive(Clone)]
pub struct ParameterSlot {
    members: Vec<SlotMember>,
    guard: Guard,
    widened: bool,
    label: String,
}

impl ParameterSlot {
    /// Every accepted type, declared types first.
    pub fn accepted(&self) -> impl Iterator<Item = TypeToken> + '_ {
        self.members.iter().map(|m| m.token)
    }

    /// Union of the accepted types' guards.
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Whether any accepted type needs a conversion.
    pub fn is_widened(&self) -> bool {
        self.widened
    }

    /// Human readable rendering of the declared types, e.g. `number | Pair`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The converter for an accepted value, if it needs one.
    ///
    /// The first accepted type (in slot order) whose guard passes decides;
    /// if that type was declared, the value is used as is.
    pub fn converter_for(&self, value: &Value) -> Option<&Converter> {
        if !self.widened {
            return None;
        }
        self.members
            .iter()
            .find(|m| (m.guard)(value))
            .and_then(|m| m.converter.as_ref())
    }
}

/// An ordered list of parameter slots plus the tuple guard over them.
#[derive(Clone)]
pub struct CompiledSignature {
    slots: Vec<ParameterSlot>,
    tuple_guard: TupleGuard,
}

impl CompiledSignature {
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    pub fn tuple_guard(&self) -> &TupleGuard {
        &self.tuple_guard
    }

    /// Check an argument list against this signature.
    pub fn accepts(&self, args: &[Value]) -> bool {
        (self.tuple_guard)(args)
    }

    /// Render the parameter list, e.g. `(number, Pair)`.
    pub fn render(&self) -> String {
        let labels: Vec<&str> = self.slots.iter().map(ParameterSlot::label).collect();
        format!("({})", labels.join(", "))
    }
}

/// Compile one parameter from its declared types.
///
/// Fails with `UnknownType` if a declared or widened type cannot be
/// resolved to a guard.
pub fn compile_parameter(
    registry: &TypeRegistry,
    declared: &[TypeToken],
) -> ConfigResult<ParameterSlot> {
    let mut accepted: IndexMap<TypeToken, Option<Converter>> =
        declared.iter().map(|&t| (t, None)).collect();
    let declared_len = accepted.len();

    match registry.config().conversion_reach {
        ConversionReach::SingleHop => {
            for &target in declared {
                for edge in registry.conversions_to(target) {
                    if !accepted.contains_key(&edge.from) {
                        trace!(from = ?edge.from, to = ?target, "widened parameter");
                        accepted.insert(edge.from, Some(Arc::clone(&edge.convert)));
                    }
                }
            }
        }
        ConversionReach::Transitive => {
            let mut i = 0;
            while let Some((&target, onward)) = accepted.get_index(i) {
                let onward = onward.clone();
                for edge in registry.conversions_to(target) {
                    if !accepted.contains_key(&edge.from) {
                        trace!(from = ?edge.from, to = ?target, hop = i, "widened parameter");
                        let convert = compose(&edge.convert, onward.as_ref());
                        accepted.insert(edge.from, Some(convert));
                    }
                }
                i += 1;
            }
        }
    }

    let widened = accepted.len() > declared_len;
    let members = accepted
        .into_iter()
        .map(|(token, converter)| {
            Ok(SlotMember {
                token,
                guard: registry.resolve_guard(token)?,
                converter,
            })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    let guard = guard::union(members.iter().map(|m| Arc::clone(&m.guard)).collect());
    let label = members[..declared_len]
        .iter()
        .map(|m| registry.name(m.token))
        .collect::<Vec<_>>()
        .join(" | ");

    Ok(ParameterSlot {
        members,
        guard,
        widened,
        label,
    })
}

/// Compile a full parameter list.
pub fn compile_signature(
    registry: &TypeRegistry,
    params: &[Vec<TypeToken>],
) -> ConfigResult<CompiledSignature> {
    let slots = params
        .iter()
        .map(|declared| compile_parameter(registry, declared))
        .collect::<ConfigResult<Vec<_>>>()?;
    let tuple_guard = guard::tuple(slots.iter().map(|s| Arc::clone(&s.guard)).collect());
    Ok(CompiledSignature { slots, tuple_guard })
}

/// Run `first`, then `then` on its result when present.
fn compose(first: &Converter, then: Option<&Converter>) -> Converter {
    match then {
        None => Arc::clone(first),
        Some(then) => {
            let first = Arc::clone(first);
            let then = Arc::clone(then);
            Arc::new(move |value: &Value| then(&first(value)))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::RegistryConfig;
    use crate::error::ConfigurationError;
    use crate::registry::{ConversionSpec, GuardSpec};

    #[derive(Debug, Clone, PartialEq)]
    struct Pair(i64, i64);

    struct Fixture {
        registry: TypeRegistry,
        number: TypeToken,
        text: TypeToken,
        pair: TypeToken,
    }

    fn fixture(reach: ConversionReach) -> Fixture {
        let mut registry =
            TypeRegistry::with_config(RegistryConfig::default().with_conversion_reach(reach));
        let number = registry.declare("number");
        let text = registry.declare("string");
        let pair = registry.nominal::<Pair>();
        registry
            .add(
                GuardSpec::new()
                    .guard(number, |v| v.is::<i64>())
                    .guard(text, |v| v.is::<String>())
                    .guard(pair, |v| v.is::<Pair>()),
            )
            .unwrap();
        registry
            .add(ConversionSpec::new().conversion(number, pair, |v| {
                Value::new(Pair(*v.downcast_ref::<i64>().unwrap_or(&0), 0))
            }))
            .unwrap();
        Fixture {
            registry,
            number,
            text,
            pair,
        }
    }

    #[test]
    fn test_declared_only_has_no_converters() {
        let f = fixture(ConversionReach::SingleHop);
        let slot = compile_parameter(&f.registry, &[f.number]).unwrap();
        assert!(!slot.is_widened());
        assert_eq!(slot.accepted().collect::<Vec<_>>(), vec![f.number]);
        assert!(slot.converter_for(&Value::new(1_i64)).is_none());
        assert_eq!(slot.label(), "number");
    }

    #[test]
    fn test_widening_adds_source_type() {
        let f = fixture(ConversionReach::SingleHop);
        let slot = compile_parameter(&f.registry, &[f.pair]).unwrap();
        assert!(slot.is_widened());
        assert_eq!(slot.accepted().collect::<Vec<_>>(), vec![f.pair, f.number]);
        assert!((slot.guard())(&Value::new(3_i64)));
        assert!(!(slot.guard())(&Value::new(String::from("3"))));

        let convert = slot.converter_for(&Value::new(3_i64)).unwrap();
        assert_eq!(convert(&Value::new(3_i64)).downcast_ref::<Pair>(), Some(&Pair(3, 0)));
        assert!(slot.converter_for(&Value::new(Pair(0, 6))).is_none());
    }

    #[test]
    fn test_declared_type_shadows_conversion() {
        let f = fixture(ConversionReach::SingleHop);
        let slot = compile_parameter(&f.registry, &[f.pair, f.number]).unwrap();
        assert!(!slot.is_widened());
        assert!(slot.converter_for(&Value::new(3_i64)).is_none());
        assert_eq!(slot.label(), "Pair | number");
    }

    #[test]
    fn test_unknown_declared_type() {
        let mut f = fixture(ConversionReach::SingleHop);
        let ghost = f.registry.declare("ghost");
        let err = compile_parameter(&f.registry, &[ghost]).err();
        assert_eq!(
            err,
            Some(ConfigurationError::UnknownType {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_widened_type() {
        let mut f = fixture(ConversionReach::SingleHop);
        let ghost = f.registry.declare("ghost");
        f.registry
            .add(ConversionSpec::new().conversion(ghost, f.text, |v| v.clone()))
            .unwrap();
        let err = compile_parameter(&f.registry, &[f.text]).err();
        assert!(matches!(err, Some(ConfigurationError::UnknownType { name }) if name == "ghost"));
    }

    fn chain(reach: ConversionReach) -> Fixture {
        // string -> number -> Pair
        let mut f = fixture(reach);
        f.registry
            .add(ConversionSpec::new().conversion(f.text, f.number, |v| {
                let parsed = v
                    .downcast_ref::<String>()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(0);
                Value::new(parsed)
            }))
            .unwrap();
        f
    }

    #[test]
    fn test_single_hop_does_not_chain() {
        let f = chain(ConversionReach::SingleHop);
        let slot = compile_parameter(&f.registry, &[f.pair]).unwrap();
        assert_eq!(slot.accepted().collect::<Vec<_>>(), vec![f.pair, f.number]);
        assert!(!(slot.guard())(&Value::new(String::from("4"))));
    }

    #[test]
    fn test_transitive_composes_converters() {
        let f = chain(ConversionReach::Transitive);
        let slot = compile_parameter(&f.registry, &[f.pair]).unwrap();
        assert_eq!(
            slot.accepted().collect::<Vec<_>>(),
            vec![f.pair, f.number, f.text]
        );

        let arg = Value::new(String::from("4"));
        let convert = slot.converter_for(&arg).unwrap();
        assert_eq!(convert(&arg).downcast_ref::<Pair>(), Some(&Pair(4, 0)));
    }

    #[test]
    fn test_transitive_terminates_on_cycles() {
        let mut f = chain(ConversionReach::Transitive);
        f.registry
            .add(ConversionSpec::new().conversion(f.pair, f.text, |_| {
                Value::new(String::from("pair"))
            }))
            .unwrap();
        let slot = compile_parameter(&f.registry, &[f.pair]).unwrap();
        assert_eq!(slot.accepted().count(), 3);
    }

    #[test]
    fn test_signature_tuple_guard() {
        let f = fixture(ConversionReach::SingleHop);
        let sig = compile_signature(&f.registry, &[vec![f.pair], vec![f.pair]]).unwrap();
        assert_eq!(sig.arity(), 2);
        assert_eq!(sig.render(), "(Pair, Pair)");
        assert!(sig.accepts(&[Value::new(3_i64), Value::new(Pair(0, 6))]));
        assert!(!sig.accepts(&[Value::new(3_i64)]));
        assert!(!sig.accepts(&[Value::new(3_i64), Value::new(String::from("6"))]));
    }

    #[test]
    fn test_nullary_signature() {
        let f = fixture(ConversionReach::SingleHop);
        let sig = compile_signature(&f.registry, &[]).unwrap();
        assert_eq!(sig.arity(), 0);
        assert_eq!(sig.render(), "()");
        assert!(sig.accepts(&[]));
        assert!(!sig.accepts(&[Value::unit()]));
    }
}
