//! Candidate selection.
//!
//! A [`Dispatcher`] is built once from a [`FunctionSpec`] and is immutable
//! afterwards. Selection is strictly first-match: candidates are tried in
//! the order they were declared and the first whose tuple guard accepts
//! the arguments wins. There is no specificity ranking.

use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{ConfigResult, ConfigurationError};
use crate::guard::Guard;
use crate::registry::{TypeRegistry, TypeToken};
use crate::signature::compile_signature;
use crate::value::Value;

use super::result::NoMatchError;
use super::types::{Candidate, FunctionSpec};

/// Name used when a function is compiled without one.
pub const ANONYMOUS: &str = "<anonymous>";

/// A compiled, immutable candidate list with its selection procedure.
pub struct Dispatcher {
    name: String,
    candidates: Vec<Candidate>,
    min_arity: usize,
    max_arity: usize,
    /// Candidate indices per arity, in declaration order.
    by_arity: FxHashMap<usize, Vec<usize>>,
    /// Every type any slot accepts, for describing rejected arguments.
    known_types: Vec<(String, Guard)>,
}

impl Dispatcher {
    /// Compile every overload in `spec` against `registry`.
    ///
    /// Fails with `NoSignatures` for an empty spec, `AmbiguousNullary` when
    /// more than one overload takes no parameters, and `UnknownType` when a
    /// parameter refers to a type without guards.
    pub fn build(registry: &TypeRegistry, spec: &FunctionSpec) -> ConfigResult<Self> {
        let name = spec.name.clone().unwrap_or_else(|| ANONYMOUS.to_string());

        if spec.overloads.is_empty() {
            return Err(ConfigurationError::NoSignatures { name });
        }

        let nullary = spec.overloads.iter().filter(|o| o.arity() == 0).count();
        if nullary > 1 {
            return Err(ConfigurationError::AmbiguousNullary {
                name,
                count: nullary,
            });
        }

        let mut candidates = Vec::with_capacity(spec.overloads.len());
        let mut known: IndexSet<TypeToken> = IndexSet::new();
        for overload in &spec.overloads {
            let signature = compile_signature(registry, &overload.params)?;
            for slot in signature.slots() {
                known.extend(slot.accepted());
            }
            candidates.push(Candidate {
                signature,
                method: Arc::clone(&overload.method),
            });
        }

        let known_types = known
            .into_iter()
            .map(|t| Ok((registry.name(t).to_string(), registry.resolve_guard(t)?)))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self::from_candidates(name, candidates, known_types))
    }

    fn from_candidates(
        name: String,
        candidates: Vec<Candidate>,
        known_types: Vec<(String, Guard)>,
    ) -> Self {
        let mut by_arity: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for (i, candidate) in candidates.iter().enumerate() {
            by_arity.entry(candidate.arity()).or_default().push(i);
        }
        let min_arity = candidates.iter().map(Candidate::arity).min().unwrap_or(0);
        let max_arity = candidates.iter().map(Candidate::arity).max().unwrap_or(0);

        debug!(
            function = %name,
            candidates = candidates.len(),
            min_arity,
            max_arity,
            "compiled dispatcher"
        );

        Self {
            name,
            candidates,
            min_arity,
            max_arity,
            by_arity,
            known_types,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn min_arity(&self) -> usize {
        self.min_arity
    }

    pub fn max_arity(&self) -> usize {
        self.max_arity
    }

    /// Select the first candidate, in declaration order, that accepts `args`.
    ///
    /// Only candidates of matching arity are examined; any other candidate's
    /// tuple guard would reject on length alone, so the winner is the same
    /// as a full scan.
    pub fn select(&self, args: &[Value]) -> Result<&Candidate, NoMatchError> {
        let found = self.by_arity.get(&args.len()).and_then(|indices| {
            indices
                .iter()
                .map(|&i| &self.candidates[i])
                .find(|c| c.accepts(args))
        });
        match found {
            Some(candidate) => Ok(candidate),
            None => {
                trace!(function = %self.name, args = args.len(), "no candidate matched");
                Err(self.no_match(args))
            }
        }
    }

    /// Select by trying every candidate in order.
    #[cfg(test)]
    pub(crate) fn select_by_scan(&self, args: &[Value]) -> Option<usize> {
        self.candidates.iter().position(|c| c.accepts(args))
    }

    fn no_match(&self, args: &[Value]) -> NoMatchError {
        let arg_types = args
            .iter()
            .map(|arg| {
                self.known_types
                    .iter()
                    .find(|(_, guard)| guard(arg))
                    .map_or_else(|| arg.type_name().to_string(), |(name, _)| name.clone())
            })
            .collect();
        let candidates = self
            .candidates
            .iter()
            .map(|c| format!("{}{}", self.name, c.signature.render()))
            .collect();
        NoMatchError {
            function: self.name.clone(),
            arg_types,
            candidates,
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("candidates", &self.candidates)
            .field("min_arity", &self.min_arity)
            .field("max_arity", &self.max_arity)
            .finish_non_exhaustive()
    }
}
