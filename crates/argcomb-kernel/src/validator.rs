//! Rule sets and the validation pass.
//!
//! A [`RuleSet`] holds an optional default condition, checked on every
//! call, and per-argument specs, each checked only when its argument was
//! supplied. Validation stops at the first condition that does not hold.

use crate::binder::{Binding, BindingWarning, CallArguments, Signature, SuppliedArguments, bind};
use crate::condition::Condition;
use crate::error::InvalidArgumentCombination;
use crate::guard::Guard;
use crate::spec::ArgumentSpec;
use std::collections::BTreeSet;

/// One validated call: what was bound, and whether the rules accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub binding: Binding,
    pub outcome: Result<(), InvalidArgumentCombination>,
}

/// Declared argument-combination rules for one callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    default: Option<Condition>,
    arguments: Vec<(String, ArgumentSpec)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the condition that must hold for every call.
    pub fn with_default(mut self, condition: impl Into<Condition>) -> Self {
        self.default = Some(condition.into());
        self
    }

    /// Attach `spec` to the argument `name`.
    ///
    /// Specs are checked in declaration order; declaring a name again
    /// replaces its spec without moving it.
    pub fn argument(mut self, name: impl Into<String>, spec: impl Into<ArgumentSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        match self.arguments.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = spec,
            None => self.arguments.push((name, spec)),
        }
        self
    }

    pub fn default_condition(&self) -> Option<&Condition> {
        self.default.as_ref()
    }

    pub fn arguments(&self) -> impl Iterator<Item = (&str, &ArgumentSpec)> {
        self.arguments.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn spec_for(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.arguments.is_empty()
    }

    /// Every argument name the rules mention, as a spec key or inside a
    /// condition.
    pub fn referenced_arguments(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        if let Some(default) = &self.default {
            default.collect_arguments(&mut names);
        }
        for (name, spec) in &self.arguments {
            names.insert(name.as_str());
            spec.collect_arguments(&mut names);
        }
        names
    }

    /// Check an already-bound set of supplied arguments.
    pub fn check(&self, supplied: &SuppliedArguments) -> Result<(), InvalidArgumentCombination> {
        if let Some(condition) = &self.default {
            if !condition.evaluate(supplied) {
                return Err(InvalidArgumentCombination::Default {
                    condition: condition.clone(),
                });
            }
        }

        for (argument, spec) in &self.arguments {
            let Some(value) = supplied.get(argument) else {
                continue;
            };
            for condition in spec.resolve(value) {
                if !condition.evaluate(supplied) {
                    return Err(InvalidArgumentCombination::Argument {
                        argument: argument.clone(),
                        condition: condition.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Bind a raw call against `signature`, then check it.
    ///
    /// Binding warnings are reported as `tracing` warn events and do not
    /// fail the call.
    pub fn validate(
        &self,
        signature: &Signature,
        call: &CallArguments,
    ) -> Result<(), InvalidArgumentCombination> {
        self.bind_and_check(signature, call).outcome
    }

    /// [`RuleSet::validate`], keeping the binding alongside the outcome.
    pub fn bind_and_check(&self, signature: &Signature, call: &CallArguments) -> Validation {
        let binding = bind(signature, call);
        for warning in &binding.warnings {
            match warning {
                BindingWarning::AmbiguousBinding { argument } => tracing::warn!(
                    argument = %argument,
                    "argument supplied both positionally and as a keyword; binding is ambiguous"
                ),
            }
        }

        let outcome = self.check(&binding.supplied);
        match &outcome {
            Ok(()) => tracing::trace!(
                supplied = binding.supplied.len(),
                "argument combination accepted"
            ),
            Err(err) => tracing::debug!(
                argument = err.argument(),
                condition = %err.condition(),
                "argument combination rejected"
            ),
        }
        Validation { binding, outcome }
    }

    /// Pair these rules with the signature of the callable they guard.
    pub fn guard(self, signature: Signature) -> Guard {
        Guard::new(self, signature)
    }
}

/// Build a rule set from an optional default condition and per-argument
/// specs, in declaration order.
pub fn argcomb<I, N, S>(default: Option<Condition>, arguments: I) -> RuleSet
where
    I: IntoIterator<Item = (N, S)>,
    N: Into<String>,
    S: Into<ArgumentSpec>,
{
    let rules = arguments
        .into_iter()
        .fold(RuleSet::new(), |rules, (name, spec)| rules.argument(name, spec));
    match default {
        Some(condition) => rules.with_default(condition),
        None => rules,
    }
}
