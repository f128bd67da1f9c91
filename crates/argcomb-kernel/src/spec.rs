//! Per-argument specifications and their resolution.
//!
//! An [`ArgumentSpec`] is attached to one declared argument and is only
//! consulted when the caller supplied that argument. It either applies a
//! single condition unconditionally, or dispatches on the supplied value
//! through a [`DispatchTable`].

use crate::condition::Condition;
use crate::value::values_equal;
use serde_json::Value;
use std::collections::BTreeSet;

/// Key of a dispatch-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchKey {
    /// Applies when the supplied value equals this one.
    Exact(Value),
    /// Applies to every supplied value.
    CatchAll,
}

/// Value-keyed conditions with an optional catch-all.
///
/// Cases keep their insertion order. Duplicate values are kept and every
/// matching case applies. The catch-all applies in addition to any match,
/// never instead of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTable {
    cases: Vec<(Value, Condition)>,
    otherwise: Option<Condition>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a case applying `condition` when the argument equals `value`.
    pub fn case(mut self, value: impl Into<Value>, condition: impl Into<Condition>) -> Self {
        self.cases.push((value.into(), condition.into()));
        self
    }

    /// Set the catch-all condition.
    pub fn otherwise(mut self, condition: impl Into<Condition>) -> Self {
        self.otherwise = Some(condition.into());
        self
    }

    /// Insert an entry. A second catch-all replaces the first.
    pub fn insert(&mut self, key: DispatchKey, condition: Condition) {
        match key {
            DispatchKey::Exact(value) => self.cases.push((value, condition)),
            DispatchKey::CatchAll => self.otherwise = Some(condition),
        }
    }

    pub fn cases(&self) -> impl Iterator<Item = (&Value, &Condition)> {
        self.cases.iter().map(|(value, condition)| (value, condition))
    }

    pub fn catch_all(&self) -> Option<&Condition> {
        self.otherwise.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.otherwise.is_none()
    }

    /// Conditions that apply when the argument was supplied with `value`:
    /// every matching case in order, then the catch-all.
    pub fn resolve(&self, value: &Value) -> Vec<&Condition> {
        self.cases
            .iter()
            .filter(|(case, _)| values_equal(case, value))
            .map(|(_, condition)| condition)
            .chain(self.otherwise.as_ref())
            .collect()
    }
}

impl FromIterator<(DispatchKey, Condition)> for DispatchTable {
    fn from_iter<I: IntoIterator<Item = (DispatchKey, Condition)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, condition) in iter {
            table.insert(key, condition);
        }
        table
    }
}

/// Validation attached to one declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSpec {
    /// Applies whenever the argument is supplied, whatever its value.
    Always(Condition),
    /// Selected by the supplied value.
    Dispatch(DispatchTable),
}

impl ArgumentSpec {
    /// Conditions that must all hold given the argument was supplied with
    /// `value`.
    pub fn resolve(&self, value: &Value) -> Vec<&Condition> {
        match self {
            Self::Always(condition) => vec![condition],
            Self::Dispatch(table) => table.resolve(value),
        }
    }

    /// Every condition this spec can ever select.
    pub fn conditions(&self) -> Vec<&Condition> {
        match self {
            Self::Always(condition) => vec![condition],
            Self::Dispatch(table) => table
                .cases()
                .map(|(_, condition)| condition)
                .chain(table.catch_all())
                .collect(),
        }
    }

    pub(crate) fn collect_arguments<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        for condition in self.conditions() {
            condition.collect_arguments(names);
        }
    }
}

impl From<Condition> for ArgumentSpec {
    fn from(condition: Condition) -> Self {
        Self::Always(condition)
    }
}

impl From<&str> for ArgumentSpec {
    fn from(name: &str) -> Self {
        Self::Always(Condition::from(name))
    }
}

impl From<DispatchTable> for ArgumentSpec {
    fn from(table: DispatchTable) -> Self {
        Self::Dispatch(table)
    }
}
