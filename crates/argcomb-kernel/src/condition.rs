//! Boolean conditions over the set of supplied arguments.
//!
//! A condition is either atomic (the name of an argument, true when the
//! caller supplied it) or derived from child conditions by one of four
//! operators:
//!
//! - **Not**: exactly one child, negated
//! - **And**: every child holds
//! - **Or**: at least one child holds
//! - **Xor**: exactly one child holds
//!
//! Conditions are immutable once built. Children sit behind `Arc`, so a
//! condition can be cloned into many rule sets and shared across threads.
//!
//! With zero children, And holds vacuously while Or and Xor do not.

use crate::error::ConditionError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;
use std::sync::Arc;

/// The operator of a derived condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Not,
    And,
    Or,
    Xor,
}

impl Operator {
    /// Lowercase name, as used for the operator key in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Not => "Not",
            Self::And => "And",
            Self::Or => "Or",
            Self::Xor => "Xor",
        };
        f.write_str(name)
    }
}

impl FromStr for Operator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not" => Ok(Self::Not),
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "xor" => Ok(Self::Xor),
            other => Err(ConditionError::Unsupported {
                kind: other.to_string(),
            }),
        }
    }
}

/// Anything that can answer "was this argument supplied?".
pub trait SuppliedSet {
    fn is_supplied(&self, name: &str) -> bool;
}

impl SuppliedSet for BTreeSet<String> {
    fn is_supplied(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<S: BuildHasher> SuppliedSet for HashSet<String, S> {
    fn is_supplied(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<V> SuppliedSet for BTreeMap<String, V> {
    fn is_supplied(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl SuppliedSet for [&str] {
    fn is_supplied(&self, name: &str) -> bool {
        self.iter().any(|candidate| *candidate == name)
    }
}

impl SuppliedSet for [String] {
    fn is_supplied(&self, name: &str) -> bool {
        self.iter().any(|candidate| candidate == name)
    }
}

/// A boolean expression over which arguments were supplied to a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Holds iff the named argument was supplied.
    Supplied(String),
    /// Holds iff the child does not.
    Not(Arc<Condition>),
    /// Holds iff every child holds.
    All(Arc<[Condition]>),
    /// Holds iff at least one child holds.
    Any(Arc<[Condition]>),
    /// Holds iff exactly one child holds.
    ExactlyOne(Arc<[Condition]>),
}

impl Condition {
    pub fn supplied(name: impl Into<String>) -> Self {
        Self::Supplied(name.into())
    }

    pub fn not(child: impl Into<Condition>) -> Self {
        Self::Not(Arc::new(child.into()))
    }

    pub fn and<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::All(collect_children(children))
    }

    pub fn or<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::Any(collect_children(children))
    }

    pub fn xor<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::ExactlyOne(collect_children(children))
    }

    /// Build a derived condition from an operator and its children.
    ///
    /// Fails with [`ConditionError::Malformed`] when `Not` is not given
    /// exactly one child.
    pub fn derive(
        operator: Operator,
        mut children: Vec<Condition>,
    ) -> Result<Self, ConditionError> {
        match operator {
            Operator::Not => match children.pop() {
                Some(child) if children.is_empty() => Ok(Self::not(child)),
                popped => Err(ConditionError::arity(
                    operator,
                    children.len() + usize::from(popped.is_some()),
                )),
            },
            Operator::And => Ok(Self::All(children.into())),
            Operator::Or => Ok(Self::Any(children.into())),
            Operator::Xor => Ok(Self::ExactlyOne(children.into())),
        }
    }

    /// The operator of a derived condition; `None` for an atomic one.
    pub fn operator(&self) -> Option<Operator> {
        match self.node() {
            Node::Atom(_) => None,
            Node::Derived(operator, _) => Some(operator),
        }
    }

    /// Direct children, in declaration order.
    pub fn children(&self) -> &[Condition] {
        match self.node() {
            Node::Atom(_) => &[],
            Node::Derived(_, children) => children,
        }
    }

    fn node(&self) -> Node<'_> {
        match self {
            Self::Supplied(name) => Node::Atom(name),
            Self::Not(child) => Node::Derived(Operator::Not, std::slice::from_ref(child.as_ref())),
            Self::All(children) => Node::Derived(Operator::And, children),
            Self::Any(children) => Node::Derived(Operator::Or, children),
            Self::ExactlyOne(children) => Node::Derived(Operator::Xor, children),
        }
    }

    /// Evaluate against the set of supplied argument names.
    pub fn evaluate<S: SuppliedSet + ?Sized>(&self, supplied: &S) -> bool {
        match self {
            Self::Supplied(name) => supplied.is_supplied(name),
            Self::Not(child) => !child.evaluate(supplied),
            Self::All(children) => children.iter().all(|child| child.evaluate(supplied)),
            Self::Any(children) => children.iter().any(|child| child.evaluate(supplied)),
            Self::ExactlyOne(children) => {
                let mut found = false;
                for child in children.iter() {
                    if child.evaluate(supplied) {
                        // a second true child can never be undone
                        if found {
                            return false;
                        }
                        found = true;
                    }
                }
                found
            }
        }
    }

    /// Every argument name mentioned anywhere in this condition.
    pub fn arguments(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_arguments(&mut names);
        names
    }

    pub(crate) fn collect_arguments<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        if let Self::Supplied(name) = self {
            names.insert(name.as_str());
        }
        for child in self.children() {
            child.collect_arguments(names);
        }
    }

    /// JSON form: a string for an atomic condition, `{"<operator>": ...}`
    /// for a derived one.
    pub fn to_value(&self) -> Value {
        match self.node() {
            Node::Atom(name) => Value::String(name.to_string()),
            Node::Derived(Operator::Not, [child]) => single_key(Operator::Not, child.to_value()),
            Node::Derived(operator, children) => single_key(
                operator,
                Value::Array(children.iter().map(Condition::to_value).collect()),
            ),
        }
    }

    /// Parse the JSON form produced by [`Condition::to_value`].
    ///
    /// `not` accepts either a single condition or a one-element array.
    pub fn from_value(value: &Value) -> Result<Self, ConditionError> {
        match value {
            Value::String(name) => Ok(Self::supplied(name.clone())),
            Value::Object(map) => {
                let mut entries = map.iter();
                let (Some((key, body)), None) = (entries.next(), entries.next()) else {
                    return Err(ConditionError::Malformed {
                        description: format!(
                            "a derived condition needs exactly one operator key, found {}",
                            map.len()
                        ),
                    });
                };
                let operator: Operator = key.parse()?;
                let children = match (operator, body) {
                    (_, Value::Array(items)) => items
                        .iter()
                        .map(Condition::from_value)
                        .collect::<Result<Vec<_>, _>>()?,
                    (Operator::Not, single) => vec![Condition::from_value(single)?],
                    (_, other) => {
                        return Err(ConditionError::Malformed {
                            description: format!(
                                "`{key}` expects an array of conditions, found {}",
                                json_kind(other)
                            ),
                        });
                    }
                };
                Self::derive(operator, children)
            }
            other => Err(ConditionError::Malformed {
                description: format!(
                    "expected an argument name or an operator object, found {}",
                    json_kind(other)
                ),
            }),
        }
    }
}

enum Node<'a> {
    Atom(&'a str),
    Derived(Operator, &'a [Condition]),
}

fn collect_children<I, C>(children: I) -> Arc<[Condition]>
where
    I: IntoIterator<Item = C>,
    C: Into<Condition>,
{
    children.into_iter().map(Into::into).collect()
}

fn single_key(operator: Operator, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(operator.as_str().to_string(), body);
    Value::Object(map)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<&str> for Condition {
    fn from(name: &str) -> Self {
        Self::supplied(name)
    }
}

impl From<String> for Condition {
    fn from(name: String) -> Self {
        Self::Supplied(name)
    }
}

impl From<&Condition> for Condition {
    fn from(condition: &Condition) -> Self {
        condition.clone()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (operator, children) = match self.node() {
            Node::Atom(name) => return write!(f, "{name:?}"),
            Node::Derived(operator, children) => (operator, children),
        };
        write!(f, "{operator}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
