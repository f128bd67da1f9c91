//! Call-site binder: which arguments did the caller actually supply?
//!
//! The intercepting layer hands the kernel a [`Signature`] (ordered
//! parameters, each tagged with its kind and optional default) and the raw
//! [`CallArguments`] of one call. [`bind`] maps positional values back to
//! parameter names and drops every value equal to its parameter's declared
//! default, so `f(a=DEFAULT)` and `f()` bind identically.
//!
//! Equality is value equality ([`values_equal`]), not identity: `0.0`
//! passed for a default of `0` is an omission.

use crate::condition::SuppliedSet;
use crate::error::SignatureError;
use crate::value::values_equal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// How a parameter may be passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    PositionalOnly,
    #[default]
    PositionalOrKeyword,
    KeywordOnly,
}

impl ParameterKind {
    pub fn is_positional(self) -> bool {
        self != Self::KeywordOnly
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKind,
    /// `None` means no default; `Some(Value::Null)` is a `null` default.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Parameter {
    /// A positional-or-keyword parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// A positional-or-keyword parameter with a default.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::required(name)
        }
    }

    pub fn positional_only(mut self) -> Self {
        self.kind = ParameterKind::PositionalOnly;
        self
    }

    pub fn keyword_only(mut self) -> Self {
        self.kind = ParameterKind::KeywordOnly;
        self
    }

    /// Whether `value` equals this parameter's declared default.
    pub fn is_default(&self, value: &Value) -> bool {
        self.default
            .as_ref()
            .is_some_and(|default| values_equal(default, value))
    }
}

/// Validated, ordered parameter descriptor of a callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    /// Validate and build a descriptor.
    ///
    /// Names must be unique and non-empty, kinds must appear in the order
    /// positional-only, positional-or-keyword, keyword-only, and no
    /// positional parameter without a default may follow one with a
    /// default.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, SignatureError> {
        let mut seen = HashSet::new();
        let mut previous_kind = ParameterKind::PositionalOnly;
        let mut positional_default_seen = false;

        for parameter in &parameters {
            if parameter.name.is_empty() {
                return Err(SignatureError::EmptyName);
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(SignatureError::DuplicateParameter {
                    name: parameter.name.clone(),
                });
            }
            if parameter.kind < previous_kind {
                return Err(SignatureError::KindOrder {
                    name: parameter.name.clone(),
                });
            }
            previous_kind = parameter.kind;

            if parameter.kind.is_positional() {
                if parameter.default.is_some() {
                    positional_default_seen = true;
                } else if positional_default_seen {
                    return Err(SignatureError::DefaultOrder {
                        name: parameter.name.clone(),
                    });
                }
            }
        }

        Ok(Self { parameters })
    }

    /// Build a descriptor from a raw code layout.
    ///
    /// The last `keyword_only_count` names are keyword-only. Positional
    /// defaults align to the rightmost positional names, and
    /// `keyword_only_defaults` is keyed by name.
    pub fn from_layout<N: Into<String>>(
        names: impl IntoIterator<Item = N>,
        positional_defaults: Vec<Value>,
        mut keyword_only_defaults: BTreeMap<String, Value>,
        keyword_only_count: usize,
    ) -> Result<Self, SignatureError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let positional = names
            .len()
            .checked_sub(keyword_only_count)
            .ok_or(SignatureError::KeywordOnlyCount {
                count: keyword_only_count,
                total: names.len(),
            })?;
        let first_defaulted = positional.checked_sub(positional_defaults.len()).ok_or(
            SignatureError::TooManyDefaults {
                given: positional_defaults.len(),
                positional,
            },
        )?;

        let mut defaults = positional_defaults.into_iter();
        let mut parameters = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let parameter = if index >= positional {
                Parameter {
                    default: keyword_only_defaults.remove(&name),
                    ..Parameter::required(name).keyword_only()
                }
            } else if index >= first_defaulted {
                Parameter {
                    default: defaults.next(),
                    ..Parameter::required(name)
                }
            } else {
                Parameter::required(name)
            };
            parameters.push(parameter);
        }

        if let Some(name) = keyword_only_defaults.into_keys().next() {
            return Err(SignatureError::UnknownKeywordDefault { name });
        }

        Self::new(parameters)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|parameter| parameter.name.as_str())
    }

    /// Declared default of `name`, if it has one.
    pub fn default_of(&self, name: &str) -> Option<&Value> {
        self.parameter(name)?.default.as_ref()
    }

    fn is_default(&self, name: &str, value: &Value) -> bool {
        self.default_of(name)
            .is_some_and(|default| values_equal(default, value))
    }
}

impl TryFrom<Vec<Parameter>> for Signature {
    type Error = SignatureError;

    fn try_from(parameters: Vec<Parameter>) -> Result<Self, Self::Error> {
        Self::new(parameters)
    }
}

impl From<Signature> for Vec<Parameter> {
    fn from(signature: Signature) -> Self {
        signature.parameters
    }
}

/// Raw values passed at one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArguments {
    pub positional: Vec<Value>,
    pub keyword: Vec<(String, Value)>,
}

impl CallArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword value, replacing an earlier one with the same name.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.keyword.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.keyword.push((name, value)),
        }
        self
    }
}

/// Arguments the caller actually supplied, with the values passed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuppliedArguments {
    values: BTreeMap<String, Value>,
}

impl SuppliedArguments {
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.values
    }
}

impl SuppliedSet for SuppliedArguments {
    fn is_supplied(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl FromIterator<(String, Value)> for SuppliedArguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Non-fatal diagnostic produced while binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingWarning {
    /// The same name was bound positionally and again as a keyword, as
    /// happens with a positional-only parameter next to a keyword collector.
    /// The keyword value wins unless it equals the declared default.
    AmbiguousBinding { argument: String },
}

impl fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousBinding { argument } => write!(
                f,
                "argument `{argument}` was supplied both positionally and as a keyword"
            ),
        }
    }
}

/// Result of binding one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub supplied: SuppliedArguments,
    pub warnings: Vec<BindingWarning>,
}

/// Compute the arguments a caller actually supplied.
///
/// Positional values pair with declared names by position (values past the
/// last name belong to a variadic collector and are ignored). Keyword
/// values apply afterwards. Any value equal to its parameter's default is
/// treated as omitted.
pub fn bind(signature: &Signature, call: &CallArguments) -> Binding {
    let mut values = BTreeMap::new();
    for (parameter, value) in signature.parameters().iter().zip(&call.positional) {
        if !parameter.is_default(value) {
            values.insert(parameter.name.clone(), value.clone());
        }
    }

    let warnings = call
        .keyword
        .iter()
        .filter(|(name, _)| values.contains_key(name))
        .map(|(name, _)| BindingWarning::AmbiguousBinding {
            argument: name.clone(),
        })
        .collect();

    for (name, value) in &call.keyword {
        if !signature.is_default(name, value) {
            values.insert(name.clone(), value.clone());
        }
    }

    Binding {
        supplied: SuppliedArguments { values },
        warnings,
    }
}

/// [`bind`] over a raw code layout instead of a prebuilt [`Signature`].
pub fn bind_layout<N: Into<String>>(
    call: &CallArguments,
    names: impl IntoIterator<Item = N>,
    positional_defaults: Vec<Value>,
    keyword_only_defaults: BTreeMap<String, Value>,
    keyword_only_count: usize,
) -> Result<Binding, SignatureError> {
    let signature = Signature::from_layout(
        names,
        positional_defaults,
        keyword_only_defaults,
        keyword_only_count,
    )?;
    Ok(bind(&signature, call))
}
