//! Rule-set documents.
//!
//! A rule set can be declared as JSON or TOML instead of in code:
//!
//! ```toml
//! default = { or = ["a", "b"] }
//!
//! [[argument]]
//! name = "seq"
//! require = { xor = ["length", "end"] }
//!
//! [[argument]]
//! name = "a"
//! cases = [{ value = 1, require = "b" }, { value = 2, require = "c" }]
//! otherwise = { or = ["b", "c"] }
//! ```
//!
//! Argument entries keep their order. An entry carries either `require`
//! (applies whenever the argument is supplied) or a dispatch table made of
//! `cases` and/or `otherwise`.

use crate::error::RuleDocumentError;
use argcomb_kernel::{ArgumentSpec, Condition, DispatchTable, RuleSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

fn argument_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("argument-name regex must compile")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "argument", skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases: Option<Vec<CaseEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseEntry {
    pub value: Value,
    pub require: Value,
}

impl RuleDocument {
    pub fn from_json_str(input: &str) -> Result<Self, RuleDocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, RuleDocumentError> {
        Ok(toml::from_str(input)?)
    }

    pub fn to_toml_string(&self) -> Result<String, RuleDocumentError> {
        Ok(toml::to_string(self)?)
    }

    /// Describe an in-code rule set as a document.
    pub fn from_rule_set(rules: &RuleSet) -> Self {
        let arguments = rules
            .arguments()
            .map(|(name, spec)| match spec {
                ArgumentSpec::Always(condition) => ArgumentEntry {
                    name: name.to_string(),
                    require: Some(condition.to_value()),
                    cases: None,
                    otherwise: None,
                },
                ArgumentSpec::Dispatch(table) => ArgumentEntry {
                    name: name.to_string(),
                    require: None,
                    cases: Some(
                        table
                            .cases()
                            .map(|(value, condition)| CaseEntry {
                                value: value.clone(),
                                require: condition.to_value(),
                            })
                            .collect(),
                    ),
                    otherwise: table.catch_all().map(Condition::to_value),
                },
            })
            .collect();

        Self {
            default: rules.default_condition().map(Condition::to_value),
            arguments,
        }
    }

    /// Build the rule set, checking names and condition shapes.
    pub fn to_rule_set(&self) -> Result<RuleSet, RuleDocumentError> {
        let mut rules = RuleSet::new();
        if let Some(default) = &self.default {
            rules = rules.with_default(parse_condition(default, "default")?);
        }

        let mut seen = HashSet::new();
        for (index, entry) in self.arguments.iter().enumerate() {
            let path = format!("argument[{index}]");
            check_name(&entry.name, &format!("{path}.name"))?;
            if !seen.insert(entry.name.as_str()) {
                return Err(RuleDocumentError::shape(
                    format!("{path}.name"),
                    format!("argument `{}` is declared more than once", entry.name),
                ));
            }
            rules = rules.argument(entry.name.clone(), parse_entry(entry, &path)?);
        }

        Ok(rules)
    }
}

fn parse_entry(entry: &ArgumentEntry, path: &str) -> Result<ArgumentSpec, RuleDocumentError> {
    let dispatch = entry.cases.is_some() || entry.otherwise.is_some();
    match (&entry.require, dispatch) {
        (Some(require), false) => Ok(ArgumentSpec::Always(parse_condition(
            require,
            &format!("{path}.require"),
        )?)),
        (None, true) => {
            let mut table = DispatchTable::new();
            for (index, case) in entry.cases.iter().flatten().enumerate() {
                let condition =
                    parse_condition(&case.require, &format!("{path}.cases[{index}].require"))?;
                table = table.case(case.value.clone(), condition);
            }
            if let Some(otherwise) = &entry.otherwise {
                table = table.otherwise(parse_condition(otherwise, &format!("{path}.otherwise"))?);
            }
            Ok(ArgumentSpec::Dispatch(table))
        }
        (Some(_), true) => Err(RuleDocumentError::shape(
            path,
            "`require` cannot be combined with `cases` or `otherwise`",
        )),
        (None, false) => Err(RuleDocumentError::shape(
            path,
            "expected `require`, or `cases` and/or `otherwise`",
        )),
    }
}

fn parse_condition(value: &Value, path: &str) -> Result<Condition, RuleDocumentError> {
    let condition =
        Condition::from_value(value).map_err(|source| RuleDocumentError::Condition {
            path: path.to_string(),
            source,
        })?;
    for name in condition.arguments() {
        check_name(name, path)?;
    }
    Ok(condition)
}

fn check_name(name: &str, path: &str) -> Result<(), RuleDocumentError> {
    if argument_name_re().is_match(name) {
        Ok(())
    } else {
        Err(RuleDocumentError::shape(
            path,
            format!("`{name}` is not a valid argument name"),
        ))
    }
}
