//! Replay of recorded calls against documented rule sets.
//!
//! A [`CallCase`] bundles a rule document, the parameter descriptor of the
//! guarded callable and one recorded call. [`replay`] binds and validates
//! the call and reports a [`Verdict`] that can be compared against stored
//! expectations.

use crate::document::RuleDocument;
use crate::error::RuleDocumentError;
use argcomb_kernel::{CallArguments, Parameter, Signature, Validation};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Raw arguments of one recorded call.
///
/// Keyword arguments keep the order they were recorded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallDocument {
    #[serde(default)]
    pub positional: Vec<Value>,
    #[serde(
        default,
        serialize_with = "serialize_keywords",
        deserialize_with = "deserialize_keywords"
    )]
    pub keyword: Vec<(String, Value)>,
}

impl CallDocument {
    /// A repeated keyword keeps its first position and its last value.
    pub fn to_call_arguments(&self) -> CallArguments {
        self.keyword.iter().fold(
            CallArguments {
                positional: self.positional.clone(),
                keyword: Vec::new(),
            },
            |call, (name, value)| call.kwarg(name.clone(), value.clone()),
        )
    }
}

fn serialize_keywords<S: Serializer>(
    keyword: &[(String, Value)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(keyword.iter().map(|(name, value)| (name, value)))
}

fn deserialize_keywords<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, Value)>, D::Error> {
    struct Keywords;

    impl<'de> Visitor<'de> for Keywords {
        type Value = Vec<(String, serde_json::Value)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of keyword arguments")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut keyword = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                keyword.push(entry);
            }
            Ok(keyword)
        }
    }

    deserializer.deserialize_map(Keywords)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallCase {
    pub rules: RuleDocument,
    pub signature: Vec<Parameter>,
    pub call: CallDocument,
}

impl CallCase {
    pub fn from_json_str(input: &str) -> Result<Self, RuleDocumentError> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Outcome of replaying one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub accepted: bool,
    /// Names the binder considered supplied, sorted.
    pub supplied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Bind and validate the recorded call.
///
/// Errors only when the case itself is malformed; a rejected call is an
/// ordinary verdict.
pub fn replay(case: &CallCase) -> Result<Verdict, RuleDocumentError> {
    let signature = Signature::new(case.signature.clone())?;
    let rules = case.rules.to_rule_set()?;
    let Validation { binding, outcome } =
        rules.bind_and_check(&signature, &case.call.to_call_arguments());

    let warnings = binding.warnings.iter().map(ToString::to_string).collect();
    let supplied = binding.supplied.names().map(str::to_string).collect();
    let verdict = match outcome {
        Ok(()) => Verdict {
            accepted: true,
            supplied,
            argument: None,
            message: None,
            warnings,
        },
        Err(err) => Verdict {
            accepted: false,
            supplied,
            argument: err.argument().map(str::to_string),
            message: Some(err.to_string()),
            warnings,
        },
    };
    tracing::debug!(accepted = verdict.accepted, "replayed call");
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case(value: Value) -> CallCase {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn replay_accepts_valid_call() {
        let verdict = replay(&case(json!({
            "rules": {"argument": [{"name": "seq", "require": {"xor": ["length", "end"]}}]},
            "signature": [
                {"name": "seq"},
                {"name": "start"},
                {"name": "length", "default": null},
                {"name": "end", "default": null}
            ],
            "call": {"positional": ["abc", 0], "keyword": {"length": 2}}
        })))
        .unwrap();
        assert_eq!(
            verdict,
            Verdict {
                accepted: true,
                supplied: vec!["length".into(), "seq".into(), "start".into()],
                argument: None,
                message: None,
                warnings: Vec::new(),
            }
        );
    }

    #[test]
    fn replay_reports_rejection_and_warnings() {
        let verdict = replay(&case(json!({
            "rules": {"argument": [{"name": "a", "require": "b"}]},
            "signature": [{"name": "a", "kind": "positional_only"}],
            "call": {"positional": [1], "keyword": {"a": 2}}
        })))
        .unwrap();
        assert!(!verdict.accepted);
        assert_eq!(verdict.argument.as_deref(), Some("a"));
        insta::assert_snapshot!(
            verdict.message.unwrap(),
            @r#"argument `a` is not valid: condition `"b"` does not hold"#
        );
        assert_eq!(
            verdict.warnings,
            vec!["argument `a` was supplied both positionally and as a keyword".to_string()]
        );
    }

    #[test]
    fn keyword_order_is_kept() {
        let case = CallCase::from_json_str(
            r#"{
                "rules": {},
                "signature": [
                    {"name": "a", "kind": "positional_only"},
                    {"name": "b", "kind": "positional_only"}
                ],
                "call": {"positional": [1, 2], "keyword": {"b": 3, "a": 4}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            case.call.keyword,
            vec![("b".to_string(), json!(3)), ("a".to_string(), json!(4))]
        );
        assert_eq!(
            serde_json::to_string(&case.call).unwrap(),
            r#"{"positional":[1,2],"keyword":{"b":3,"a":4}}"#
        );

        let verdict = replay(&case).unwrap();
        assert!(verdict.accepted);
        assert_eq!(
            verdict.warnings,
            vec![
                "argument `b` was supplied both positionally and as a keyword".to_string(),
                "argument `a` was supplied both positionally and as a keyword".to_string(),
            ]
        );
    }

    #[test]
    fn repeated_keyword_keeps_last_value() {
        let call: CallDocument =
            serde_json::from_str(r#"{"keyword": {"a": 1, "b": 2, "a": 3}}"#).unwrap();
        assert_eq!(
            call.to_call_arguments(),
            CallArguments::new().kwarg("a", 3).kwarg("b", 2)
        );
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let err = replay(&case(json!({
            "rules": {},
            "signature": [{"name": "a", "default": 1}, {"name": "b"}],
            "call": {}
        })))
        .unwrap_err();
        assert!(matches!(err, RuleDocumentError::Signature(_)));
    }
}
