//! Property tests: boolean laws of the condition algebra and determinism of
//! binding and validation.

use argcomb_kernel::{CallArguments, Condition, Parameter, RuleSet, Signature, bind};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(str::to_string)
}

fn arb_supplied() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(arb_name(), 0..=NAMES.len())
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = arb_name().prop_map(Condition::supplied);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Condition::not),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::and),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::or),
            prop::collection::vec(inner, 0..4).prop_map(Condition::xor),
        ]
    })
}

fn arb_children() -> impl Strategy<Value = Vec<Condition>> {
    prop::collection::vec(arb_condition(), 0..5)
}

fn truths(children: &[Condition], supplied: &BTreeSet<String>) -> Vec<bool> {
    children.iter().map(|c| c.evaluate(supplied)).collect()
}

// ---------------------------------------------------------------------------
// Laws
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn atomic_is_membership(name in arb_name(), supplied in arb_supplied()) {
        prop_assert_eq!(
            Condition::supplied(name.clone()).evaluate(&supplied),
            supplied.contains(&name)
        );
    }

    #[test]
    fn not_negates(cond in arb_condition(), supplied in arb_supplied()) {
        prop_assert_eq!(
            Condition::not(cond.clone()).evaluate(&supplied),
            !cond.evaluate(&supplied)
        );
    }

    #[test]
    fn and_is_all(children in arb_children(), supplied in arb_supplied()) {
        let expected = truths(&children, &supplied).into_iter().all(|t| t);
        prop_assert_eq!(Condition::and(children).evaluate(&supplied), expected);
    }

    #[test]
    fn or_is_any(children in arb_children(), supplied in arb_supplied()) {
        let expected = truths(&children, &supplied).into_iter().any(|t| t);
        prop_assert_eq!(Condition::or(children).evaluate(&supplied), expected);
    }

    #[test]
    fn xor_is_exactly_one(children in arb_children(), supplied in arb_supplied()) {
        let count = truths(&children, &supplied).into_iter().filter(|t| *t).count();
        prop_assert_eq!(Condition::xor(children).evaluate(&supplied), count == 1);
    }

    #[test]
    fn json_form_round_trips(cond in arb_condition()) {
        prop_assert_eq!(Condition::from_value(&cond.to_value()).unwrap(), cond);
    }

    #[test]
    fn explicit_default_equals_omission(
        passed in prop::collection::vec(any::<bool>(), NAMES.len()),
    ) {
        let signature = Signature::new(
            NAMES.iter().map(|name| Parameter::optional(*name, 0)).collect(),
        )
        .unwrap();
        let explicit = NAMES
            .iter()
            .zip(&passed)
            .filter(|(_, p)| **p)
            .fold(CallArguments::new(), |call, (name, _)| call.kwarg(*name, 0));
        prop_assert_eq!(
            bind(&signature, &explicit),
            bind(&signature, &CallArguments::new())
        );
    }

    #[test]
    fn validation_is_idempotent(cond in arb_condition(), supplied in arb_supplied()) {
        let signature = Signature::new(
            NAMES.iter().map(|name| Parameter::optional(*name, Value::Null)).collect(),
        )
        .unwrap();
        let rules = RuleSet::new().with_default(cond).argument("a", Condition::or(["b", "c"]));
        let call = supplied
            .iter()
            .fold(CallArguments::new(), |call, name| call.kwarg(name.clone(), 1));
        let first = rules.validate(&signature, &call);
        let second = rules.validate(&signature, &call);
        prop_assert_eq!(first, second);
    }
}
