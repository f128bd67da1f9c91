//! Guarded callables.
//!
//! A [`Guard`] pairs a rule set with the signature of the callable it
//! protects. Wrapping a body yields a [`Guarded`] callable that validates
//! every call before forwarding the unchanged arguments.

use crate::binder::{CallArguments, Signature};
use crate::error::InvalidArgumentCombination;
use crate::validator::RuleSet;
use std::sync::Arc;

/// Rules bound to a signature. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Guard {
    rules: Arc<RuleSet>,
    signature: Arc<Signature>,
}

impl Guard {
    /// Names mentioned by the rules but not declared by the signature are
    /// logged at debug level; they can only arrive through a keyword
    /// collector.
    pub fn new(rules: RuleSet, signature: Signature) -> Self {
        for name in rules.referenced_arguments() {
            if signature.parameter(name).is_none() {
                tracing::debug!(argument = name, "rule mentions an undeclared parameter");
            }
        }
        Self {
            rules: Arc::new(rules),
            signature: Arc::new(signature),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Validate a call without invoking anything.
    pub fn check(&self, call: &CallArguments) -> Result<(), InvalidArgumentCombination> {
        self.rules.validate(&self.signature, call)
    }

    pub fn wrap<F>(self, body: F) -> Guarded<F> {
        Guarded { guard: self, body }
    }
}

/// A callable whose calls are validated before they run.
#[derive(Clone)]
pub struct Guarded<F> {
    guard: Guard,
    body: F,
}

impl<F> Guarded<F> {
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Validate, then run the body with the same arguments.
    pub fn call<R>(&self, call: &CallArguments) -> Result<R, InvalidArgumentCombination>
    where
        F: Fn(&CallArguments) -> R,
    {
        self.guard.check(call)?;
        Ok((self.body)(call))
    }

    /// Like [`Guarded::call`] for a fallible body, folding a rejected
    /// combination into the body's error type.
    pub fn try_call<T, E>(&self, call: &CallArguments) -> Result<T, E>
    where
        F: Fn(&CallArguments) -> Result<T, E>,
        E: From<InvalidArgumentCombination>,
    {
        self.guard.check(call)?;
        (self.body)(call)
    }

    pub fn into_inner(self) -> F {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Parameter;
    use crate::condition::Condition;
    use crate::error::ArgCombError;
    use serde_json::Value;
    use std::cell::Cell;
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn pair() -> Signature {
        Signature::new(vec![
            Parameter::optional("a", Value::Null),
            Parameter::optional("b", Value::Null),
        ])
        .unwrap()
    }

    #[test]
    fn body_runs_only_after_validation() {
        let runs = Cell::new(0);
        let guarded = RuleSet::new()
            .with_default(Condition::or(["a", "b"]))
            .guard(pair())
            .wrap(|call: &CallArguments| {
                runs.set(runs.get() + 1);
                call.positional.len()
            });

        assert!(guarded.call(&CallArguments::new()).is_err());
        assert_eq!(runs.get(), 0);

        let result = guarded.call(&CallArguments::new().arg(1).arg(2));
        assert_eq!(result, Ok(2));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn body_errors_pass_through() {
        let guarded = RuleSet::new()
            .argument("a", "b")
            .guard(pair())
            .wrap(|_: &CallArguments| -> Result<(), ArgCombError> {
                Err(crate::error::SignatureError::EmptyName.into())
            });

        let rejected = guarded.try_call(&CallArguments::new().arg(1));
        assert!(matches!(
            rejected,
            Err(ArgCombError::InvalidArgumentCombination(_))
        ));

        let body_failed = guarded.try_call(&CallArguments::new().arg(1).arg(2));
        assert!(matches!(body_failed, Err(ArgCombError::Signature(_))));
    }

    #[test]
    fn guard_is_shareable_across_threads() {
        let guard = RuleSet::new()
            .with_default(Condition::xor(["a", "b"]))
            .guard(pair());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let guard = guard.clone();
                std::thread::spawn(move || {
                    let call = if i % 2 == 0 {
                        CallArguments::new().arg(1)
                    } else {
                        CallArguments::new().arg(1).arg(2)
                    };
                    guard.check(&call).is_ok()
                })
            })
            .collect();
        let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(outcomes, vec![true, false, true, false]);
    }

    #[test]
    fn ambiguous_binding_warns_and_call_proceeds() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let guard = RuleSet::new()
            .argument("a", "b")
            .guard(Signature::new(vec![Parameter::required("a").positional_only()]).unwrap());
        let call = CallArguments::new().arg(1).kwarg("a", 2).kwarg("b", 3);

        let outcome = tracing::subscriber::with_default(subscriber, || guard.check(&call));
        assert_eq!(outcome, Ok(()));

        let logs = logs.contents();
        assert!(logs.contains("WARN"), "no warn event in {logs:?}");
        assert!(logs.contains("binding is ambiguous"), "{logs:?}");
        assert!(logs.contains("argument=a"), "{logs:?}");
    }
}
