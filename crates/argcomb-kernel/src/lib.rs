//! # ArgComb Kernel
//!
//! Checks that the combination of arguments a caller supplied to a
//! callable is valid. A caller may include or omit any optional argument;
//! a rule set says which combinations of "argument X was supplied" are
//! allowed, e.g. "exactly one of `length` or `end`".
//!
//! The kernel never introspects callables. The intercepting layer provides
//! a [`Signature`] descriptor and the raw [`CallArguments`] of each call.
//!
//! ## Architecture
//!
//! ```text
//! Condition        ← Not / And / Or / Xor over "was supplied" atoms
//!     │
//! ArgumentSpec     ← bare condition, or value-keyed dispatch + catch-all
//!     │
//! bind()           ← positional/keyword values → supplied arguments
//!     │
//! RuleSet          ← default condition + per-argument specs
//!     │
//! Guard            ← rules + signature; wraps a body into Guarded<F>
//! ```
//!
//! ```
//! use argcomb_kernel::{CallArguments, Condition, Parameter, RuleSet, Signature};
//! use serde_json::Value;
//!
//! let signature = Signature::new(vec![
//!     Parameter::required("seq"),
//!     Parameter::required("start"),
//!     Parameter::optional("length", Value::Null),
//!     Parameter::optional("end", Value::Null),
//! ])?;
//! let rules = RuleSet::new().argument("seq", Condition::xor(["length", "end"]));
//!
//! let ok = CallArguments::new().arg("abc").arg(0).kwarg("length", 2);
//! assert!(rules.validate(&signature, &ok).is_ok());
//!
//! let both = ok.clone().kwarg("end", 3);
//! assert!(rules.validate(&signature, &both).is_err());
//! # Ok::<(), argcomb_kernel::ArgCombError>(())
//! ```

pub mod binder;
pub mod condition;
pub mod error;
pub mod guard;
pub mod spec;
pub mod validator;
pub mod value;

pub use binder::{
    Binding, BindingWarning, CallArguments, Parameter, ParameterKind, Signature,
    SuppliedArguments, bind, bind_layout,
};
pub use condition::{Condition, Operator, SuppliedSet};
pub use error::{ArgCombError, ConditionError, InvalidArgumentCombination, SignatureError};
pub use guard::{Guard, Guarded};
pub use spec::{ArgumentSpec, DispatchKey, DispatchTable};
pub use validator::{RuleSet, Validation, argcomb};
pub use value::values_equal;
