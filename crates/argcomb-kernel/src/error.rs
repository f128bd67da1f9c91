//! Error types for ArgComb kernel operations.

use crate::condition::{Condition, Operator};

/// Raised when the arguments a caller supplied violate a declared condition.
///
/// This is the only error a guarded callable surfaces to its caller; it is
/// returned before the wrapped body runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgumentCombination {
    /// The rule set's default condition does not hold.
    #[error("condition `{condition}` does not hold")]
    Default { condition: Condition },

    /// A condition attached to a supplied argument does not hold.
    #[error("argument `{argument}` is not valid: condition `{condition}` does not hold")]
    Argument {
        argument: String,
        condition: Condition,
    },
}

impl InvalidArgumentCombination {
    /// The condition that evaluated to false.
    pub fn condition(&self) -> &Condition {
        match self {
            Self::Default { condition } | Self::Argument { condition, .. } => condition,
        }
    }

    /// The argument whose check failed, or `None` for the default condition.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::Default { .. } => None,
            Self::Argument { argument, .. } => Some(argument),
        }
    }
}

/// Errors raised while constructing a condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// A derived condition has the wrong shape (e.g. NOT with two children).
    #[error("malformed condition: {description}")]
    Malformed { description: String },

    /// A condition node is neither an argument name nor a known operator.
    #[error("unsupported condition type `{kind}`")]
    Unsupported { kind: String },
}

impl ConditionError {
    pub(crate) fn arity(operator: Operator, given: usize) -> Self {
        Self::Malformed {
            description: format!("{operator}() takes 1 condition but {given} were given"),
        }
    }
}

/// Errors raised while building a parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("parameter name must not be empty")]
    EmptyName,

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String },

    /// Kinds must run positional-only, then positional-or-keyword, then keyword-only.
    #[error("parameter `{name}` is declared out of order for its kind")]
    KindOrder { name: String },

    #[error("positional parameter `{name}` without a default follows a parameter with a default")]
    DefaultOrder { name: String },

    #[error("{count} keyword-only parameters declared but only {total} parameter names given")]
    KeywordOnlyCount { count: usize, total: usize },

    #[error("{given} positional defaults given for {positional} positional parameters")]
    TooManyDefaults { given: usize, positional: usize },

    #[error("keyword-only default given for `{name}`, which is not a keyword-only parameter")]
    UnknownKeywordDefault { name: String },
}

/// Any error produced by the kernel.
#[derive(Debug, thiserror::Error)]
pub enum ArgCombError {
    #[error(transparent)]
    InvalidArgumentCombination(#[from] InvalidArgumentCombination),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}
