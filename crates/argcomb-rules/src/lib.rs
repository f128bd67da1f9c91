//! Rule-set documents for ArgComb.
//!
//! Rule sets, parameter descriptors and recorded calls expressed as JSON or
//! TOML, converted into kernel types with every problem reported against
//! its document path.

pub mod document;
pub mod error;
pub mod replay;

pub use document::{ArgumentEntry, CaseEntry, RuleDocument};
pub use error::RuleDocumentError;
pub use replay::{CallCase, CallDocument, Verdict, replay};
