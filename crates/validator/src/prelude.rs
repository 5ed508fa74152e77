//! Prelude module for convenient imports.
//!
//! ```
//! use rulegate_validator::prelude::*;
//!
//! let validator = ValidatorBuilder::new()
//!     .parse_typed(RuleType::Int, "count", &["IN:1,2,3:BADRANGE"])
//!     .unwrap();
//! assert!(!validator.is_required());
//! ```

pub use crate::builder::{Validator, ValidatorBuilder};
pub use crate::config::{BuilderConfig, DefaultCodes, DependencyPolicy, RuleSetConfig, StopAllPolicy};
pub use crate::error::{BuildError, ResolutionError, UnexpectedError};
pub use crate::external::{
    BoolPredicate, Component, ComponentLookup, ComponentRegistry, ExternalBoolValidator,
    ExternalFloat64Validator, ExternalInt64Validator, ExternalStringValidator, Float64Predicate,
    Int64Predicate, StringPredicate,
};
pub use crate::rule::{RuleSource, RuleType};
pub use crate::rule_set::{Outcome, RuleSet};
pub use crate::runtime::{ErrorCodes, Validate, ValidationContext, ValidationResult};
pub use crate::value::{FieldPath, Nilable, Value};
