//! # rulegate-validator
//!
//! A declarative, rule-driven field validation engine.
//!
//! Rules are compact clause strings, one line per field:
//!
//! ```text
//! ["name",  "STR", "REQ:NAME_MISSING", "HARDTRIM", "LEN:2-64:NAME_LENGTH"]
//! ["age",   "INT", "RANGE:0|150:AGE_RANGE"]
//! ["email", "STR", "MEX:phone:ONE_CONTACT"]
//! ```
//!
//! Each line is built once into an immutable [`Validator`](builder::Validator).
//! A [`RuleSet`](rule_set::RuleSet) orders the validators of one subject type
//! by their dependencies and validates a structured [`Value`](value::Value),
//! producing per-field error codes.
//!
//! ## Quick Start
//!
//! ```
//! use rulegate_validator::prelude::*;
//!
//! let rules = RuleSet::from_json(
//!     r#"{"rules": [
//!         ["name", "STR", "REQ:NAME_MISSING", "LEN:2-3:NAME_LENGTH"],
//!         ["admin", "BOOL", "IS:false:NOT_ALLOWED"]
//!     ]}"#,
//!     &ValidatorBuilder::new(),
//!     RuleSetConfig::default(),
//! )
//! .unwrap();
//!
//! let mut subject = Value::from(serde_json::json!({"name": "Al", "admin": true}));
//! let outcome = rules.validate(&mut subject).unwrap();
//!
//! assert!(outcome.get("name").unwrap().is_valid());
//! assert_eq!(outcome.codes("admin"), Some(&["NOT_ALLOWED".to_string()][..]));
//! ```
//!
//! ## Errors
//!
//! - [`BuildError`](error::BuildError): a rule is malformed. Raised while
//!   building, never while validating.
//! - [`UnexpectedError`](error::UnexpectedError): the subject does not have
//!   the shape the rules describe.
//! - Validation failures are codes inside a
//!   [`ValidationResult`](runtime::ValidationResult), not errors.

#![warn(missing_docs)]
// BuildError carries field, clause and parameter details on purpose; every
// path that produces it is build-time only.
#![allow(clippy::result_large_err)]

pub mod builder;
pub mod config;
pub mod error;
pub mod external;
mod kinds;
pub mod prelude;
pub mod rule;
pub mod rule_set;
pub mod runtime;
pub mod value;
