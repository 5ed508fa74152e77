//! Rule clause DSL.
//!
//! A rule is an ordered list of clauses for one field, for example
//! `["STR", "REQ:MISSING", "LEN:2-3:LENGTH"]`. One clause is the type
//! indicator naming the field kind; it may carry the validator's default
//! error code (`STR:BAD_NAME`). Every other clause is an operation.

mod source;
mod token;

pub use source::{RuleLine, RuleSource};
pub use token::{CLAUSE_SEPARATOR, MEMBER_SEPARATOR, OperationToken, split_escaped};

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// OPERATION CODES
// ============================================================================

/// `REQ[:code]`: the field must be set.
pub const OP_REQUIRED: &str = "REQ";
/// `STOPALL`: a failure here signals the orchestrator to stop.
pub const OP_STOP_ALL: &str = "STOPALL";
/// `BREAK`: halt the chain if a code has already been raised.
pub const OP_BREAK: &str = "BREAK";
/// `IN:a,b,c[:code]`: set membership.
pub const OP_IN: &str = "IN";
/// `EXT:component[:code]`: external predicate.
pub const OP_EXTERNAL: &str = "EXT";
/// `MEX:f1,f2[:code]`: mutually exclusive with other fields.
pub const OP_MUTUAL_EXCLUSION: &str = "MEX";
/// `LEN:min-max[:code]`: string or list length bounds.
pub const OP_LENGTH: &str = "LEN";
/// `REG:pattern[:code]`: regular expression match.
pub const OP_REGEX: &str = "REG";
/// `TRIM`: trim the value seen by later checks.
pub const OP_TRIM: &str = "TRIM";
/// `HARDTRIM`: trim the stored value.
pub const OP_HARD_TRIM: &str = "HARDTRIM";
/// `IS:true|false[:code]`: boolean literal match.
pub const OP_IS: &str = "IS";
/// `RANGE:min|max[:code]`: numeric bounds.
pub const OP_RANGE: &str = "RANGE";
/// `ELEM:shared_rule`: validate every list element.
pub const OP_ELEMENTS: &str = "ELEM";

// ============================================================================
// RULE TYPE
// ============================================================================

/// The field kind a rule is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// `BOOL`
    Bool,
    /// `INT`
    Int,
    /// `FLOAT`
    Float,
    /// `STR`
    String,
    /// `SLICE`
    Slice,
    /// `OBJ`
    Object,
}

impl RuleType {
    /// All rule types.
    pub const ALL: [Self; 6] = [
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::String,
        Self::Slice,
        Self::Object,
    ];

    /// The type indicator as written in rules.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STR",
            Self::Slice => "SLICE",
            Self::Object => "OBJ",
        }
    }

    /// Looks up a type indicator.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returns `true` when `code` is the type indicator for `rule_type`.
#[must_use]
pub fn is_type_indicator(rule_type: RuleType, code: &str) -> bool {
    rule_type.code() == code
}

/// Finds the single type indicator among `tokens`.
pub fn detect_type(field: &str, tokens: &[OperationToken]) -> Result<RuleType, BuildError> {
    let mut found: Option<RuleType> = None;

    for t in tokens.iter().filter_map(|t| RuleType::from_code(t.code())) {
        match found {
            Some(first) if first != t => {
                return Err(BuildError::ConflictingTypes {
                    field: field.to_owned(),
                    first: first.code(),
                    second: t.code(),
                });
            }
            _ => found = Some(t),
        }
    }

    found.ok_or_else(|| BuildError::MissingType {
        field: field.to_owned(),
    })
}

/// Picks the default error code: `TYPE:CODE` in the rule wins over `configured`.
#[must_use]
pub fn default_error_code(rule_type: RuleType, tokens: &[OperationToken], configured: &str) -> String {
    tokens
        .iter()
        .filter(|t| is_type_indicator(rule_type, t.code()))
        .find_map(|t| t.param(0).filter(|c| !c.is_empty()))
        .unwrap_or(configured)
        .to_owned()
}

/// Tokenizes every clause of a rule.
pub fn tokenize(field: &str, clauses: &[String]) -> Result<Vec<OperationToken>, BuildError> {
    clauses
        .iter()
        .map(|c| OperationToken::parse(field, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(clauses: &[&str]) -> Vec<OperationToken> {
        let owned: Vec<String> = clauses.iter().map(|c| (*c).to_owned()).collect();
        tokenize("f", &owned).unwrap()
    }

    #[test]
    fn type_codes_round_trip() {
        for t in RuleType::ALL {
            assert_eq!(RuleType::from_code(t.code()), Some(t));
        }
        assert_eq!(RuleType::from_code("REQ"), None);
    }

    #[test]
    fn detects_type_anywhere_in_rule() {
        assert_eq!(detect_type("f", &tokens(&["REQ", "INT"])).unwrap(), RuleType::Int);
        assert_eq!(detect_type("f", &tokens(&["STR:DEF", "STR"])).unwrap(), RuleType::String);
    }

    #[test]
    fn missing_or_conflicting_type_is_an_error() {
        assert!(matches!(
            detect_type("f", &tokens(&["REQ"])),
            Err(BuildError::MissingType { .. })
        ));
        assert!(matches!(
            detect_type("f", &tokens(&["STR", "INT"])),
            Err(BuildError::ConflictingTypes { first: "STR", second: "INT", .. })
        ));
    }

    #[test]
    fn embedded_default_code_wins() {
        let t = tokens(&["STR:BAD_NAME", "REQ"]);
        assert_eq!(default_error_code(RuleType::String, &t, "DEF"), "BAD_NAME");

        let t = tokens(&["STR", "REQ"]);
        assert_eq!(default_error_code(RuleType::String, &t, "DEF"), "DEF");
    }
}
