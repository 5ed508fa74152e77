//! `INT` rules.
//!
//! Vocabulary: `REQ`, `STOPALL`, `BREAK`, `MEX`, `IN:1,2,3[:code]`,
//! `RANGE:min|max[:code]`, `EXT:component[:code]`. Set members and bounds
//! are parsed as `i64` when the rule is built.

use super::{Bounds, parse_members, parse_range};
use crate::error::{BuildError, UnexpectedError};
use crate::external::{External, ExternalInt64Validator};
use crate::rule::{OP_EXTERNAL, OP_IN, OP_RANGE, OperationToken, RuleType};
use crate::runtime::{BuildScope, Kind, Run};
use crate::value::Value;
use std::collections::HashSet;

pub(crate) struct IntKind;

#[derive(Debug)]
pub(crate) enum IntOp {
    In { members: HashSet<i64>, code: String },
    Range { bounds: Bounds<i64>, code: String },
    External { check: External<dyn ExternalInt64Validator>, code: String },
}

impl Kind for IntKind {
    const TYPE: RuleType = RuleType::Int;
    const NAME: &'static str = "int";

    type Op = IntOp;
    type Working = i64;

    fn extract(value: &Value) -> Option<Option<i64>> {
        match value {
            Value::Int(i) => Some(Some(*i)),
            Value::NilableInt(n) => Some(n.get().copied()),
            _ => None,
        }
    }

    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<IntOp>, BuildError> {
        let op = match token.code() {
            OP_IN => {
                token.expect_params(scope.name(), 1, 2)?;
                let members = parse_members(scope, token, "integer", |m| m.trim().parse().ok())?;
                IntOp::In {
                    members: members.into_iter().collect(),
                    code: scope.code_at(token, 1),
                }
            }
            OP_RANGE => {
                token.expect_params(scope.name(), 1, 2)?;
                IntOp::Range {
                    bounds: parse_range(scope, token)?,
                    code: scope.code_at(token, 1),
                }
            }
            OP_EXTERNAL => {
                token.expect_params(scope.name(), 1, 2)?;
                IntOp::External {
                    check: scope.external(token, "int64", |c| c.int64_validator())?,
                    code: scope.code_at(token, 1),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn apply(op: &IntOp, working: &mut i64, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        let value = *working;
        match op {
            IntOp::In { members, code } => run.check(members.contains(&value), code),
            IntOp::Range { bounds, code } => run.check(bounds.contains(value), code),
            IntOp::External { check, code } => run.check(check.check().valid_int64(value), code),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::ValidatorBuilder;
    use crate::error::BuildError;
    use crate::external::{ComponentRegistry, Int64Predicate};
    use crate::kinds::testing::{build, codes};
    use crate::rule::RuleType;
    use crate::value::{Nilable, Value};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case(4, &["BADRANGE"])]
    #[case(2, &[])]
    fn in_with_custom_code(#[case] value: i64, #[case] expected: &[&str]) {
        let v = build(RuleType::Int, &["IN:1,2,3:BADRANGE"]).unwrap();
        assert_eq!(codes(&v, Value::Int(value)), expected);
    }

    #[test]
    fn in_members_tolerate_whitespace() {
        let v = build(RuleType::Int, &["IN: 1, -2 ,3"]).unwrap();
        assert!(codes(&v, Value::Int(-2)).is_empty());
    }

    #[test]
    fn non_numeric_member_is_a_build_error() {
        let err = build(RuleType::Int, &["IN:1,two,3"]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidLiteral { ref value, expected: "integer", .. } if value == "two"
        ));
    }

    #[rstest]
    #[case("RANGE:1|10", 0, false)]
    #[case("RANGE:1|10", 1, true)]
    #[case("RANGE:1|10", 10, true)]
    #[case("RANGE:|10", -99, true)]
    #[case("RANGE:-5|", -6, false)]
    fn range_is_inclusive(#[case] clause: &str, #[case] value: i64, #[case] ok: bool) {
        let v = build(RuleType::Int, &[clause]).unwrap();
        assert_eq!(codes(&v, Value::Int(value)).is_empty(), ok);
    }

    #[test]
    fn zero_is_not_unset() {
        let v = build(RuleType::Int, &["REQ:MISSING", "IN:1:NOTIN"]).unwrap();
        assert_eq!(codes(&v, Value::Int(0)), ["NOTIN"]);
        assert_eq!(codes(&v, Value::from(Nilable::<i64>::unset())), ["MISSING"]);
    }

    #[test]
    fn external_predicate() {
        let mut registry = ComponentRegistry::new();
        registry.register("even", Int64Predicate(|i: i64| i % 2 == 0));
        let v = ValidatorBuilder::new()
            .with_component_lookup(Arc::new(registry))
            .parse_typed(RuleType::Int, "f", &["EXT:even:ODD"])
            .unwrap();

        assert_eq!(codes(&v, Value::Int(3)), ["ODD"]);
        assert!(codes(&v, Value::Int(8)).is_empty());
    }
}
