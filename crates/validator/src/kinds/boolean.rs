//! `BOOL` rules.
//!
//! Vocabulary: `REQ`, `STOPALL`, `BREAK`, `MEX`, `IS:true|false[:code]`,
//! `EXT:component[:code]`.

use crate::error::{BuildError, UnexpectedError};
use crate::external::{External, ExternalBoolValidator};
use crate::rule::{OP_EXTERNAL, OP_IS, OperationToken, RuleType};
use crate::runtime::{BuildScope, Kind, Run};
use crate::value::Value;

pub(crate) struct BoolKind;

#[derive(Debug)]
pub(crate) enum BoolOp {
    Is { expected: bool, code: String },
    External { check: External<dyn ExternalBoolValidator>, code: String },
}

impl Kind for BoolKind {
    const TYPE: RuleType = RuleType::Bool;
    const NAME: &'static str = "bool";

    type Op = BoolOp;
    type Working = bool;

    fn extract(value: &Value) -> Option<Option<bool>> {
        match value {
            Value::Bool(b) => Some(Some(*b)),
            Value::NilableBool(n) => Some(n.get().copied()),
            _ => None,
        }
    }

    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<BoolOp>, BuildError> {
        let op = match token.code() {
            OP_IS => {
                token.expect_params(scope.name(), 1, 2)?;
                let literal = token.param(0).unwrap_or_default();
                let expected = literal.parse().map_err(|_| BuildError::InvalidLiteral {
                    field: scope.name().to_owned(),
                    value: literal.to_owned(),
                    expected: "boolean",
                    clause: token.clause().to_owned(),
                })?;
                BoolOp::Is {
                    expected,
                    code: scope.code_at(token, 1),
                }
            }
            OP_EXTERNAL => {
                token.expect_params(scope.name(), 1, 2)?;
                BoolOp::External {
                    check: scope.external(token, "bool", |c| c.bool_validator())?,
                    code: scope.code_at(token, 1),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn apply(op: &BoolOp, working: &mut bool, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        match op {
            BoolOp::Is { expected, code } => run.check(*working == *expected, code),
            BoolOp::External { check, code } => run.check(check.check().valid_bool(*working), code),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BuildError;
    use crate::kinds::testing::{build, codes};
    use crate::rule::RuleType;
    use crate::value::{Nilable, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn is_literal_matches() {
        let v = build(RuleType::Bool, &["REQ:MISSING", "IS:false:WRONG"]).unwrap();
        assert_eq!(codes(&v, Value::Bool(true)), ["WRONG"]);
        assert!(codes(&v, Value::Bool(false)).is_empty());
    }

    #[test]
    fn unset_nilable_is_missing() {
        let v = build(RuleType::Bool, &["REQ:MISSING", "IS:true"]).unwrap();
        assert_eq!(codes(&v, Value::from(Nilable::<bool>::unset())), ["MISSING"]);
        assert_eq!(codes(&v, Value::from(Nilable::new(false))), ["INVALID"]);
    }

    #[test]
    fn bad_literal_is_a_build_error() {
        let err = build(RuleType::Bool, &["IS:yes"]).unwrap_err();
        assert!(matches!(err, BuildError::InvalidLiteral { expected: "boolean", .. }));
    }

    #[test]
    fn is_requires_a_literal() {
        assert!(matches!(
            build(RuleType::Bool, &["IS"]),
            Err(BuildError::ParamCount { .. })
        ));
    }

    #[test]
    fn string_operations_are_rejected() {
        assert!(matches!(
            build(RuleType::Bool, &["LEN:1-2"]),
            Err(BuildError::UnknownOperation { kind: "bool", .. })
        ));
    }
}
