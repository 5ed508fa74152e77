//! `FLOAT` rules.
//!
//! Same vocabulary as `INT`, parsed as `f64`. Set members must be finite;
//! membership is exact equality.

use super::{Bounds, parse_finite_range, parse_members};
use crate::error::{BuildError, UnexpectedError};
use crate::external::{External, ExternalFloat64Validator};
use crate::rule::{OP_EXTERNAL, OP_IN, OP_RANGE, OperationToken, RuleType};
use crate::runtime::{BuildScope, Kind, Run};
use crate::value::Value;

pub(crate) struct FloatKind;

#[derive(Debug)]
pub(crate) enum FloatOp {
    In { members: Vec<f64>, code: String },
    Range { bounds: Bounds<f64>, code: String },
    External { check: External<dyn ExternalFloat64Validator>, code: String },
}

impl Kind for FloatKind {
    const TYPE: RuleType = RuleType::Float;
    const NAME: &'static str = "float";

    type Op = FloatOp;
    type Working = f64;

    /// Integers are accepted where a float is expected; JSON does not
    /// distinguish `1` from `1.0`.
    fn extract(value: &Value) -> Option<Option<f64>> {
        match value {
            Value::Float(f) => Some(Some(*f)),
            Value::Int(i) => Some(Some(*i as f64)),
            Value::NilableFloat(n) => Some(n.get().copied()),
            _ => None,
        }
    }

    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<FloatOp>, BuildError> {
        let op = match token.code() {
            OP_IN => {
                token.expect_params(scope.name(), 1, 2)?;
                let members = parse_members(scope, token, "finite float", |m| {
                    m.trim().parse::<f64>().ok().filter(|f| f.is_finite())
                })?;
                FloatOp::In {
                    members,
                    code: scope.code_at(token, 1),
                }
            }
            OP_RANGE => {
                token.expect_params(scope.name(), 1, 2)?;
                FloatOp::Range {
                    bounds: parse_finite_range(scope, token)?,
                    code: scope.code_at(token, 1),
                }
            }
            OP_EXTERNAL => {
                token.expect_params(scope.name(), 1, 2)?;
                FloatOp::External {
                    check: scope.external(token, "float64", |c| c.float64_validator())?,
                    code: scope.code_at(token, 1),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    #[allow(clippy::float_cmp)]
    fn apply(op: &FloatOp, working: &mut f64, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        let value = *working;
        match op {
            FloatOp::In { members, code } => run.check(members.iter().any(|m| *m == value), code),
            FloatOp::Range { bounds, code } => run.check(bounds.contains(value), code),
            FloatOp::External { check, code } => run.check(check.check().valid_float64(value), code),
        }
        Ok(())
    }
}
