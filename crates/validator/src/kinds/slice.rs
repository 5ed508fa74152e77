//! `SLICE` rules.
//!
//! Vocabulary: `REQ`, `STOPALL`, `BREAK`, `MEX`, `LEN:min-max[:code]` on the
//! element count, and `ELEM:shared_rule` which validates every element with
//! a shared rule. Element `i` of `tags` is validated at path `tags.i`; its
//! codes are merged into the list's own codes.

use super::{Bounds, parse_length};
use crate::builder::Validator;
use crate::error::{BuildError, UnexpectedError};
use crate::rule::{OP_ELEMENTS, OP_LENGTH, OperationToken, RuleType};
use crate::runtime::{BuildScope, Kind, Run, Validate};
use crate::value::Value;

pub(crate) struct SliceKind;

#[derive(Debug)]
pub(crate) enum SliceOp {
    Length { bounds: Bounds<usize>, code: String },
    Elements { rule: String, validator: Box<Validator> },
}

impl Kind for SliceKind {
    const TYPE: RuleType = RuleType::Slice;
    const NAME: &'static str = "list";

    type Op = SliceOp;
    /// Element count.
    type Working = usize;

    fn extract(value: &Value) -> Option<Option<usize>> {
        match value {
            Value::List(items) => Some(Some(items.len())),
            _ => None,
        }
    }

    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<SliceOp>, BuildError> {
        let op = match token.code() {
            OP_LENGTH => {
                token.expect_params(scope.name(), 1, 2)?;
                SliceOp::Length {
                    bounds: parse_length(scope, token)?,
                    code: scope.code_at(token, 1),
                }
            }
            OP_ELEMENTS => {
                token.expect_params(scope.name(), 1, 1)?;
                let rule = token.param(0).unwrap_or_default().to_owned();
                let validator =
                    scope
                        .builder()
                        .build_shared(&rule, scope.field(), scope.shared_stack())?;
                for code in validator.codes_in_use() {
                    scope.register(code);
                }
                SliceOp::Elements {
                    rule,
                    validator: Box::new(validator),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn apply(op: &SliceOp, working: &mut usize, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        match op {
            SliceOp::Length { bounds, code } => run.check(bounds.contains(*working), code),
            SliceOp::Elements { rule, validator } => {
                for index in 0..*working {
                    let path = run.path().child(index);
                    tracing::trace!(element = %path, rule = rule.as_str(), "validating list element");
                    let result = run
                        .ctx()
                        .with_override_scope(path, |ctx| validator.validate(ctx))?;
                    run.merge(&result);
                }
            }
        }
        Ok(())
    }
}
