//! `STR` rules.
//!
//! Vocabulary: `REQ`, `STOPALL`, `BREAK`, `MEX`, `LEN:min-max[:code]`,
//! `REG:pattern[:code]`, `TRIM`, `HARDTRIM`, `IN:a,b[:code]`,
//! `EXT:component[:code]`.
//!
//! Trimming is positional. `TRIM` changes only the value later checks see;
//! `HARDTRIM` also writes the trimmed value back into the subject. An empty
//! string is a present value, not an unset one.

use super::{Bounds, parse_length, parse_members};
use crate::error::{BuildError, UnexpectedError};
use crate::external::{External, ExternalStringValidator};
use crate::rule::{
    OP_EXTERNAL, OP_HARD_TRIM, OP_IN, OP_LENGTH, OP_REGEX, OP_TRIM, OperationToken, RuleType,
};
use crate::runtime::{BuildScope, Kind, Run};
use crate::value::Value;
use regex::Regex;
use std::collections::HashSet;

pub(crate) struct StringKind;

#[derive(Debug)]
pub(crate) enum StringOp {
    Length { bounds: Bounds<usize>, code: String },
    Regex { pattern: Regex, code: String },
    Trim { hard: bool },
    In { members: HashSet<String>, code: String },
    External { check: External<dyn ExternalStringValidator>, code: String },
}

impl Kind for StringKind {
    const TYPE: RuleType = RuleType::String;
    const NAME: &'static str = "string";

    type Op = StringOp;
    type Working = String;

    fn extract(value: &Value) -> Option<Option<String>> {
        match value {
            Value::String(s) => Some(Some(s.clone())),
            Value::NilableString(n) => Some(n.get().cloned()),
            _ => None,
        }
    }

    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<StringOp>, BuildError> {
        let field = scope.name();
        let op = match token.code() {
            OP_LENGTH => {
                token.expect_params(field, 1, 2)?;
                StringOp::Length {
                    bounds: parse_length(scope, token)?,
                    code: scope.code_at(token, 1),
                }
            }
            OP_REGEX => {
                token.expect_params(field, 1, 2)?;
                let raw = token.param(0).unwrap_or_default();
                let pattern = Regex::new(raw).map_err(|source| BuildError::InvalidRegex {
                    field: field.to_owned(),
                    pattern: raw.to_owned(),
                    clause: token.clause().to_owned(),
                    source,
                })?;
                StringOp::Regex {
                    pattern,
                    code: scope.code_at(token, 1),
                }
            }
            OP_TRIM => {
                token.expect_params(field, 0, 0)?;
                StringOp::Trim { hard: false }
            }
            OP_HARD_TRIM => {
                token.expect_params(field, 0, 0)?;
                StringOp::Trim { hard: true }
            }
            OP_IN => {
                token.expect_params(field, 1, 2)?;
                let members = parse_members(scope, token, "string", |m| Some(m.to_owned()))?;
                StringOp::In {
                    members: members.into_iter().collect(),
                    code: scope.code_at(token, 1),
                }
            }
            OP_EXTERNAL => {
                token.expect_params(field, 1, 2)?;
                StringOp::External {
                    check: scope.external(token, "string", |c| c.string_validator())?,
                    code: scope.code_at(token, 1),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn apply(op: &StringOp, working: &mut String, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        match op {
            StringOp::Length { bounds, code } => run.check(bounds.contains(working.chars().count()), code),
            StringOp::Regex { pattern, code } => run.check(pattern.is_match(working), code),
            StringOp::In { members, code } => run.check(members.contains(working.as_str()), code),
            StringOp::External { check, code } => run.check(check.check().valid_string(working), code),
            StringOp::Trim { hard } => {
                let trimmed = working.trim();
                if trimmed.len() != working.len() {
                    *working = trimmed.to_owned();
                }
                if *hard {
                    let stored = working.clone();
                    run.write_back(|value| match value {
                        Value::String(s) => *s = stored,
                        Value::NilableString(n) => n.set(stored),
                        _ => {}
                    })?;
                }
            }
        }
        Ok(())
    }
}
