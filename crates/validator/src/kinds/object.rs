//! `OBJ` rules: presence checks only (`REQ`, `STOPALL`, `BREAK`, `MEX`).
//!
//! Nested fields depend on their parents, so an `OBJ` rule on `address`
//! runs before the rules on `address.zip`.

use crate::error::{BuildError, UnexpectedError};
use crate::rule::{OperationToken, RuleType};
use crate::runtime::{BuildScope, Kind, Run};
use crate::value::Value;
use std::convert::Infallible;

pub(crate) struct ObjectKind;

impl Kind for ObjectKind {
    const TYPE: RuleType = RuleType::Object;
    const NAME: &'static str = "object";

    type Op = Infallible;
    type Working = ();

    fn extract(value: &Value) -> Option<Option<()>> {
        matches!(value, Value::Object(_)).then_some(Some(()))
    }

    fn parse_op(_: &OperationToken, _: &mut BuildScope<'_>) -> Result<Option<Infallible>, BuildError> {
        Ok(None)
    }

    fn apply(op: &Infallible, _: &mut (), _: &mut Run<'_, '_>) -> Result<(), UnexpectedError> {
        match *op {}
    }
}
