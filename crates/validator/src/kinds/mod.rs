//! Field kinds.
//!
//! Each submodule owns one kind's operation vocabulary: how its clauses are
//! parsed when a rule is built and how they are applied when a subject is
//! validated. Shared parameter parsing (set members, length and numeric
//! bounds) lives here.

pub(crate) mod boolean;
pub(crate) mod float;
pub(crate) mod int;
pub(crate) mod object;
pub(crate) mod slice;
pub(crate) mod string;

use crate::error::BuildError;
use crate::rule::{MEMBER_SEPARATOR, OperationToken, split_escaped};
use crate::runtime::BuildScope;
use std::str::FromStr;

/// Separates the bounds of `LEN:min-max`.
const LENGTH_SEPARATOR: char = '-';

/// Separates the bounds of `RANGE:min|max`. Not `-`, so bounds can be negative.
const RANGE_SEPARATOR: char = '|';

/// Inclusive bounds, either of which may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds<T> {
    pub(crate) min: Option<T>,
    pub(crate) max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub(crate) fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Parses `min-max` where either side may be empty, e.g. `5-`, `-10`.
pub(crate) fn parse_length(scope: &BuildScope<'_>, token: &OperationToken) -> Result<Bounds<usize>, BuildError> {
    parse_bounds(scope, token, LENGTH_SEPARATOR, |_| true)
}

/// Parses `min|max` where either side may be empty, e.g. `-5|`, `|100`.
pub(crate) fn parse_range<T>(scope: &BuildScope<'_>, token: &OperationToken) -> Result<Bounds<T>, BuildError>
where
    T: FromStr + PartialOrd + Copy,
{
    parse_bounds(scope, token, RANGE_SEPARATOR, |_| true)
}

/// Like [`parse_range`], but `NaN` and infinite bounds are invalid.
pub(crate) fn parse_finite_range(scope: &BuildScope<'_>, token: &OperationToken) -> Result<Bounds<f64>, BuildError> {
    parse_bounds(scope, token, RANGE_SEPARATOR, |b: &f64| b.is_finite())
}

fn parse_bounds<T>(
    scope: &BuildScope<'_>,
    token: &OperationToken,
    separator: char,
    accept: impl Fn(&T) -> bool,
) -> Result<Bounds<T>, BuildError>
where
    T: FromStr + PartialOrd + Copy,
{
    let raw = token.param(0).unwrap_or_default();
    let invalid = || BuildError::InvalidRange {
        field: scope.name().to_owned(),
        range: raw.to_owned(),
        clause: token.clause().to_owned(),
    };

    let (min, max) = raw.split_once(separator).ok_or_else(invalid)?;
    let bound = |s: &str| -> Result<Option<T>, BuildError> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().ok().filter(|b| accept(b)).map(Some).ok_or_else(invalid)
        }
    };

    let bounds = Bounds {
        min: bound(min)?,
        max: bound(max)?,
    };

    match (bounds.min, bounds.max) {
        (None, None) => Err(invalid()),
        (Some(min), Some(max)) if min > max => Err(invalid()),
        _ => Ok(bounds),
    }
}

/// Splits the member list of an `IN` clause and parses every member.
pub(crate) fn parse_members<T, F>(
    scope: &BuildScope<'_>,
    token: &OperationToken,
    expected: &'static str,
    parse: F,
) -> Result<Vec<T>, BuildError>
where
    F: Fn(&str) -> Option<T>,
{
    split_escaped(token.param(0).unwrap_or_default(), MEMBER_SEPARATOR)
        .iter()
        .map(|member| {
            parse(member).ok_or_else(|| BuildError::InvalidLiteral {
                field: scope.name().to_owned(),
                value: member.clone(),
                expected,
                clause: token.clause().to_owned(),
            })
        })
        .collect()
}
