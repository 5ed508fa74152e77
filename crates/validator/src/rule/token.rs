//! Clause tokenizer.
//!
//! A clause is `CODE[:param[:param...]]`. A doubled separator (`::`) inside a
//! parameter stands for one literal `:`, so `REG:^::A$:FAIL` carries the
//! pattern `^:A$`. The same convention applies to `,` inside set members.

use crate::error::BuildError;
use smallvec::SmallVec;

/// Separates the operation code and its parameters.
pub const CLAUSE_SEPARATOR: char = ':';

/// Separates members of `IN` sets and `MEX` field lists.
pub const MEMBER_SEPARATOR: char = ',';

/// One tokenized clause: an operation code and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationToken {
    code: String,
    params: SmallVec<[String; 3]>,
    clause: String,
}

impl OperationToken {
    /// Tokenizes one clause written for `field`.
    pub fn parse(field: &str, clause: &str) -> Result<Self, BuildError> {
        let mut parts = split_escaped(clause, CLAUSE_SEPARATOR).into_iter();

        let code = match parts.next() {
            Some(code) if !code.trim().is_empty() => code.trim().to_owned(),
            _ => {
                return Err(BuildError::EmptyClause {
                    field: field.to_owned(),
                });
            }
        };

        Ok(Self {
            code,
            params: parts.collect(),
            clause: clause.to_owned(),
        })
    }

    /// The operation code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Parameters after the code, un-escaped.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The `index`th parameter, if present.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The clause as written.
    #[must_use]
    pub fn clause(&self) -> &str {
        &self.clause
    }

    /// Checks the parameter count lies in `min..=max` and returns it.
    pub fn expect_params(&self, field: &str, min: usize, max: usize) -> Result<usize, BuildError> {
        let actual = self.params.len();
        if (min..=max).contains(&actual) {
            Ok(actual)
        } else {
            Err(BuildError::ParamCount {
                field: field.to_owned(),
                operation: self.code.clone(),
                min,
                max,
                actual,
                clause: self.clause.clone(),
            })
        }
    }
}

/// Splits `input` on `separator`, treating a doubled separator as a literal.
#[must_use]
pub fn split_escaped(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != separator {
            current.push(c);
            continue;
        }

        if chars.peek() == Some(&separator) {
            chars.next();
            current.push(separator);
        } else {
            parts.push(std::mem::take(&mut current));
        }
    }

    parts.push(current);
    parts
}
