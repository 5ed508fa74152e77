//! Dot-separated field paths and their resolution against a subject.
//!
//! `user.address.zip` walks object keys; a numeric segment applied to a list
//! (`items.0.name`) is an index. Reaching `Null`, a missing key or an
//! out-of-range index on the way means the field is unset. Descending into a
//! scalar is a [`ResolutionError`]: the rules do not describe this subject.

use super::Value;
use crate::error::{BuildError, ResolutionError};
use std::fmt;

const SEPARATOR: char = '.';

// ============================================================================
// FIELD PATH
// ============================================================================

/// A parsed, non-empty dot-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses `a.b.c`. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, BuildError> {
        let segments: Vec<String> = path.split(SEPARATOR).map(str::to_owned).collect();

        if path.is_empty() || segments.iter().any(String::is_empty) {
            return Err(BuildError::InvalidPath {
                path: path.to_owned(),
            });
        }

        Ok(Self {
            raw: path.to_owned(),
            segments,
        })
    }

    /// The path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Every proper prefix of the path, shortest first.
    ///
    /// `a.b.c` yields `a` and `a.b`.
    #[must_use]
    pub fn parents(&self) -> Vec<String> {
        (1..self.segments.len())
            .map(|n| self.segments[..n].join("."))
            .collect()
    }

    /// Appends one segment, e.g. a list index.
    #[must_use]
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        let segment = segment.to_string();
        let mut segments = self.segments.clone();
        let raw = format!("{}{SEPARATOR}{segment}", self.raw);
        segments.push(segment);
        Self { raw, segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Outcome of walking a path through a subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// The field, or a container on the way to it, is absent.
    Unset,
    /// The field exists. It may still be an unset [`Nilable`](super::Nilable).
    Present(&'a Value),
}

/// Resolves `path` against `subject` without modifying it.
pub fn resolve<'a>(subject: &'a Value, path: &FieldPath) -> Result<Resolved<'a>, ResolutionError> {
    descend(subject, path.segments(), path)
}

/// Resolves `path` for writing. Returns `None` when the field is unset.
pub fn resolve_mut<'a>(
    subject: &'a mut Value,
    path: &FieldPath,
) -> Result<Option<&'a mut Value>, ResolutionError> {
    descend_mut(subject, path.segments(), path)
}

fn descend<'a>(
    value: &'a Value,
    segments: &[String],
    path: &FieldPath,
) -> Result<Resolved<'a>, ResolutionError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(if value.is_null() {
            Resolved::Unset
        } else {
            Resolved::Present(value)
        });
    };

    let next = match value {
        Value::Null => return Ok(Resolved::Unset),
        Value::Object(map) => map.get(segment.as_str()),
        Value::List(items) => items.get(parse_index(segment, path)?),
        other => return Err(not_a_container(path, segment, other)),
    };

    match next {
        Some(child) => descend(child, rest, path),
        None => Ok(Resolved::Unset),
    }
}

fn descend_mut<'a>(
    value: &'a mut Value,
    segments: &[String],
    path: &FieldPath,
) -> Result<Option<&'a mut Value>, ResolutionError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(if value.is_null() { None } else { Some(value) });
    };

    let next = match value {
        Value::Null => return Ok(None),
        Value::Object(map) => map.get_mut(segment.as_str()),
        Value::List(items) => items.get_mut(parse_index(segment, path)?),
        other => return Err(not_a_container(path, segment, other)),
    };

    match next {
        Some(child) => descend_mut(child, rest, path),
        None => Ok(None),
    }
}

fn parse_index(segment: &str, path: &FieldPath) -> Result<usize, ResolutionError> {
    segment
        .parse::<usize>()
        .map_err(|_| ResolutionError::BadIndex {
            path: path.to_string(),
            segment: segment.to_owned(),
        })
}

fn not_a_container(path: &FieldPath, segment: &str, found: &Value) -> ResolutionError {
    ResolutionError::NotAContainer {
        path: path.to_string(),
        segment: segment.to_owned(),
        found: found.kind().name(),
    }
}
