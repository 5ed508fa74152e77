//! Validator runtime.
//!
//! Every built validator implements [`Validate`]. A call receives a
//! [`ValidationContext`] owning a mutable borrow of the subject and returns a
//! [`ValidationResult`]: whether the field was unset and the ordered,
//! duplicate-free error codes raised for it.
//!
//! The control flow shared by all kinds (required-ness, `BREAK`, `MEX`,
//! wrong-kind detection) lives in the chain executor; the kinds only supply typed
//! extraction and their own operations.

pub(crate) mod chain;

pub(crate) use chain::{BuildScope, Kind, Run, TypedValidator};

use crate::error::UnexpectedError;
use crate::value::{FieldPath, Value};
use indexmap::IndexSet;
use serde::Serialize;

// ============================================================================
// VALIDATE CONTRACT
// ============================================================================

/// A validator for one field of a subject.
///
/// Implementations are immutable once built and may be shared between
/// threads. The only thing a call may modify is the subject inside the
/// context, and only through an explicit mutating operation such as
/// `HARDTRIM`.
pub trait Validate: Send + Sync {
    /// Validates the field this validator was built for, or the context's
    /// override path if one is set.
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> Result<ValidationResult, UnexpectedError>;

    /// The field path configured at build time.
    fn field(&self) -> &FieldPath;

    /// Whether a failure should signal the orchestrator to stop.
    fn stop_all_on_fail(&self) -> bool;

    /// Every error code this validator can emit.
    fn codes_in_use(&self) -> &IndexSet<String>;

    /// Fields whose validators must run before this one.
    fn depends_on_fields(&self) -> &IndexSet<String>;
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Per-call state: the subject and an optional field override.
#[derive(Debug)]
pub struct ValidationContext<'s> {
    subject: &'s mut Value,
    field_override: Option<FieldPath>,
}

impl<'s> ValidationContext<'s> {
    /// Creates a context over `subject`.
    pub fn new(subject: &'s mut Value) -> Self {
        Self {
            subject,
            field_override: None,
        }
    }

    /// Validates `path` instead of each validator's configured field.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field_override(mut self, path: FieldPath) -> Self {
        self.field_override = Some(path);
        self
    }

    /// The subject being validated.
    #[must_use]
    pub fn subject(&self) -> &Value {
        self.subject
    }

    /// Mutable access for write-back operations.
    pub fn subject_mut(&mut self) -> &mut Value {
        self.subject
    }

    /// The override path, if any.
    #[must_use]
    pub fn field_override(&self) -> Option<&FieldPath> {
        self.field_override.as_ref()
    }

    /// Runs `f` with `path` as the override, restoring the previous one after.
    pub fn with_override_scope<R>(
        &mut self,
        path: FieldPath,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = self.field_override.replace(path);
        let out = f(self);
        self.field_override = previous;
        out
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Insertion-ordered, duplicate-free error codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCodes(IndexSet<String>);

impl ErrorCodes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `code` unless it is already present. Returns `true` if added.
    pub fn add(&mut self, code: &str) -> bool {
        if self.0.contains(code) {
            false
        } else {
            self.0.insert(code.to_owned())
        }
    }

    /// Adds every code of `other`, keeping first-occurrence order.
    pub fn extend<'a>(&mut self, other: impl IntoIterator<Item = &'a str>) {
        for code in other {
            self.add(code);
        }
    }

    /// Returns `true` if no code was raised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates codes in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Converts into an ordered vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

/// Outcome of validating one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    unset: bool,
    codes: Vec<String>,
}

impl ValidationResult {
    /// A result for a present field.
    #[must_use]
    pub fn present(codes: ErrorCodes) -> Self {
        Self {
            unset: false,
            codes: codes.into_vec(),
        }
    }

    /// A result for an unset field, carrying `missing` if the field is
    /// required.
    #[must_use]
    pub fn unset(missing: Option<&str>) -> Self {
        Self {
            unset: true,
            codes: missing.map(str::to_owned).into_iter().collect(),
        }
    }

    /// Whether the field was unset.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.unset
    }

    /// Error codes in first-occurrence order.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Returns `true` if the field raised no codes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.codes.is_empty()
    }

    /// Consumes the result, returning its codes.
    #[must_use]
    pub fn into_codes(self) -> Vec<String> {
        self.codes
    }
}
