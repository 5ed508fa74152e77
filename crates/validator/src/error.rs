//! Error types for rule building and validation.
//!
//! Two disjoint classes live here:
//!
//! - [`BuildError`]: a rule set is malformed. Raised while parsing rule
//!   clauses, never while validating a subject.
//! - [`UnexpectedError`]: the subject does not have the shape the rules were
//!   written for (a string bound to an `INT` rule, a path that walks through a
//!   scalar). This is a programming error, not bad user input.
//!
//! Validation failures are not errors at all: they are the codes carried by a
//! [`ValidationResult`](crate::runtime::ValidationResult).

use thiserror::Error;

// ============================================================================
// BUILD ERRORS
// ============================================================================

/// A rule could not be turned into a validator.
///
/// Every variant names the field the rule was written for and, where one
/// exists, the clause that caused the failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A clause was empty or consisted only of delimiters.
    #[error("field '{field}': empty rule clause")]
    EmptyClause {
        /// Field the rule belongs to.
        field: String,
    },

    /// The operation code is not part of the kind's vocabulary.
    #[error("field '{field}': unsupported {kind} operation '{code}' in clause '{clause}'")]
    UnknownOperation {
        /// Field the rule belongs to.
        field: String,
        /// Kind of the validator being built.
        kind: &'static str,
        /// The offending operation code.
        code: String,
        /// The full clause.
        clause: String,
    },

    /// An operation received too few or too many parameters.
    #[error(
        "field '{field}': operation {operation} expects {min}..={max} parameters, got {actual} in clause '{clause}'"
    )]
    ParamCount {
        /// Field the rule belongs to.
        field: String,
        /// Operation code.
        operation: String,
        /// Minimum number of parameters.
        min: usize,
        /// Maximum number of parameters.
        max: usize,
        /// Parameters actually supplied.
        actual: usize,
        /// The full clause.
        clause: String,
    },

    /// A typed literal (set member, bound, boolean) did not parse.
    #[error("field '{field}': '{value}' is not a valid {expected} in clause '{clause}'")]
    InvalidLiteral {
        /// Field the rule belongs to.
        field: String,
        /// The literal that failed to parse.
        value: String,
        /// What the literal should have been.
        expected: &'static str,
        /// The full clause.
        clause: String,
    },

    /// A `LEN` or `RANGE` bound is malformed or inverted.
    #[error("field '{field}': invalid range '{range}' in clause '{clause}'")]
    InvalidRange {
        /// Field the rule belongs to.
        field: String,
        /// The range text as written.
        range: String,
        /// The full clause.
        clause: String,
    },

    /// A `REG` pattern did not compile.
    #[error("field '{field}': invalid pattern '{pattern}' in clause '{clause}'")]
    InvalidRegex {
        /// Field the rule belongs to.
        field: String,
        /// The pattern after un-escaping.
        pattern: String,
        /// The full clause.
        clause: String,
        /// Compilation failure.
        #[source]
        source: regex::Error,
    },

    /// An `EXT` clause was used but the builder has no component lookup.
    #[error("field '{field}': no component lookup configured to resolve clause '{clause}'")]
    NoComponentLookup {
        /// Field the rule belongs to.
        field: String,
        /// The full clause.
        clause: String,
    },

    /// No component is registered under the requested name.
    #[error("field '{field}': no component named '{component}' in clause '{clause}'")]
    ComponentNotFound {
        /// Field the rule belongs to.
        field: String,
        /// Requested component name.
        component: String,
        /// The full clause.
        clause: String,
    },

    /// The component exists but cannot validate this kind of value.
    #[error("field '{field}': component '{component}' cannot validate {capability} values in clause '{clause}'")]
    MissingCapability {
        /// Field the rule belongs to.
        field: String,
        /// Component name.
        component: String,
        /// The capability the field's kind requires.
        capability: &'static str,
        /// The full clause.
        clause: String,
    },

    /// A rule line carries no type indicator.
    #[error("field '{field}': rule has no type indicator (BOOL, INT, FLOAT, STR, SLICE, OBJ)")]
    MissingType {
        /// Field the rule belongs to.
        field: String,
    },

    /// A rule line carries two different type indicators.
    #[error("field '{field}': rule declares both {first} and {second}")]
    ConflictingTypes {
        /// Field the rule belongs to.
        field: String,
        /// First indicator seen.
        first: &'static str,
        /// Second, conflicting indicator.
        second: &'static str,
    },

    /// An `ELEM` clause names a shared rule that does not exist.
    #[error("field '{field}': unknown shared rule '{rule}'")]
    UnknownSharedRule {
        /// Field the rule belongs to.
        field: String,
        /// Requested shared rule name.
        rule: String,
    },

    /// Shared rules reference each other in a loop through `ELEM`.
    #[error("field '{field}': shared rule '{rule}' refers back to itself")]
    RecursiveSharedRule {
        /// Field the rule belongs to.
        field: String,
        /// Shared rule that closed the loop.
        rule: String,
    },

    /// A field path is empty or has an empty segment.
    #[error("invalid field path '{path}'")]
    InvalidPath {
        /// The path as written.
        path: String,
    },

    /// A rule line has no field name.
    #[error("rule line {line} has no field name")]
    MissingField {
        /// Zero-based index of the rule line.
        line: usize,
    },

    /// Two rule lines configure the same field.
    #[error("field '{field}' is configured more than once (rule line {line})")]
    DuplicateField {
        /// The repeated field.
        field: String,
        /// Zero-based index of the repeating rule line.
        line: usize,
    },

    /// Field dependencies form a cycle.
    #[error("field '{field}' (rule line {line}) is part of a dependency cycle")]
    DependencyCycle {
        /// A field on the cycle.
        field: String,
        /// Zero-based index of that field's rule line.
        line: usize,
    },

    /// The rule source could not be deserialized.
    #[error("malformed rule source")]
    Source(#[from] serde_json::Error),
}

// ============================================================================
// UNEXPECTED ERRORS
// ============================================================================

/// A path could not be walked through the subject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// A segment tried to descend into a scalar value.
    #[error("path '{path}': segment '{segment}' descends into a {found} value")]
    NotAContainer {
        /// Full path being resolved.
        path: String,
        /// Segment that could not be applied.
        segment: String,
        /// Kind of the value the segment was applied to.
        found: &'static str,
    },

    /// A non-numeric segment was applied to a list.
    #[error("path '{path}': segment '{segment}' is not a list index")]
    BadIndex {
        /// Full path being resolved.
        path: String,
        /// Segment that could not be applied.
        segment: String,
    },
}

/// Validation could not run because the subject does not match the rules.
///
/// Never shown to end users as a field error; the orchestrator logs it and
/// callers should report an internal failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UnexpectedError {
    /// The resolved value is not of the kind the validator expects.
    #[error("field '{field}' holds a {found} value, expected {expected}")]
    WrongKind {
        /// Path of the offending field.
        field: String,
        /// Kind the validator was built for.
        expected: &'static str,
        /// Kind actually found.
        found: &'static str,
    },

    /// The field path could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_names_field_and_clause() {
        let err = BuildError::UnknownOperation {
            field: "name".into(),
            kind: "string",
            code: "NOPE".into(),
            clause: "NOPE:1".into(),
        };
        insta::assert_snapshot!(err.to_string(), @"field 'name': unsupported string operation 'NOPE' in clause 'NOPE:1'");
    }

    #[test]
    fn param_count_message() {
        let err = BuildError::ParamCount {
            field: "flag".into(),
            operation: "IS".into(),
            min: 1,
            max: 2,
            actual: 0,
            clause: "IS".into(),
        };
        insta::assert_snapshot!(err.to_string(), @"field 'flag': operation IS expects 1..=2 parameters, got 0 in clause 'IS'");
    }

    #[test]
    fn rule_set_errors_name_the_rule_line() {
        let err = BuildError::DuplicateField {
            field: "email".into(),
            line: 3,
        };
        insta::assert_snapshot!(err.to_string(), @"field 'email' is configured more than once (rule line 3)");

        let err = BuildError::DependencyCycle {
            field: "a".into(),
            line: 0,
        };
        insta::assert_snapshot!(err.to_string(), @"field 'a' (rule line 0) is part of a dependency cycle");
    }

    #[test]
    fn resolution_error_is_transparent() {
        let err: UnexpectedError = ResolutionError::BadIndex {
            path: "items.x".into(),
            segment: "x".into(),
        }
        .into();
        assert_eq!(err.to_string(), "path 'items.x': segment 'x' is not a list index");
    }
}
