//! Validator builders.
//!
//! [`ValidatorBuilder`] turns one rule line into an immutable [`Validator`].
//! [`parse_rule`](ValidatorBuilder::parse_rule) picks the kind from the type
//! indicator in the line; [`parse_typed`](ValidatorBuilder::parse_typed) is
//! the per-kind entry point for lines that carry no indicator.
//!
//! # Examples
//!
//! ```
//! use rulegate_validator::prelude::*;
//!
//! let builder = ValidatorBuilder::new();
//! let name = builder
//!     .parse_rule("name", &["STR", "REQ:MISSING", "LEN:2-3:LENGTH"])
//!     .unwrap();
//!
//! let mut subject = Value::object([("name", Value::from("A"))]);
//! let result = name.validate(&mut ValidationContext::new(&mut subject)).unwrap();
//! assert_eq!(result.codes(), ["LENGTH"]);
//! ```

use crate::config::BuilderConfig;
use crate::error::{BuildError, UnexpectedError};
use crate::external::ComponentLookup;
use crate::kinds::{
    boolean::BoolKind, float::FloatKind, int::IntKind, object::ObjectKind, slice::SliceKind,
    string::StringKind,
};
use crate::rule::{RuleType, default_error_code, detect_type, tokenize};
use crate::runtime::{Kind, TypedValidator, Validate, ValidationContext, ValidationResult};
use crate::value::FieldPath;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// VALIDATOR
// ============================================================================

/// A built validator for one field. Immutable and shareable across threads.
#[derive(Debug)]
pub struct Validator(Typed);

#[derive(Debug)]
enum Typed {
    Bool(TypedValidator<BoolKind>),
    Int(TypedValidator<IntKind>),
    Float(TypedValidator<FloatKind>),
    String(TypedValidator<StringKind>),
    Slice(TypedValidator<SliceKind>),
    Object(TypedValidator<ObjectKind>),
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match &$self.0 {
            Typed::Bool($v) => $body,
            Typed::Int($v) => $body,
            Typed::Float($v) => $body,
            Typed::String($v) => $body,
            Typed::Slice($v) => $body,
            Typed::Object($v) => $body,
        }
    };
}

impl Validator {
    /// The kind this validator was built for.
    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        match &self.0 {
            Typed::Bool(_) => RuleType::Bool,
            Typed::Int(_) => RuleType::Int,
            Typed::Float(_) => RuleType::Float,
            Typed::String(_) => RuleType::String,
            Typed::Slice(_) => RuleType::Slice,
            Typed::Object(_) => RuleType::Object,
        }
    }

    /// Code used by clauses that name none.
    #[must_use]
    pub fn default_code(&self) -> &str {
        dispatch!(self, v => v.default_code())
    }

    /// Code raised when the field is required but unset.
    #[must_use]
    pub fn missing_code(&self) -> Option<&str> {
        dispatch!(self, v => v.missing_code())
    }

    /// Whether `REQ` was configured.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.missing_code().is_some()
    }
}

impl Validate for Validator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> Result<ValidationResult, UnexpectedError> {
        dispatch!(self, v => v.validate(ctx))
    }

    fn field(&self) -> &FieldPath {
        dispatch!(self, v => v.field())
    }

    fn stop_all_on_fail(&self) -> bool {
        dispatch!(self, v => v.stop_all_on_fail())
    }

    fn codes_in_use(&self) -> &IndexSet<String> {
        dispatch!(self, v => v.codes_in_use())
    }

    fn depends_on_fields(&self) -> &IndexSet<String> {
        dispatch!(self, v => v.depends_on_fields())
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds validators from rule lines.
#[derive(Default, Clone)]
pub struct ValidatorBuilder {
    config: BuilderConfig,
    lookup: Option<Arc<dyn ComponentLookup>>,
    shared: IndexMap<String, Vec<String>>,
}

impl ValidatorBuilder {
    /// Creates a builder with the default configuration, no component
    /// lookup and no shared rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the component lookup used to resolve `EXT` clauses.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_component_lookup(mut self, lookup: Arc<dyn ComponentLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Adds a shared rule that `ELEM` clauses can refer to.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_rule<I, S>(mut self, name: &str, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared
            .insert(name.to_owned(), clauses.into_iter().map(Into::into).collect());
        self
    }

    /// Adds several shared rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_rules(mut self, rules: IndexMap<String, Vec<String>>) -> Self {
        self.shared.extend(rules);
        self
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub(crate) fn lookup(&self) -> Option<&dyn ComponentLookup> {
        self.lookup.as_deref()
    }

    /// Builds a validator, choosing the kind from the line's type indicator.
    pub fn parse_rule<S: AsRef<str>>(&self, field: &str, clauses: &[S]) -> Result<Validator, BuildError> {
        let path = FieldPath::parse(field)?;
        self.build(path, clauses, None, &[])
    }

    /// Builds a validator of a known kind. A type indicator in the line is
    /// optional; one for another kind is an unknown operation.
    pub fn parse_typed<S: AsRef<str>>(
        &self,
        rule_type: RuleType,
        field: &str,
        clauses: &[S],
    ) -> Result<Validator, BuildError> {
        let path = FieldPath::parse(field)?;
        self.build(path, clauses, Some(rule_type), &[])
    }

    /// Builds the shared rule `name` for the elements of `field`.
    pub(crate) fn build_shared(
        &self,
        name: &str,
        field: &FieldPath,
        stack: &[String],
    ) -> Result<Validator, BuildError> {
        if stack.iter().any(|s| s == name) {
            return Err(BuildError::RecursiveSharedRule {
                field: field.to_string(),
                rule: name.to_owned(),
            });
        }

        let clauses = self
            .shared
            .get(name)
            .ok_or_else(|| BuildError::UnknownSharedRule {
                field: field.to_string(),
                rule: name.to_owned(),
            })?;

        let mut stack = stack.to_vec();
        stack.push(name.to_owned());
        self.build(field.clone(), clauses, None, &stack)
    }

    fn build<S: AsRef<str>>(
        &self,
        field: FieldPath,
        clauses: &[S],
        rule_type: Option<RuleType>,
        stack: &[String],
    ) -> Result<Validator, BuildError> {
        let clauses: Vec<String> = clauses.iter().map(|c| c.as_ref().to_owned()).collect();
        let tokens = tokenize(field.as_str(), &clauses)?;

        let rule_type = match rule_type {
            Some(t) => t,
            None => detect_type(field.as_str(), &tokens)?,
        };

        let typed = match rule_type {
            RuleType::Bool => Typed::Bool(self.chain(field, &tokens, stack)?),
            RuleType::Int => Typed::Int(self.chain(field, &tokens, stack)?),
            RuleType::Float => Typed::Float(self.chain(field, &tokens, stack)?),
            RuleType::String => Typed::String(self.chain(field, &tokens, stack)?),
            RuleType::Slice => Typed::Slice(self.chain(field, &tokens, stack)?),
            RuleType::Object => Typed::Object(self.chain(field, &tokens, stack)?),
        };
        Ok(Validator(typed))
    }

    fn chain<K: Kind>(
        &self,
        field: FieldPath,
        tokens: &[crate::rule::OperationToken],
        stack: &[String],
    ) -> Result<TypedValidator<K>, BuildError> {
        let configured = self.config.default_codes.for_type(K::TYPE);
        let default_code = default_error_code(K::TYPE, tokens, configured);
        TypedValidator::build(field, tokens, default_code, self, stack)
    }
}

impl fmt::Debug for ValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("config", &self.config)
            .field("has_lookup", &self.lookup.is_some())
            .field("shared", &self.shared.keys().collect::<Vec<_>>())
            .finish()
    }
}
