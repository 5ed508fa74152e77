//! The operation chain shared by every field kind.
//!
//! A [`TypedValidator`] is parameterised by a [`Kind`]. The kind extracts a
//! typed working value from the subject and applies its own operations;
//! everything else (required-ness, `STOPALL`, `BREAK`, `MEX`, code
//! bookkeeping, unset and wrong-kind handling) is implemented once here.

use super::{ErrorCodes, Validate, ValidationContext, ValidationResult};
use crate::builder::ValidatorBuilder;
use crate::error::{BuildError, UnexpectedError};
use crate::external::{Component, External, resolve_external};
use crate::rule::{
    MEMBER_SEPARATOR, OP_BREAK, OP_MUTUAL_EXCLUSION, OP_REQUIRED, OP_STOP_ALL, OperationToken,
    RuleType, is_type_indicator, split_escaped,
};
use crate::value::{FieldPath, Resolved, Value, resolve, resolve_mut};
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// KIND
// ============================================================================

/// One field kind: its vocabulary and its typed view of a value.
pub(crate) trait Kind: Send + Sync + 'static {
    /// Type indicator owning this kind's rules.
    const TYPE: RuleType;

    /// Name used in wrong-kind errors; matches [`ValueKind::name`](crate::value::ValueKind::name).
    const NAME: &'static str;

    /// Kind-specific operations.
    type Op: fmt::Debug + Send + Sync;

    /// The value the chain works on. Soft mutations (`TRIM`) change only this.
    type Working;

    /// Extracts the working value from a present, non-null value.
    ///
    /// `None` means the value is of another kind. `Some(None)` means the value
    /// is a nilable in the unset state.
    fn extract(value: &Value) -> Option<Option<Self::Working>>;

    /// Parses one kind-specific clause. `Ok(None)` means the code is not in
    /// this kind's vocabulary.
    fn parse_op(token: &OperationToken, scope: &mut BuildScope<'_>) -> Result<Option<Self::Op>, BuildError>;

    /// Applies one operation, raising codes through `run`.
    fn apply(op: &Self::Op, working: &mut Self::Working, run: &mut Run<'_, '_>) -> Result<(), UnexpectedError>;
}

/// One member of the chain.
#[derive(Debug)]
pub(crate) enum Step<O> {
    /// Stop if any code has been raised so far.
    Break,
    /// Raise `code` if any of `fields` is set in the subject. The fields are
    /// read directly and do not become dependencies.
    Exclusive {
        fields: Vec<FieldPath>,
        code: String,
    },
    /// A kind-specific operation.
    Op(O),
}

// ============================================================================
// BUILD SCOPE
// ============================================================================

/// Build-time state handed to [`Kind::parse_op`].
pub(crate) struct BuildScope<'b> {
    field: &'b FieldPath,
    default_code: &'b str,
    builder: &'b ValidatorBuilder,
    shared_stack: &'b [String],
    codes_in_use: IndexSet<String>,
}

impl<'b> BuildScope<'b> {
    /// The field being built, as written.
    pub(crate) fn field(&self) -> &'b FieldPath {
        self.field
    }

    /// Shorthand for the field name in errors.
    pub(crate) fn name(&self) -> &'b str {
        self.field.as_str()
    }

    /// The builder, for nested rules.
    pub(crate) fn builder(&self) -> &'b ValidatorBuilder {
        self.builder
    }

    /// Shared rules currently being expanded, outermost first.
    pub(crate) fn shared_stack(&self) -> &'b [String] {
        self.shared_stack
    }

    /// The code at parameter `index`, falling back to the default code.
    /// Either way the code is recorded as in use.
    pub(crate) fn code_at(&mut self, token: &OperationToken, index: usize) -> String {
        let code = token
            .param(index)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_code)
            .to_owned();
        self.register(&code);
        code
    }

    /// Records a code emitted by a nested validator.
    pub(crate) fn register(&mut self, code: &str) {
        if !self.codes_in_use.contains(code) {
            self.codes_in_use.insert(code.to_owned());
        }
    }

    /// Resolves the component named by an `EXT` clause.
    pub(crate) fn external<T: ?Sized>(
        &self,
        token: &OperationToken,
        capability: &'static str,
        narrow: impl FnOnce(Arc<dyn Component>) -> Option<Arc<T>>,
    ) -> Result<External<T>, BuildError> {
        resolve_external(self.builder.lookup(), self.name(), token, capability, narrow)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(field: &'b FieldPath, builder: &'b ValidatorBuilder) -> Self {
        Self {
            field,
            default_code: crate::config::DEFAULT_ERROR_CODE,
            builder,
            shared_stack: &[],
            codes_in_use: IndexSet::new(),
        }
    }

    /// Error for a code outside the kind's vocabulary.
    pub(crate) fn unknown(&self, kind: &'static str, token: &OperationToken) -> BuildError {
        BuildError::UnknownOperation {
            field: self.name().to_owned(),
            kind,
            code: token.code().to_owned(),
            clause: token.clause().to_owned(),
        }
    }
}

// ============================================================================
// RUN
// ============================================================================

/// Run-time state handed to [`Kind::apply`].
pub(crate) struct Run<'r, 's> {
    ctx: &'r mut ValidationContext<'s>,
    path: &'r FieldPath,
    codes: ErrorCodes,
}

impl<'s> Run<'_, 's> {
    /// Raises `code`.
    pub(crate) fn fail(&mut self, code: &str) {
        self.codes.add(code);
    }

    /// Raises `code` unless `ok`.
    pub(crate) fn check(&mut self, ok: bool, code: &str) {
        if !ok {
            self.fail(code);
        }
    }

    /// Raises every code of a nested result.
    pub(crate) fn merge(&mut self, result: &ValidationResult) {
        self.codes.extend(result.codes().iter().map(String::as_str));
    }

    /// Path actually being validated.
    pub(crate) fn path(&self) -> &FieldPath {
        self.path
    }

    /// The context, for nested validation.
    pub(crate) fn ctx(&mut self) -> &mut ValidationContext<'s> {
        self.ctx
    }

    /// Writes back into the field's stored value.
    pub(crate) fn write_back(&mut self, f: impl FnOnce(&mut Value)) -> Result<(), UnexpectedError> {
        if let Some(stored) = resolve_mut(self.ctx.subject_mut(), self.path)? {
            f(stored);
        }
        Ok(())
    }

    fn any_set(&self, fields: &[FieldPath]) -> Result<bool, UnexpectedError> {
        for field in fields {
            if let Resolved::Present(v) = resolve(self.ctx.subject(), field)?
                && !v.is_unset()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// ============================================================================
// TYPED VALIDATOR
// ============================================================================

/// A validator for one field of kind `K`.
pub(crate) struct TypedValidator<K: Kind> {
    field: FieldPath,
    default_code: String,
    required: Option<String>,
    stop_all: bool,
    steps: Vec<Step<K::Op>>,
    codes_in_use: IndexSet<String>,
    depends_on: IndexSet<String>,
}

impl<K: Kind> TypedValidator<K> {
    /// Builds the chain from tokenized clauses.
    pub(crate) fn build(
        field: FieldPath,
        tokens: &[OperationToken],
        default_code: String,
        builder: &ValidatorBuilder,
        shared_stack: &[String],
    ) -> Result<Self, BuildError> {
        let mut scope = BuildScope {
            field: &field,
            default_code: &default_code,
            builder,
            shared_stack,
            codes_in_use: IndexSet::new(),
        };
        scope.register(&default_code);

        let name = field.as_str();
        let mut required = None;
        let mut stop_all = false;
        let mut steps = Vec::with_capacity(tokens.len());
        let mut depends_on: IndexSet<String> = field.parents().into_iter().collect();

        for token in tokens {
            match token.code() {
                code if is_type_indicator(K::TYPE, code) => {
                    token.expect_params(name, 0, 1)?;
                }
                OP_REQUIRED => {
                    token.expect_params(name, 0, 1)?;
                    required = Some(scope.code_at(token, 0));
                }
                OP_STOP_ALL => {
                    token.expect_params(name, 0, 0)?;
                    stop_all = true;
                }
                OP_BREAK => {
                    token.expect_params(name, 0, 0)?;
                    steps.push(Step::Break);
                }
                OP_MUTUAL_EXCLUSION => {
                    token.expect_params(name, 1, 2)?;
                    let fields = split_escaped(token.param(0).unwrap_or_default(), MEMBER_SEPARATOR)
                        .iter()
                        .map(|f| FieldPath::parse(f.trim()))
                        .collect::<Result<Vec<_>, _>>()?;
                    let code = scope.code_at(token, 1);
                    steps.push(Step::Exclusive { fields, code });
                }
                _ => match K::parse_op(token, &mut scope)? {
                    Some(op) => steps.push(Step::Op(op)),
                    None => return Err(scope.unknown(K::NAME, token)),
                },
            }
        }

        depends_on.shift_remove(name);
        let codes_in_use = scope.codes_in_use;

        tracing::debug!(
            field = name,
            kind = K::NAME,
            steps = steps.len(),
            required = required.is_some(),
            stop_all,
            "built validator"
        );

        Ok(Self {
            field,
            default_code,
            required,
            stop_all,
            steps,
            codes_in_use,
            depends_on,
        })
    }

    /// The code used when a clause names none.
    pub(crate) fn default_code(&self) -> &str {
        &self.default_code
    }

    /// The code raised when a required field is unset.
    pub(crate) fn missing_code(&self) -> Option<&str> {
        self.required.as_deref()
    }
}

impl<K: Kind> Validate for TypedValidator<K> {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> Result<ValidationResult, UnexpectedError> {
        let path = ctx.field_override().unwrap_or(&self.field).clone();
        tracing::trace!(field = %path, kind = K::NAME, "validating field");

        let working = match resolve(ctx.subject(), &path)? {
            Resolved::Unset => None,
            Resolved::Present(value) => K::extract(value).ok_or_else(|| UnexpectedError::WrongKind {
                field: path.to_string(),
                expected: K::NAME,
                found: value.kind().name(),
            })?,
        };

        let Some(mut working) = working else {
            return Ok(ValidationResult::unset(self.missing_code()));
        };

        let mut run = Run {
            ctx,
            path: &path,
            codes: ErrorCodes::new(),
        };

        for step in &self.steps {
            match step {
                Step::Break if !run.codes.is_empty() => break,
                Step::Break => {}
                Step::Exclusive { fields, code } => {
                    if run.any_set(fields)? {
                        run.fail(code);
                    }
                }
                Step::Op(op) => K::apply(op, &mut working, &mut run)?,
            }
        }

        Ok(ValidationResult::present(run.codes))
    }

    fn field(&self) -> &FieldPath {
        &self.field
    }

    fn stop_all_on_fail(&self) -> bool {
        self.stop_all
    }

    fn codes_in_use(&self) -> &IndexSet<String> {
        &self.codes_in_use
    }

    fn depends_on_fields(&self) -> &IndexSet<String> {
        &self.depends_on
    }
}

impl<K: Kind> fmt::Debug for TypedValidator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValidator")
            .field("kind", &K::NAME)
            .field("field", &self.field.as_str())
            .field("default_code", &self.default_code)
            .field("required", &self.required)
            .field("stop_all", &self.stop_all)
            .field("steps", &self.steps)
            .finish()
    }
}
