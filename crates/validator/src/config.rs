//! Builder and orchestrator configuration.

use crate::rule::RuleType;
use serde::{Deserialize, Serialize};

/// Error code used when neither the clause nor the rule line names one.
pub const DEFAULT_ERROR_CODE: &str = "INVALID";

/// Validator builder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Default error code per kind
    pub default_codes: DefaultCodes,
}

/// Default error codes, one per kind.
///
/// A rule line can override these with `TYPE:CODE`, e.g. `STR:BAD_NAME`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCodes {
    /// `BOOL` rules
    pub bool: String,
    /// `INT` rules
    pub int: String,
    /// `FLOAT` rules
    pub float: String,
    /// `STR` rules
    pub string: String,
    /// `SLICE` rules
    pub slice: String,
    /// `OBJ` rules
    pub object: String,
}

impl Default for DefaultCodes {
    fn default() -> Self {
        Self::uniform(DEFAULT_ERROR_CODE)
    }
}

impl DefaultCodes {
    /// The same code for every kind.
    #[must_use]
    pub fn uniform(code: &str) -> Self {
        Self {
            bool: code.to_owned(),
            int: code.to_owned(),
            float: code.to_owned(),
            string: code.to_owned(),
            slice: code.to_owned(),
            object: code.to_owned(),
        }
    }

    /// The code configured for `rule_type`.
    #[must_use]
    pub fn for_type(&self, rule_type: RuleType) -> &str {
        match rule_type {
            RuleType::Bool => &self.bool,
            RuleType::Int => &self.int,
            RuleType::Float => &self.float,
            RuleType::String => &self.string,
            RuleType::Slice => &self.slice,
            RuleType::Object => &self.object,
        }
    }
}

/// Rule set orchestration policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetConfig {
    /// What happens after a `STOPALL` validator fails
    pub stop_all: StopAllPolicy,
    /// What a failed dependency means for its dependents
    pub dependencies: DependencyPolicy,
}

/// Reaction to a failing `STOPALL` validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopAllPolicy {
    /// Evaluate every field and report the stop signal in the outcome.
    #[default]
    Signal,
    /// Skip every field not evaluated yet.
    Halt,
}

/// Meaning of a validator's declared dependencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPolicy {
    /// Dependencies only order evaluation.
    #[default]
    OrderOnly,
    /// Skip a validator if a dependency raised codes or was skipped.
    SkipOnFailure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_from_empty_json() {
        let config: RuleSetConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RuleSetConfig::default());
        assert_eq!(config.stop_all, StopAllPolicy::Signal);
        assert_eq!(config.dependencies, DependencyPolicy::OrderOnly);
    }

    #[test]
    fn partial_default_codes() {
        let config: BuilderConfig =
            serde_json::from_str(r#"{"default_codes": {"string": "BAD_TEXT"}}"#).unwrap();
        assert_eq!(config.default_codes.for_type(RuleType::String), "BAD_TEXT");
        assert_eq!(config.default_codes.for_type(RuleType::Int), DEFAULT_ERROR_CODE);
    }

    #[test]
    fn policies_use_snake_case() {
        let config: RuleSetConfig =
            serde_json::from_str(r#"{"stop_all": "halt", "dependencies": "skip_on_failure"}"#)
                .unwrap();
        assert_eq!(config.stop_all, StopAllPolicy::Halt);
        assert_eq!(config.dependencies, DependencyPolicy::SkipOnFailure);
    }
}
