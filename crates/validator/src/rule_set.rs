//! Rule set orchestration.
//!
//! A [`RuleSet`] owns every validator for one subject type. Evaluation order
//! is fixed when the set is built: a validator runs after the validators of
//! its parent paths (`a` and `a.b` before `a.b.c`). Among the validators
//! whose dependencies have all run, the earliest declared goes next, so a
//! dependency-free field declared before a parent also runs before it.
//! Dependencies on fields without a validator of their own do not constrain
//! anything. `MEX` fields are read from the subject and never order.
//!
//! # Examples
//!
//! ```
//! use rulegate_validator::prelude::*;
//!
//! let source = RuleSource::default()
//!     .with_rule("user", ["OBJ", "REQ:USER_MISSING", "STOPALL"])
//!     .with_rule("user.name", ["STR", "REQ:NAME_MISSING", "LEN:2-:NAME_SHORT"]);
//!
//! let rules = RuleSet::from_source(&source, &ValidatorBuilder::new(), RuleSetConfig::default())
//!     .unwrap();
//!
//! let mut subject = Value::from(serde_json::json!({"user": {"name": "A"}}));
//! let outcome = rules.validate(&mut subject).unwrap();
//! assert_eq!(outcome.codes("user.name"), Some(&["NAME_SHORT".to_string()][..]));
//! assert!(!outcome.stop_all());
//! ```

use crate::builder::{Validator, ValidatorBuilder};
use crate::config::{DependencyPolicy, RuleSetConfig, StopAllPolicy};
use crate::error::{BuildError, UnexpectedError};
use crate::rule::RuleSource;
use crate::runtime::{Validate, ValidationContext, ValidationResult};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

// ============================================================================
// RULE SET
// ============================================================================

/// Validators for one subject type, in evaluation order.
#[derive(Debug)]
pub struct RuleSet {
    validators: Vec<Validator>,
    config: RuleSetConfig,
}

impl RuleSet {
    /// Orders `validators` by their dependencies.
    ///
    /// Fails if two validators share a field or dependencies form a cycle.
    pub fn new(validators: Vec<Validator>, config: RuleSetConfig) -> Result<Self, BuildError> {
        let order = {
            let nodes: Vec<(&str, &IndexSet<String>)> = validators
                .iter()
                .map(|v| (v.field().as_str(), v.depends_on_fields()))
                .collect();
            dependency_order(&nodes)?
        };

        let mut slots: Vec<Option<Validator>> = validators.into_iter().map(Some).collect();
        let validators: Vec<Validator> = order
            .into_iter()
            .filter_map(|position| slots[position].take())
            .collect();

        tracing::debug!(
            fields = validators.len(),
            stop_all = ?config.stop_all,
            dependencies = ?config.dependencies,
            "built rule set"
        );

        Ok(Self { validators, config })
    }

    /// Builds every rule line of `source`, making its shared rules available
    /// to `ELEM` clauses.
    pub fn from_source(
        source: &RuleSource,
        builder: &ValidatorBuilder,
        config: RuleSetConfig,
    ) -> Result<Self, BuildError> {
        let builder = builder.clone().with_shared_rules(source.shared.clone());
        let validators = source
            .lines()?
            .into_iter()
            .map(|line| builder.parse_rule(line.field, line.clauses))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(validators, config)
    }

    /// Parses a JSON rule source and builds it.
    pub fn from_json(json: &str, builder: &ValidatorBuilder, config: RuleSetConfig) -> Result<Self, BuildError> {
        Self::from_source(&RuleSource::from_json(json)?, builder, config)
    }

    /// Fields in evaluation order.
    pub fn evaluation_order(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|v| v.field().as_str())
    }

    /// The validator for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Validator> {
        self.validators.iter().find(|v| v.field().as_str() == field)
    }

    /// Every code any validator can emit.
    #[must_use]
    pub fn codes_in_use(&self) -> IndexSet<&str> {
        self.validators
            .iter()
            .flat_map(|v| v.codes_in_use().iter().map(String::as_str))
            .collect()
    }

    /// Number of validated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if the set has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// The orchestration policies.
    #[must_use]
    pub const fn config(&self) -> &RuleSetConfig {
        &self.config
    }

    /// Validates every field of `subject`.
    ///
    /// Validation failures end up in the [`Outcome`]. An [`UnexpectedError`]
    /// aborts the whole subject.
    pub fn validate(&self, subject: &mut Value) -> Result<Outcome, UnexpectedError> {
        let mut ctx = ValidationContext::new(subject);
        let mut outcome = Outcome::default();
        let mut failed: HashSet<&str> = HashSet::new();

        for v in &self.validators {
            let field = v.field().as_str();

            if outcome.stop_all && self.config.stop_all == StopAllPolicy::Halt {
                tracing::warn!(field, stopped_by = ?outcome.stopped_by, "skipping field after stop-all");
                outcome.skipped.push(field.to_owned());
                continue;
            }

            if self.config.dependencies == DependencyPolicy::SkipOnFailure
                && let Some(dependency) = v
                    .depends_on_fields()
                    .iter()
                    .find(|d| failed.contains(d.as_str()))
            {
                tracing::warn!(field, dependency = dependency.as_str(), "skipping field after failed dependency");
                outcome.skipped.push(field.to_owned());
                failed.insert(field);
                continue;
            }

            let result = v.validate(&mut ctx).inspect_err(|e| {
                tracing::error!(field, error = %e, "unexpected error while validating subject");
            })?;

            tracing::trace!(field, unset = result.is_unset(), codes = ?result.codes(), "field validated");

            if !result.is_valid() {
                failed.insert(field);
                if v.stop_all_on_fail() && !outcome.stop_all {
                    outcome.stop_all = true;
                    outcome.stopped_by = Some(field.to_owned());
                }
            }
            outcome.results.insert(field.to_owned(), result);
        }

        Ok(outcome)
    }
}

/// Orders `(field, dependencies)` pairs, returning positions into `nodes`.
///
/// Dependencies on fields that are not in `nodes` are ignored.
fn dependency_order(nodes: &[(&str, &IndexSet<String>)]) -> Result<Vec<usize>, BuildError> {
    let mut index: IndexMap<&str, NodeIndex> = IndexMap::with_capacity(nodes.len());
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), 0);

    for (line, &(field, _)) in nodes.iter().enumerate() {
        if index.contains_key(field) {
            return Err(BuildError::DuplicateField {
                field: field.to_owned(),
                line,
            });
        }
        index.insert(field, graph.add_node(line));
    }

    for (line, (_, dependencies)) in nodes.iter().enumerate() {
        let to = NodeIndex::new(line);
        for dependency in *dependencies {
            if let Some(&from) = index.get(dependency.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    algo::toposort(&graph, None).map_err(|cycle| {
        let line = graph[cycle.node_id()];
        BuildError::DependencyCycle {
            field: nodes[line].0.to_owned(),
            line,
        }
    })?;

    Ok(declaration_ordered_sort(&graph))
}

/// Kahn's algorithm, always releasing the earliest declared ready node.
fn declaration_ordered_sort(graph: &DiGraph<usize, ()>) -> Vec<usize> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.neighbors_directed(idx, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .map(|idx| Reverse(graph[idx]))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(position)) = ready.pop() {
        order.push(position);
        for next in graph.neighbors_directed(NodeIndex::new(position), Direction::Outgoing) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(graph[next]));
            }
        }
    }
    order
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Combined result of validating one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    results: IndexMap<String, ValidationResult>,
    stop_all: bool,
    stopped_by: Option<String>,
    skipped: Vec<String>,
}

impl Outcome {
    /// Per-field results in evaluation order. Skipped fields are absent.
    #[must_use]
    pub fn results(&self) -> &IndexMap<String, ValidationResult> {
        &self.results
    }

    /// The result for `field`, if it was evaluated.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ValidationResult> {
        self.results.get(field)
    }

    /// The codes raised for `field`, if it was evaluated.
    #[must_use]
    pub fn codes(&self, field: &str) -> Option<&[String]> {
        self.results.get(field).map(ValidationResult::codes)
    }

    /// Fields that raised codes, with their codes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.results
            .iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(f, r)| (f.as_str(), r.codes()))
    }

    /// Returns `true` if no evaluated field raised a code.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.values().all(ValidationResult::is_valid)
    }

    /// Whether a `STOPALL` validator failed.
    #[must_use]
    pub const fn stop_all(&self) -> bool {
        self.stop_all
    }

    /// The first `STOPALL` field that failed.
    #[must_use]
    pub fn stopped_by(&self) -> Option<&str> {
        self.stopped_by.as_deref()
    }

    /// Fields not evaluated because of a policy.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn empty() -> Value {
        Value::Object(IndexMap::new())
    }

    fn rule_set(source: RuleSource, config: RuleSetConfig) -> Result<RuleSet, BuildError> {
        RuleSet::from_source(&source, &ValidatorBuilder::new(), config)
    }

    #[test]
    fn declaration_order_without_dependencies() {
        let rules = rule_set(
            RuleSource::default()
                .with_rule("b", ["STR"])
                .with_rule("a", ["STR"])
                .with_rule("c", ["STR"]),
            RuleSetConfig::default(),
        )
        .unwrap();
        assert_eq!(rules.evaluation_order().collect::<Vec<_>>(), ["b", "a", "c"]);
    }

    #[test]
    fn dependencies_run_first() {
        let rules = rule_set(
            RuleSource::default()
                .with_rule("user.name", ["STR"])
                .with_rule("email", ["STR", "MEX:phone"])
                .with_rule("phone", ["STR"])
                .with_rule("user", ["OBJ"]),
            RuleSetConfig::default(),
        )
        .unwrap();
        assert_eq!(
            rules.evaluation_order().collect::<Vec<_>>(),
            ["email", "phone", "user", "user.name"]
        );
    }

    fn deps(fields: &[&str]) -> IndexSet<String> {
        fields.iter().map(|f| (*f).to_owned()).collect()
    }

    #[test]
    fn earliest_ready_field_goes_next() {
        let (x, y, z) = (deps(&["z"]), deps(&[]), deps(&["missing"]));
        let order = dependency_order(&[("x", &x), ("y", &y), ("z", &z)]).unwrap();
        assert_eq!(order, [1, 2, 0]);
    }

    #[test]
    fn cycles_are_rejected() {
        let (a, b, c) = (deps(&["b"]), deps(&["a"]), deps(&[]));
        let err = dependency_order(&[("c", &c), ("a", &a), ("b", &b)]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::DependencyCycle { ref field, line }
                if (field == "a" && line == 1) || (field == "b" && line == 2)
        ));
    }

    #[test]
    fn symmetric_mutual_exclusion_builds() {
        let config = RuleSetConfig {
            dependencies: DependencyPolicy::SkipOnFailure,
            ..RuleSetConfig::default()
        };
        let rules = rule_set(
            RuleSource::default()
                .with_rule("email", ["STR", "LEN:5-:EMAIL_SHORT", "MEX:phone:ONE_CONTACT"])
                .with_rule("phone", ["STR", "MEX:email:ONE_CONTACT"]),
            config,
        )
        .unwrap();
        assert_eq!(rules.evaluation_order().collect::<Vec<_>>(), ["email", "phone"]);

        let mut subject = Value::object([("email", Value::from("a@b")), ("phone", Value::from("555"))]);
        let outcome = rules.validate(&mut subject).unwrap();
        assert_eq!(
            outcome.codes("email"),
            Some(&["EMAIL_SHORT".to_owned(), "ONE_CONTACT".to_owned()][..])
        );
        assert_eq!(outcome.codes("phone"), Some(&["ONE_CONTACT".to_owned()][..]));
        assert!(outcome.skipped().is_empty());
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = rule_set(
            RuleSource::default()
                .with_rule("a", ["STR"])
                .with_rule("b", ["STR"])
                .with_rule("a", ["INT"]),
            RuleSetConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateField { ref field, line } if field == "a" && line == 2));
    }

    fn stop_all_source() -> RuleSource {
        RuleSource::default()
            .with_rule("token", ["STR", "REQ:NO_TOKEN", "STOPALL"])
            .with_rule("name", ["STR", "REQ:NO_NAME"])
    }

    #[test]
    fn stop_all_signals_by_default() {
        let rules = rule_set(stop_all_source(), RuleSetConfig::default()).unwrap();
        let outcome = rules.validate(&mut empty()).unwrap();

        assert!(outcome.stop_all());
        assert_eq!(outcome.stopped_by(), Some("token"));
        assert_eq!(outcome.codes("name"), Some(&["NO_NAME".to_owned()][..]));
        assert!(outcome.skipped().is_empty());
    }

    #[test]
    fn stop_all_halt_skips_the_rest() {
        let config = RuleSetConfig {
            stop_all: StopAllPolicy::Halt,
            ..RuleSetConfig::default()
        };
        let rules = rule_set(stop_all_source(), config).unwrap();
        let outcome = rules.validate(&mut empty()).unwrap();

        assert!(outcome.stop_all());
        assert_eq!(outcome.skipped(), ["name"]);
        assert!(outcome.get("name").is_none());
    }

    #[test]
    fn skip_on_failure_is_transitive_through_skips() {
        let config = RuleSetConfig {
            dependencies: DependencyPolicy::SkipOnFailure,
            ..RuleSetConfig::default()
        };
        let rules = rule_set(
            RuleSource::default()
                .with_rule("a", ["OBJ", "REQ:A_MISSING"])
                .with_rule("a.b", ["OBJ"])
                .with_rule("a.b.c", ["STR", "REQ:C_MISSING"])
                .with_rule("d", ["STR", "REQ:D_MISSING"]),
            config,
        )
        .unwrap();

        let outcome = rules.validate(&mut empty()).unwrap();
        assert_eq!(outcome.skipped(), ["a.b", "a.b.c"]);
        assert_eq!(
            outcome.failures().collect::<Vec<_>>(),
            [("a", &["A_MISSING".to_owned()][..]), ("d", &["D_MISSING".to_owned()][..])]
        );
    }

    #[test]
    fn unexpected_error_aborts() {
        let rules = rule_set(
            RuleSource::default().with_rule("age", ["INT"]),
            RuleSetConfig::default(),
        )
        .unwrap();
        let mut subject = Value::object([("age", Value::from("ten"))]);
        assert!(matches!(
            rules.validate(&mut subject),
            Err(UnexpectedError::WrongKind { .. })
        ));
    }

    #[test]
    fn aggregated_codes_in_use() {
        let rules = rule_set(stop_all_source(), RuleSetConfig::default()).unwrap();
        let codes: Vec<&str> = rules.codes_in_use().into_iter().collect();
        assert_eq!(codes, ["INVALID", "NO_TOKEN", "NO_NAME"]);
    }
}
