//! Rule source as delivered by configuration.
//!
//! ```json
//! {
//!   "rules": [
//!     ["name", "STR", "REQ:NAME_MISSING", "HARDTRIM", "LEN:1-64:NAME_LENGTH"],
//!     ["tags", "SLICE", "ELEM:tag"]
//!   ],
//!   "shared": {
//!     "tag": ["STR", "REG:^[a-z]+$:TAG_FORMAT"]
//!   }
//! }
//! ```

use crate::error::BuildError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-field rule lines plus named shared rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSource {
    /// Rule lines: the field path followed by its clauses.
    pub rules: Vec<Vec<String>>,
    /// Rules referenced by name, e.g. from `ELEM`.
    pub shared: IndexMap<String, Vec<String>>,
}

/// A borrowed view of one rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleLine<'a> {
    /// Field path.
    pub field: &'a str,
    /// Clauses after the field.
    pub clauses: &'a [String],
}

impl RuleSource {
    /// Parses a JSON rule source.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds a rule line.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule<I, S>(mut self, field: &str, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut line = vec![field.to_owned()];
        line.extend(clauses.into_iter().map(Into::into));
        self.rules.push(line);
        self
    }

    /// Adds a shared rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared<I, S>(mut self, name: &str, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared
            .insert(name.to_owned(), clauses.into_iter().map(Into::into).collect());
        self
    }

    /// Splits every rule line into field and clauses.
    pub fn lines(&self) -> Result<Vec<RuleLine<'_>>, BuildError> {
        self.rules
            .iter()
            .enumerate()
            .map(|(line, rule)| match rule.split_first() {
                Some((field, clauses)) if !field.is_empty() => Ok(RuleLine {
                    field: field.as_str(),
                    clauses,
                }),
                _ => Err(BuildError::MissingField { line }),
            })
            .collect()
    }

    /// Looks up a shared rule.
    #[must_use]
    pub fn shared_rule(&self, name: &str) -> Option<&[String]> {
        self.shared.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_json_source() {
        let source = RuleSource::from_json(
            r#"{
                "rules": [["name", "STR", "REQ:MISSING"]],
                "shared": {"tag": ["STR", "LEN:1-"]}
            }"#,
        )
        .unwrap();

        let lines = source.lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].field, "name");
        assert_eq!(lines[0].clauses, ["STR", "REQ:MISSING"]);
        assert_eq!(source.shared_rule("tag").map(<[String]>::len), Some(2));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let source = RuleSource::from_json("{}").unwrap();
        assert!(source.rules.is_empty());
        assert!(source.shared.is_empty());
    }

    #[test]
    fn empty_line_is_rejected() {
        let source = RuleSource {
            rules: vec![vec!["a".into(), "STR".into()], vec![]],
            ..RuleSource::default()
        };
        assert!(matches!(source.lines(), Err(BuildError::MissingField { line: 1 })));
    }

    #[test]
    fn malformed_json_is_a_build_error() {
        assert!(matches!(
            RuleSource::from_json("{\"rules\": 3}"),
            Err(BuildError::Source(_))
        ));
    }

    #[test]
    fn builder_helpers() {
        let source = RuleSource::default()
            .with_rule("age", ["INT", "REQ"])
            .with_shared("pos", ["INT", "RANGE:1|"]);
        assert_eq!(source.rules, vec![vec!["age", "INT", "REQ"]]);
        assert!(source.shared_rule("pos").is_some());
    }
}
