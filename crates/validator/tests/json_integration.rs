//! Rule sets built from JSON rule sources, validating JSON subjects.

use pretty_assertions::assert_eq;
use rulegate_validator::prelude::*;
use serde_json::json;
use std::sync::Arc;

const RULES: &str = r#"{
    "rules": [
        ["user",         "OBJ", "REQ:USER_MISSING", "STOPALL"],
        ["user.name",    "STR", "REQ:NAME_MISSING", "HARDTRIM", "LEN:2-32:NAME_LENGTH"],
        ["user.age",     "INT", "RANGE:0|150:AGE_RANGE"],
        ["user.email",   "STR:BAD_EMAIL", "REG:^[^@]+@[^@]+$", "MEX:user.phone:ONE_CONTACT"],
        ["user.phone",   "STR", "EXT:digits:PHONE_FORMAT"],
        ["user.score",   "FLOAT", "RANGE:0|1:SCORE_RANGE"],
        ["tags",         "SLICE", "LEN:-3:TOO_MANY_TAGS", "ELEM:tag"],
        ["terms",        "BOOL", "REQ:TERMS_MISSING", "IS:true:TERMS_REJECTED"]
    ],
    "shared": {
        "tag": ["STR", "TRIM", "IN:red,green,blue:UNKNOWN_TAG"]
    }
}"#;

fn builder() -> ValidatorBuilder {
    let mut registry = ComponentRegistry::new();
    registry.register(
        "digits",
        StringPredicate(|s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())),
    );
    ValidatorBuilder::new().with_component_lookup(Arc::new(registry))
}

fn rules() -> RuleSet {
    RuleSet::from_json(RULES, &builder(), RuleSetConfig::default()).unwrap()
}

#[test]
fn clean_subject_passes() {
    let mut subject = Value::from(json!({
        "user": {"name": "  Ann  ", "age": 31, "email": "ann@example.com", "score": 0.5},
        "tags": ["red", " blue "],
        "terms": true
    }));

    let outcome = rules().validate(&mut subject).unwrap();
    assert!(outcome.is_valid(), "{:?}", outcome.failures().collect::<Vec<_>>());
    assert!(!outcome.stop_all());
    assert!(outcome.get("user.phone").unwrap().is_unset());

    // HARDTRIM wrote back; the element TRIM did not.
    assert_eq!(
        subject.to_json(),
        json!({
            "user": {"name": "Ann", "age": 31, "email": "ann@example.com", "score": 0.5},
            "tags": ["red", " blue "],
            "terms": true
        })
    );
}

#[test]
fn failing_subject_reports_every_field() {
    let mut subject = Value::from(json!({
        "user": {"name": " A ", "age": 200, "email": "nope", "phone": "12x", "score": 2},
        "tags": ["red", "pink", "teal", "blue"],
        "terms": false
    }));

    let outcome = rules().validate(&mut subject).unwrap();
    let failures: Vec<(&str, Vec<&str>)> = outcome
        .failures()
        .map(|(field, codes)| (field, codes.iter().map(String::as_str).collect()))
        .collect();

    assert_eq!(
        failures,
        vec![
            ("user.name", vec!["NAME_LENGTH"]),
            ("user.age", vec!["AGE_RANGE"]),
            ("user.email", vec!["BAD_EMAIL", "ONE_CONTACT"]),
            ("user.phone", vec!["PHONE_FORMAT"]),
            ("user.score", vec!["SCORE_RANGE"]),
            ("tags", vec!["TOO_MANY_TAGS", "UNKNOWN_TAG"]),
            ("terms", vec!["TERMS_REJECTED"]),
        ]
    );
}

#[test]
fn missing_user_signals_stop_all() {
    let mut subject = Value::from(json!({"terms": true}));
    let outcome = rules().validate(&mut subject).unwrap();

    assert!(outcome.stop_all());
    assert_eq!(outcome.stopped_by(), Some("user"));
    assert_eq!(outcome.codes("user"), Some(&["USER_MISSING".to_owned()][..]));
    assert_eq!(outcome.codes("user.name"), Some(&["NAME_MISSING".to_owned()][..]));
}

#[test]
fn halt_policy_stops_after_user() {
    let config = RuleSetConfig {
        stop_all: StopAllPolicy::Halt,
        ..RuleSetConfig::default()
    };
    let rules = RuleSet::from_json(RULES, &builder(), config).unwrap();
    let mut subject = Value::from(json!({"terms": true}));
    let outcome = rules.validate(&mut subject).unwrap();

    assert_eq!(outcome.results().len(), 1);
    assert_eq!(outcome.skipped().len(), rules.len() - 1);
}

#[test]
fn codes_in_use_are_discoverable() {
    let rules = rules();
    let codes = rules.codes_in_use();
    for code in ["USER_MISSING", "BAD_EMAIL", "ONE_CONTACT", "PHONE_FORMAT", "UNKNOWN_TAG"] {
        assert!(codes.contains(code), "{code} missing from {codes:?}");
    }
}

#[test]
fn external_component_must_exist() {
    let err = RuleSet::from_json(RULES, &ValidatorBuilder::new(), RuleSetConfig::default())
        .unwrap_err();
    assert!(matches!(err, BuildError::NoComponentLookup { ref field, .. } if field == "user.phone"));
}

#[test]
fn type_mismatch_in_subject_is_unexpected() {
    let mut subject = Value::from(json!({"user": {"name": "Ann", "age": "old"}, "terms": true}));
    let err = rules().validate(&mut subject).unwrap_err();
    assert_eq!(
        err,
        UnexpectedError::WrongKind {
            field: "user.age".into(),
            expected: "int",
            found: "string",
        }
    );
}

#[test]
fn shared_rule_set_across_threads() {
    let rules = rules();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let rules = &rules;
            scope.spawn(move || {
                let mut subject = Value::from(json!({
                    "user": {"name": format!("user{i}")},
                    "terms": i % 2 == 0
                }));
                let outcome = rules.validate(&mut subject).unwrap();
                assert_eq!(outcome.is_valid(), i % 2 == 0);
            });
        }
    });
}
