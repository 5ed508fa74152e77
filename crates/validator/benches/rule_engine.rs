//! Rule engine benchmarks: building rule sets and validating subjects.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rulegate_validator::prelude::*;
use serde_json::json;
use std::hint::black_box;

const RULES: &str = r#"{
    "rules": [
        ["user",       "OBJ", "REQ:USER_MISSING", "STOPALL"],
        ["user.name",  "STR", "REQ:NAME_MISSING", "HARDTRIM", "LEN:2-32:NAME_LENGTH"],
        ["user.age",   "INT", "RANGE:0|150:AGE_RANGE"],
        ["user.email", "STR", "REG:^[^@]+@[^@]+$:BAD_EMAIL", "MEX:user.phone:ONE_CONTACT"],
        ["user.role",  "STR", "IN:admin,editor,viewer:BAD_ROLE"],
        ["tags",       "SLICE", "LEN:-16:TOO_MANY_TAGS", "ELEM:tag"],
        ["terms",      "BOOL", "REQ:TERMS_MISSING", "IS:true:TERMS_REJECTED"]
    ],
    "shared": {"tag": ["STR", "TRIM", "LEN:1-24:TAG_LENGTH"]}
}"#;

fn subject() -> Value {
    Value::from(json!({
        "user": {"name": "  Ann  ", "age": 31, "email": "ann@example.com", "role": "editor"},
        "tags": ["alpha", "beta", "gamma", "delta"],
        "terms": true
    }))
}

// ============================================================================
// Build
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let builder = ValidatorBuilder::new();

    c.bench_function("rule_set_from_json", |b| {
        b.iter(|| {
            let rules = RuleSet::from_json(black_box(RULES), &builder, RuleSetConfig::default());
            black_box(rules)
        })
    });

    c.bench_function("parse_string_rule", |b| {
        b.iter(|| {
            let v = builder.parse_rule(
                black_box("name"),
                &["STR", "REQ:MISSING", "LEN:2-3:LENGTH", "BREAK", "IN:AA,BB:NOTIN"],
            );
            black_box(v)
        })
    });
}

// ============================================================================
// Validate
// ============================================================================

fn bench_validate(c: &mut Criterion) {
    let rules = RuleSet::from_json(RULES, &ValidatorBuilder::new(), RuleSetConfig::default())
        .expect("benchmark rules build");

    c.bench_function("validate_clean_subject", |b| {
        b.iter_batched(
            subject,
            |mut s| black_box(rules.validate(&mut s)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("validate_missing_user", |b| {
        b.iter_batched(
            || Value::from(json!({"terms": false})),
            |mut s| black_box(rules.validate(&mut s)),
            BatchSize::SmallInput,
        )
    });

    let name = rules.get("user.name").expect("user.name is configured");
    c.bench_function("validate_single_field", |b| {
        b.iter_batched(
            subject,
            |mut s| black_box(name.validate(&mut ValidationContext::new(&mut s))),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build, bench_validate);
criterion_main!(benches);
