use rulebook_model::{Findings, Issue, Registry, RowLocator, RuleDefinition, Severity, YearConfig};

fn rule(code: &str) -> RuleDefinition {
    RuleDefinition::builder(code, "learners")
        .message("Gender must be a recognised code")
        .field("gender")
        .severity(Severity::Warning)
        .check(|_, findings| {
            findings.report_rows([4usize, 1]);
            Ok(())
        })
        .build()
        .expect("rule")
}

#[test]
fn issue_serializes_rows_as_plain_integers() {
    let issue = Issue::new("2040", "learners", vec!["gender".to_string()], [4usize, 1]);
    let json = serde_json::to_value(&issue).expect("serialize issue");
    assert_eq!(
        json,
        serde_json::json!({
            "rule_code": "2040",
            "table": "learners",
            "fields": ["gender"],
            "rows": [4, 1],
        })
    );
}

#[test]
fn severity_serializes_lowercase() {
    let json = serde_json::to_string(&Severity::Warning).expect("serialize severity");
    assert_eq!(json, "\"warning\"");
}

#[test]
fn predicate_records_through_findings() {
    let rule = rule("2040");
    let data = rulebook_common::DataContainer::new();
    let mut findings = Findings::for_rule(&rule);
    rule.check(&data, &mut findings).expect("predicate");
    let issues = findings.into_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rows, vec![RowLocator(4), RowLocator(1)]);
}

#[test]
fn registries_share_definitions() {
    let mut builder = Registry::builder();
    builder.try_insert(rule("2040")).expect("insert");
    let base = builder.build();
    let delta = YearConfig::new().delete("2040");
    assert_eq!(delta.deleted().len(), 1);
    let copy = base.to_builder().build();
    assert_eq!(base, copy);
    assert!(std::sync::Arc::ptr_eq(
        base.get("2040").expect("base rule"),
        copy.get("2040").expect("copied rule"),
    ));
}
