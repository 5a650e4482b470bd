use conjoint_core::{validate_survey, CompareOp, LogicalOp, Survey};

fn survey_json() -> serde_json::Value {
    serde_json::json!({
        "attributes": [
            {
                "name": "color",
                "levels": [
                    {"name": "red"},
                    {"name": "blue", "weight": 2.0}
                ]
            },
            {
                "name": "size",
                "levels": [
                    {"name": "small", "weight": 1.0},
                    {"name": "large", "weight": 1.0}
                ],
                "locked": true
            }
        ],
        "restrictions": [
            {
                "condition": [
                    {"attribute": "color", "operation": "==", "value": "red"},
                    {"attribute": "size", "operation": "!=", "value": "small", "logical": "&&"}
                ],
                "result": [
                    {"attribute": "size", "operation": "!=", "value": "large"}
                ]
            }
        ],
        "cross_restrictions": [],
        "num_profiles": 2,
        "num_tasks": 3,
        "random": true
    })
}

#[test]
fn parses_survey_with_defaults() {
    let survey: Survey = serde_json::from_value(survey_json()).expect("parse survey");

    assert_eq!(survey.attributes.len(), 2);
    assert_eq!(survey.attributes[0].levels[0].weight, 1.0);
    assert_eq!(survey.attributes[0].levels[1].weight, 2.0);
    assert!(survey.attributes[1].locked);
    assert_eq!(survey.csv_lines, 500);
    assert!(survey.weighted, "legacy 'random' alias maps to weighted");
    assert!(!survey.repeated_tasks);
    assert!(survey.no_duplicate_profiles());

    let clause = &survey.restrictions[0].condition[1];
    assert_eq!(clause.operation, CompareOp::Ne);
    assert_eq!(clause.logical, Some(LogicalOp::And));

    validate_survey(&survey).expect("survey validates");
}

#[test]
fn rejects_unknown_operation_strings() {
    let mut json = survey_json();
    json["restrictions"][0]["condition"][0]["operation"] = serde_json::json!(">=");
    let parsed: Result<Survey, _> = serde_json::from_value(json);
    assert!(parsed.is_err(), "unsupported operator must fail fast");
}

#[test]
fn rejects_empty_levels() {
    let mut json = survey_json();
    json["attributes"][0]["levels"] = serde_json::json!([]);
    let survey: Survey = serde_json::from_value(json).expect("parse survey");
    let err = validate_survey(&survey).expect_err("empty levels are fatal");
    assert!(err.to_string().contains("no levels"));
}

#[test]
fn rejects_unknown_restriction_attribute() {
    let mut json = survey_json();
    json["restrictions"][0]["result"][0]["attribute"] = serde_json::json!("price");
    let survey: Survey = serde_json::from_value(json).expect("parse survey");
    let err = validate_survey(&survey).expect_err("unknown attribute is fatal");
    assert!(err.to_string().contains("price"));
}

#[test]
fn rejects_incomplete_fixed_profile() {
    let mut json = survey_json();
    json["fixed_profile"] = serde_json::json!({"color": "red"});
    let survey: Survey = serde_json::from_value(json).expect("parse survey");
    let err = validate_survey(&survey).expect_err("fixed profile must cover attributes");
    assert!(err.to_string().contains("size"));
}
