use conjoint_core::Survey;
use conjoint_design::{DesignOptions, emit_script};

fn survey() -> Survey {
    serde_json::from_value(serde_json::json!({
        "attributes": [
            {"name": "color", "levels": [{"name": "red", "weight": 1.0}, {"name": "blue", "weight": 3.0}]},
            {"name": "size", "levels": [{"name": "small"}, {"name": "large"}], "locked": true}
        ],
        "restrictions": [{
            "condition": [{"attribute": "color", "operation": "==", "value": "red"}],
            "result": [{"attribute": "size", "operation": "!=", "value": "large"}]
        }],
        "cross_restrictions": [{
            "condition": {"attribute": "color", "operation": "==", "value": "red"},
            "result": {"attribute": "color", "operation": "==", "value": "blue"}
        }],
        "num_profiles": 2,
        "num_tasks": 7,
        "randomize": true,
        "random": true
    }))
    .expect("parse survey")
}

#[test]
fn first_line_is_a_reimportable_survey_comment() {
    let script = emit_script(&survey(), &DesignOptions::default()).expect("emit");

    let first_line = script.lines().next().expect("first line");
    assert!(first_line.starts_with("//"));

    let reimported: Survey =
        serde_json::from_str(&first_line[2..]).expect("parse embedded survey");
    assert_eq!(reimported.attributes.len(), 2);
    assert_eq!(reimported.num_tasks, 7);
    assert!(reimported.weighted);
}

#[test]
fn data_tables_match_the_survey() {
    let script = emit_script(&survey(), &DesignOptions::default()).expect("emit");

    assert!(script.contains(r#"var featurearray = {"color":["red","blue"],"size":["small","large"]};"#));
    assert!(script.contains(r#"var probabilityarray = {"color":[0.25,0.75],"size":[0.5,0.5]};"#));
    assert!(script.contains("var K = 7;"));
    assert!(script.contains("var N = 2;"));
    assert!(script.contains("var randomize = true;"));
    assert!(script.contains("var weighted = true;"));
    assert!(script.contains("var noDuplicateProfiles = true;"));
    assert!(script.contains("var maxProfileAttempts = 1000;"));
    assert!(script.contains("var maxTaskAttempts = 100;"));
    assert!(script.contains(r#""attribute":"color","operation":"==","value":"red""#));
    assert!(script.contains(r#""locked":true"#));
}

#[test]
fn template_carries_the_generation_logic() {
    let script = emit_script(&survey(), &DesignOptions::default()).expect("emit");

    for marker in [
        "Qualtrics.SurveyEngine.addOnload(function() {",
        "function shuffleArray(",
        "function weightedRandomize(",
        "function buildAttributeOrder(",
        "function evaluateCondition(",
        "function taskSatisfiesCrossRestrictions(",
        "function buildTask(",
        "Qualtrics.SurveyEngine.setEmbeddedData(",
        "Qualtrics.SurveyEngine.addOnReady(function() {",
        "Qualtrics.SurveyEngine.addOnUnload(function() {",
    ] {
        assert!(script.contains(marker), "missing template marker: {marker}");
    }
}

#[test]
fn repeated_task_block_is_emitted_only_when_enabled() {
    let without = emit_script(&survey(), &DesignOptions::default()).expect("emit");
    assert!(!without.contains("var sourceTask"));

    let mut repeated = survey();
    repeated.repeated_tasks = true;
    repeated.repeated_tasks_flipped = true;
    repeated.task_to_repeat = 1;
    repeated.where_to_repeat = 5;

    let with = emit_script(&repeated, &DesignOptions::default()).expect("emit");
    assert!(with.contains("var sourceTask = 1;"));
    assert!(with.contains("var targetTask = 5;"));
    assert!(with.contains("var flippedCopy = true;"));
    // Repeating a task implies duplicates are allowed within it.
    assert!(with.contains("var noDuplicateProfiles = false;"));
}

#[test]
fn attempt_ceilings_come_from_the_options() {
    let options = DesignOptions {
        seed: None,
        max_attempts_profile: 25,
        max_attempts_task: 4,
    };
    let script = emit_script(&survey(), &options).expect("emit");
    assert!(script.contains("var maxProfileAttempts = 25;"));
    assert!(script.contains("var maxTaskAttempts = 4;"));
}
