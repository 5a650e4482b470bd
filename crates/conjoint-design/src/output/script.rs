use conjoint_core::{Survey, validate_survey};

use crate::errors::DesignError;
use crate::model::DesignOptions;

/// Emit a self-contained Qualtrics JavaScript block that reproduces the
/// generation logic client-side.
///
/// The first line is a comment holding the survey definition as JSON so
/// the script can be re-imported later. The data tables are rendered in
/// attribute declaration order; the executable part below them is a fixed
/// template.
pub fn emit_script(survey: &Survey, options: &DesignOptions) -> Result<String, DesignError> {
    validate_survey(survey)?;

    let mut script = String::new();
    script.push_str(&format!("//{}\n", serde_json::to_string(survey)?));

    script.push_str("Qualtrics.SurveyEngine.addOnload(function() {\n\n");

    script.push_str(&format!(
        "var featurearray = {};\n\n",
        level_name_table(survey)?
    ));
    script.push_str(&format!(
        "var restrictionarray = {};\n\n",
        serde_json::to_string(&survey.restrictions)?
    ));
    script.push_str(&format!(
        "var crossrestrictionarray = {};\n\n",
        serde_json::to_string(&survey.cross_restrictions)?
    ));
    script.push_str(&format!(
        "var probabilityarray = {};\n\n",
        probability_table(survey)?
    ));

    script.push_str(&format!(
        "// Re-randomize the attribute order for every respondent?\nvar randomize = {};\n\n",
        survey.randomize
    ));
    script.push_str(&format!(
        "// Use level weights instead of uniform sampling?\nvar weighted = {};\n\n",
        survey.weighted
    ));
    script.push_str(&format!(
        "// K = number of tasks shown to the respondent.\nvar K = {};\n\n",
        survey.num_tasks
    ));
    script.push_str(&format!(
        "// N = number of profiles shown in each task.\nvar N = {};\n\n",
        survey.num_profiles
    ));
    script.push_str(&format!(
        "// Reject a profile identical to one already in the task?\nvar noDuplicateProfiles = {};\n\n",
        survey.no_duplicate_profiles()
    ));
    script.push_str(&format!(
        "// Attempt ceilings; exceeding one aborts instead of looping forever.\nvar maxProfileAttempts = {};\nvar maxTaskAttempts = {};\n\n",
        options.max_attempts_profile, options.max_attempts_task
    ));
    script.push_str(&format!(
        "var surveyAttributes = {};\n\n",
        serde_json::to_string(&survey.attributes)?
    ));

    script.push_str(GENERATION_TEMPLATE);

    if survey.repeated_tasks {
        script.push_str(&format!(
            "\n// Overwrite one task with a copy of another, optionally with the\n// profile order reversed.\nvar sourceTask = {};\nvar targetTask = {};\nvar flippedCopy = {};\n",
            survey.task_to_repeat, survey.where_to_repeat, survey.repeated_tasks_flipped
        ));
        script.push_str(REPEATED_TASK_TEMPLATE);
    }

    script.push_str(EMBEDDED_DATA_TEMPLATE);

    script.push_str("\n});\n\n");
    script.push_str("Qualtrics.SurveyEngine.addOnReady(function() {\n});\n\n");
    script.push_str("Qualtrics.SurveyEngine.addOnUnload(function() {\n});\n");

    Ok(script)
}

/// `{"attribute": ["level", ...], ...}` in declaration order. Built by
/// hand because `serde_json` maps do not preserve insertion order.
fn level_name_table(survey: &Survey) -> Result<String, serde_json::Error> {
    let mut parts = Vec::with_capacity(survey.attributes.len());
    for attribute in &survey.attributes {
        let names: Vec<&str> = attribute
            .levels
            .iter()
            .map(|level| level.name.as_str())
            .collect();
        parts.push(format!(
            "{}:{}",
            serde_json::to_string(&attribute.name)?,
            serde_json::to_string(&names)?
        ));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}

/// Per-attribute normalized level probabilities, in declaration order.
/// Empty when weighting is off; the template never reads it then.
fn probability_table(survey: &Survey) -> Result<String, serde_json::Error> {
    if !survey.weighted {
        return Ok("{}".to_string());
    }

    let mut parts = Vec::with_capacity(survey.attributes.len());
    for attribute in &survey.attributes {
        let total: f64 = attribute.levels.iter().map(|level| level.weight).sum();
        let normalized: Vec<f64> = attribute
            .levels
            .iter()
            .map(|level| level.weight / total)
            .collect();
        parts.push(format!(
            "{}:{}",
            serde_json::to_string(&attribute.name)?,
            serde_json::to_string(&normalized)?
        ));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}

const GENERATION_TEMPLATE: &str = r#"// Terminology:
//   task      = set of profiles shown together on one screen
//   profile   = one column of attribute levels within a task
//   attribute = named category with a set of levels

// In-place Durstenfeld shuffle.
function shuffleArray(array) {
    for (var i = array.length - 1; i > 0; i--) {
        var j = Math.floor(Math.random() * (i + 1));
        var swap = array[i];
        array[i] = array[j];
        array[j] = swap;
    }
    return array;
}

// Weighted selection over cumulative cutpoints. probList holds the
// normalized probabilities in level order; the chosen index is the last
// cutpoint at or below the draw.
function weightedRandomize(probList) {
    var cutpoints = [];
    var cumulative = 0.0;
    for (var i = 0; i < probList.length; i++) {
        cutpoints.push(cumulative);
        cumulative = cumulative + parseFloat(probList[i]);
    }
    var draw = Math.random();
    var chosen = 0;
    for (var k = 0; k < cutpoints.length; k++) {
        if (cutpoints[k] <= draw) {
            chosen = k;
        }
    }
    return chosen;
}

// Locked attributes keep their declared position; the rest are shuffled
// once per respondent into the remaining slots.
function buildAttributeOrder(attributes) {
    if (!randomize) {
        return attributes.map(function(attribute) { return attribute.name; });
    }
    var unlocked = [];
    for (var i = 0; i < attributes.length; i++) {
        if (!attributes[i].locked) {
            unlocked.push(attributes[i].name);
        }
    }
    shuffleArray(unlocked);
    var order = [];
    for (var j = 0; j < attributes.length; j++) {
        if (attributes[j].locked) {
            order.push(attributes[j].name);
        } else {
            order.push(unlocked.shift());
        }
    }
    return order;
}

function evaluateClause(profile, clause) {
    return (profile[clause.attribute] === clause.value) === (clause.operation === '==');
}

// Left fold with per-clause connectives, no precedence. A clause without
// a connective replaces the running result.
function evaluateCondition(profile, condition) {
    var result = null;
    for (var i = 0; i < condition.length; i++) {
        var clause = condition[i];
        var evaluation = evaluateClause(profile, clause);
        if (result === null || !clause.logical) {
            result = evaluation;
        } else if (clause.logical === '&&') {
            result = result && evaluation;
        } else {
            result = result || evaluation;
        }
    }
    return result === true;
}

function profileSatisfiesRestrictions(profile) {
    return restrictionarray.every(function(restriction) {
        if (!evaluateCondition(profile, restriction.condition)) {
            return true;
        }
        return restriction.result.every(function(clause) {
            return evaluateClause(profile, clause);
        });
    });
}

// A triggering profile needs some *other* profile in the task to satisfy
// the result clause; restrictions never triggered pass vacuously.
function taskSatisfiesCrossRestrictions(profiles) {
    return crossrestrictionarray.every(function(restriction) {
        var triggered = false;
        for (var i = 0; i < profiles.length; i++) {
            if (!evaluateClause(profiles[i], restriction.condition)) {
                continue;
            }
            triggered = true;
            for (var j = 0; j < profiles.length; j++) {
                if (i !== j && evaluateClause(profiles[j], restriction.result)) {
                    return true;
                }
            }
        }
        return !triggered;
    });
}

function isDuplicateProfile(profiles, candidate) {
    for (var i = 0; i < profiles.length; i++) {
        var identical = true;
        for (var attribute in candidate) {
            if (profiles[i][attribute] !== candidate[attribute]) {
                identical = false;
                break;
            }
        }
        if (identical) {
            return true;
        }
    }
    return false;
}

function sampleProfile(order) {
    for (var attempt = 0; attempt < maxProfileAttempts; attempt++) {
        var profile = {};
        for (var q = 0; q < order.length; q++) {
            var attributeName = order[q];
            var levels = featurearray[attributeName];
            var levelIndex = weighted
                ? weightedRandomize(probabilityarray[attributeName])
                : Math.floor(Math.random() * levels.length);
            profile[attributeName] = levels[levelIndex];
        }
        if (profileSatisfiesRestrictions(profile)) {
            return profile;
        }
    }
    throw new Error('no valid profile after ' + maxProfileAttempts + ' attempts');
}

function buildTask(order) {
    for (var attempt = 0; attempt < maxTaskAttempts; attempt++) {
        var profiles = [];
        var duplicateAttempts = 0;
        while (profiles.length < N) {
            var profile = sampleProfile(order);
            if (noDuplicateProfiles && isDuplicateProfile(profiles, profile)) {
                duplicateAttempts++;
                if (duplicateAttempts >= maxProfileAttempts) {
                    throw new Error('no non-duplicate profile after ' + maxProfileAttempts + ' attempts');
                }
                continue;
            }
            profiles.push(profile);
        }
        if (taskSatisfiesCrossRestrictions(profiles)) {
            return profiles;
        }
    }
    throw new Error('no valid task after ' + maxTaskAttempts + ' attempts');
}

// Result keys:
//   F-[task]-[attribute index]           -> attribute name
//   F-[task]-[profile]-[attribute index] -> chosen level
var attributeOrder = buildAttributeOrder(surveyAttributes);
var returnarray = {};
for (var task = 1; task <= K; task++) {
    var profiles = buildTask(attributeOrder);
    for (var q = 0; q < attributeOrder.length; q++) {
        returnarray['F-' + task + '-' + (q + 1)] = attributeOrder[q];
        for (var p = 1; p <= N; p++) {
            returnarray['F-' + task + '-' + p + '-' + (q + 1)] = profiles[p - 1][attributeOrder[q]];
        }
    }
}
"#;

const REPEATED_TASK_TEMPLATE: &str = r#"for (var q = 1; q <= attributeOrder.length; q++) {
    returnarray['F-' + targetTask + '-' + q] = returnarray['F-' + sourceTask + '-' + q];
    for (var p = 1; p <= N; p++) {
        var sourceProfile = flippedCopy ? (N - p + 1) : p;
        returnarray['F-' + targetTask + '-' + p + '-' + q] = returnarray['F-' + sourceTask + '-' + sourceProfile + '-' + q];
    }
}
"#;

const EMBEDDED_DATA_TEMPLATE: &str = r#"
var returnKeys = Object.keys(returnarray);
for (var r = 0; r < returnKeys.length; r++) {
    Qualtrics.SurveyEngine.setEmbeddedData(returnKeys[r], returnarray[returnKeys[r]]);
}
"#;

#[cfg(test)]
mod tests {
    use conjoint_core::{Attribute, Level};

    use super::*;

    fn survey() -> Survey {
        Survey {
            attributes: vec![
                Attribute {
                    name: "zeta".to_string(),
                    levels: vec![
                        Level {
                            name: "one".to_string(),
                            weight: 1.0,
                        },
                        Level {
                            name: "two".to_string(),
                            weight: 3.0,
                        },
                    ],
                    locked: false,
                },
                Attribute {
                    name: "alpha".to_string(),
                    levels: vec![Level {
                        name: "solo".to_string(),
                        weight: 2.0,
                    }],
                    locked: true,
                },
            ],
            restrictions: Vec::new(),
            cross_restrictions: Vec::new(),
            num_profiles: 2,
            num_tasks: 5,
            csv_lines: 10,
            randomize: true,
            weighted: true,
            fixed_profile: None,
            fixed_profile_position: 0,
            repeated_tasks: false,
            repeated_tasks_flipped: false,
            task_to_repeat: 1,
            where_to_repeat: 2,
        }
    }

    #[test]
    fn level_table_preserves_declaration_order() {
        let table = level_name_table(&survey()).unwrap();
        assert_eq!(table, r#"{"zeta":["one","two"],"alpha":["solo"]}"#);
    }

    #[test]
    fn probability_table_is_normalized() {
        let table = probability_table(&survey()).unwrap();
        assert_eq!(table, r#"{"zeta":[0.25,0.75],"alpha":[1.0]}"#);
    }

    #[test]
    fn probability_table_is_empty_without_weighting() {
        let mut unweighted = survey();
        unweighted.weighted = false;
        assert_eq!(probability_table(&unweighted).unwrap(), "{}");
    }
}
