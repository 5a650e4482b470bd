use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::restrictions::Clause;
use crate::survey::Survey;

/// Validate internal consistency of a survey definition.
///
/// This checks:
/// - nonempty attribute list, unique attribute names
/// - nonempty level lists, unique level names, usable weights
/// - restriction clauses referencing known attributes
/// - fixed-profile coverage and position bounds
/// - repeated-task indices
pub fn validate_survey(survey: &Survey) -> Result<()> {
    if survey.attributes.is_empty() {
        return Err(Error::InvalidSurvey(
            "survey has no attributes".to_string(),
        ));
    }

    let mut names = BTreeSet::new();
    for attribute in &survey.attributes {
        if attribute.name.is_empty() {
            return Err(Error::InvalidSurvey(
                "attribute with empty name".to_string(),
            ));
        }
        if !names.insert(attribute.name.as_str()) {
            return Err(Error::InvalidSurvey(format!(
                "duplicate attribute name: {}",
                attribute.name
            )));
        }

        if attribute.levels.is_empty() {
            return Err(Error::InvalidSurvey(format!(
                "attribute '{}' has no levels",
                attribute.name
            )));
        }

        let mut level_names = BTreeSet::new();
        let mut total_weight = 0.0_f64;
        for level in &attribute.levels {
            if !level_names.insert(level.name.as_str()) {
                return Err(Error::InvalidSurvey(format!(
                    "duplicate level name: {}.{}",
                    attribute.name, level.name
                )));
            }
            if !level.weight.is_finite() || level.weight < 0.0 {
                return Err(Error::InvalidSurvey(format!(
                    "level '{}.{}' has invalid weight {}",
                    attribute.name, level.name, level.weight
                )));
            }
            total_weight += level.weight;
        }
        if total_weight <= 0.0 {
            return Err(Error::InvalidSurvey(format!(
                "attribute '{}' has zero total weight",
                attribute.name
            )));
        }
    }

    if survey.num_profiles < 2 {
        return Err(Error::InvalidSurvey(format!(
            "num_profiles must be at least 2, got {}",
            survey.num_profiles
        )));
    }
    if survey.num_tasks < 1 {
        return Err(Error::InvalidSurvey("num_tasks must be at least 1".to_string()));
    }
    if survey.csv_lines < 1 {
        return Err(Error::InvalidSurvey("csv_lines must be at least 1".to_string()));
    }

    for (index, restriction) in survey.restrictions.iter().enumerate() {
        if restriction.condition.is_empty() {
            return Err(Error::InvalidSurvey(format!(
                "restriction {index} has an empty condition"
            )));
        }
        if restriction.result.is_empty() {
            return Err(Error::InvalidSurvey(format!(
                "restriction {index} has an empty result"
            )));
        }
        for clause in &restriction.condition {
            check_attribute_ref(&names, &clause.attribute, "restriction condition")?;
        }
        for clause in &restriction.result {
            check_clause(&names, clause, "restriction result")?;
        }
    }

    for cross in &survey.cross_restrictions {
        check_clause(&names, &cross.condition, "cross-restriction condition")?;
        check_clause(&names, &cross.result, "cross-restriction result")?;
    }

    if let Some(fixed) = &survey.fixed_profile {
        for attribute in &survey.attributes {
            if !fixed.contains_key(&attribute.name) {
                return Err(Error::InvalidSurvey(format!(
                    "fixed profile is missing attribute '{}'",
                    attribute.name
                )));
            }
        }
        if survey.fixed_profile_position >= survey.num_profiles {
            return Err(Error::InvalidSurvey(format!(
                "fixed_profile_position {} out of range for {} profiles",
                survey.fixed_profile_position, survey.num_profiles
            )));
        }
    }

    if survey.repeated_tasks {
        for (field, value) in [
            ("task_to_repeat", survey.task_to_repeat),
            ("where_to_repeat", survey.where_to_repeat),
        ] {
            if value < 1 || value > survey.num_tasks {
                return Err(Error::InvalidSurvey(format!(
                    "{field} {value} out of range for {} tasks",
                    survey.num_tasks
                )));
            }
        }
        if survey.task_to_repeat == survey.where_to_repeat {
            return Err(Error::InvalidSurvey(
                "task_to_repeat and where_to_repeat must differ".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_attribute_ref(names: &BTreeSet<&str>, attribute: &str, context: &str) -> Result<()> {
    if !names.contains(attribute) {
        return Err(Error::InvalidSurvey(format!(
            "{context} references unknown attribute '{attribute}'"
        )));
    }
    Ok(())
}

fn check_clause(names: &BTreeSet<&str>, clause: &Clause, context: &str) -> Result<()> {
    check_attribute_ref(names, &clause.attribute, context)
}
