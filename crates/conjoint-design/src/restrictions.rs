use conjoint_core::{Clause, CompareOp, CrossRestriction, LogicalOp, Restriction};

use crate::model::Profile;

fn holds(profile: &Profile, attribute: &str, operation: CompareOp, value: &str) -> bool {
    let actual = profile.level_of(attribute);
    match operation {
        CompareOp::Eq => actual == Some(value),
        CompareOp::Ne => actual != Some(value),
    }
}

fn clause_holds(profile: &Profile, clause: &Clause) -> bool {
    holds(profile, &clause.attribute, clause.operation, &clause.value)
}

/// Left fold over condition clauses, no precedence or grouping.
///
/// The first clause seeds the accumulator; each later clause combines via
/// its own connective. A later clause with no connective replaces the
/// accumulator outright. Restriction data in the field depends on these
/// exact semantics, so they are preserved as-is.
pub fn evaluate_condition(profile: &Profile, condition: &[conjoint_core::ConditionClause]) -> bool {
    let mut accumulator: Option<bool> = None;
    for clause in condition {
        let evaluation = holds(profile, &clause.attribute, clause.operation, &clause.value);
        accumulator = Some(match (clause.logical, accumulator) {
            (Some(LogicalOp::And), Some(current)) => current && evaluation,
            (Some(LogicalOp::Or), Some(current)) => current || evaluation,
            _ => evaluation,
        });
    }
    accumulator.unwrap_or(false)
}

fn evaluate_result(profile: &Profile, result: &[Clause]) -> bool {
    result.iter().all(|clause| clause_holds(profile, clause))
}

/// A restriction is satisfied when its condition does not hold, or when it
/// holds and every result clause holds as well.
pub fn restriction_satisfied(profile: &Profile, restriction: &Restriction) -> bool {
    if evaluate_condition(profile, &restriction.condition) {
        evaluate_result(profile, &restriction.result)
    } else {
        true
    }
}

pub fn profile_satisfies(profile: &Profile, restrictions: &[Restriction]) -> bool {
    restrictions
        .iter()
        .all(|restriction| restriction_satisfied(profile, restriction))
}

/// Existence check over ordered profile pairs: if any profile triggers the
/// condition, some *other* profile must satisfy the result. A restriction
/// whose condition never triggers is vacuously satisfied. This is
/// intentionally existential, not universal over all pairs.
pub fn cross_restriction_satisfied(profiles: &[Profile], restriction: &CrossRestriction) -> bool {
    let mut triggered = false;
    for (i, candidate) in profiles.iter().enumerate() {
        if !clause_holds(candidate, &restriction.condition) {
            continue;
        }
        triggered = true;
        for (j, other) in profiles.iter().enumerate() {
            if i != j && clause_holds(other, &restriction.result) {
                return true;
            }
        }
    }
    !triggered
}

pub fn task_satisfies_cross(profiles: &[Profile], cross: &[CrossRestriction]) -> bool {
    cross
        .iter()
        .all(|restriction| cross_restriction_satisfied(profiles, restriction))
}
