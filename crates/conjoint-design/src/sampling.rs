use rand::Rng;
use rand::seq::SliceRandom;

use conjoint_core::{Attribute, Survey};

use crate::model::{Profile, ProfileEntry};

/// Compute the display order for a design batch as a permutation of
/// attribute indices.
///
/// Locked attributes keep their declared index; unlocked attributes are
/// shuffled once and fill the remaining slots in order. The order is a
/// property of the instrument, not of each draw, so callers compute it
/// once per generation call.
pub fn attribute_order(attributes: &[Attribute], randomize: bool, rng: &mut impl Rng) -> Vec<usize> {
    if !randomize {
        return (0..attributes.len()).collect();
    }

    let mut unlocked: Vec<usize> = Vec::new();
    let mut slots: Vec<Option<usize>> = vec![None; attributes.len()];
    for (index, attribute) in attributes.iter().enumerate() {
        if attribute.locked {
            slots[index] = Some(index);
        } else {
            unlocked.push(index);
        }
    }

    unlocked.shuffle(rng);

    let mut next = unlocked.into_iter();
    slots
        .into_iter()
        .map(|slot| match slot {
            Some(index) => index,
            // Slot counts match by construction.
            None => next.next().unwrap_or_default(),
        })
        .collect()
}

/// Pure weighted selection: given relative weights and a uniform draw in
/// `[0, 1)`, return the index of the chosen element.
///
/// Cutpoints are cumulative sums; the chosen index is the last one whose
/// cumulative mass before it does not exceed `draw` scaled by the total.
/// The same rule runs in the emitted script, so the two pipelines select
/// identically for the same draw.
pub fn weighted_index(weights: &[f64], draw: f64) -> usize {
    let total: f64 = weights.iter().sum();
    let target = draw * total;

    let mut cumulative = 0.0;
    let mut chosen = 0;
    for (index, weight) in weights.iter().enumerate() {
        if cumulative <= target {
            chosen = index;
        }
        cumulative += weight;
    }
    chosen
}

/// Draw one candidate profile, one level per attribute in display order.
/// Restriction checks happen at the caller; a rejected profile is
/// discarded wholesale.
pub fn draw_profile(survey: &Survey, order: &[usize], rng: &mut impl Rng) -> Profile {
    let entries = order
        .iter()
        .map(|&index| {
            let attribute = &survey.attributes[index];
            let level_index = if survey.weighted {
                let weights: Vec<f64> =
                    attribute.levels.iter().map(|level| level.weight).collect();
                weighted_index(&weights, rng.random::<f64>())
            } else {
                rng.random_range(0..attribute.levels.len())
            };
            ProfileEntry {
                attribute: attribute.name.clone(),
                level: attribute.levels[level_index].name.clone(),
            }
        })
        .collect();

    Profile { entries }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use conjoint_core::Level;

    use super::*;

    fn attr(name: &str, locked: bool) -> Attribute {
        Attribute {
            name: name.to_string(),
            levels: vec![
                Level {
                    name: "a".to_string(),
                    weight: 1.0,
                },
                Level {
                    name: "b".to_string(),
                    weight: 1.0,
                },
            ],
            locked,
        }
    }

    #[test]
    fn all_locked_order_is_identity() {
        let attributes = vec![attr("one", true), attr("two", true), attr("three", true)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            let order = attribute_order(&attributes, true, &mut rng);
            assert_eq!(order, vec![0, 1, 2]);
        }
    }

    #[test]
    fn locked_attributes_keep_their_index() {
        let attributes = vec![
            attr("one", false),
            attr("two", true),
            attr("three", false),
            attr("four", false),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let order = attribute_order(&attributes, true, &mut rng);
            assert_eq!(order[1], 1, "locked attribute moved");
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3], "order must be a permutation");
        }
    }

    #[test]
    fn randomize_disabled_keeps_declared_order() {
        let attributes = vec![attr("one", false), attr("two", false)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(attribute_order(&attributes, false, &mut rng), vec![0, 1]);
    }

    #[test]
    fn weighted_index_matches_hand_computed_cutpoints() {
        // Normalized cutpoints: [0, 0.1, 0.4).
        let weights = [1.0, 3.0, 6.0];
        assert_eq!(weighted_index(&weights, 0.0), 0);
        assert_eq!(weighted_index(&weights, 0.09), 0);
        assert_eq!(weighted_index(&weights, 0.1), 1);
        assert_eq!(weighted_index(&weights, 0.39), 1);
        assert_eq!(weighted_index(&weights, 0.4), 2);
        assert_eq!(weighted_index(&weights, 0.999), 2);
    }

    #[test]
    fn weighted_index_skips_zero_weight_levels() {
        assert_eq!(weighted_index(&[0.0, 1.0], 0.0), 1);
        assert_eq!(weighted_index(&[0.0, 1.0], 0.5), 1);
        assert_eq!(weighted_index(&[1.0, 0.0], 0.999), 0);
        assert_eq!(weighted_index(&[1.0, 0.0, 1.0], 0.6), 2);
    }

    #[test]
    fn drawn_profiles_use_declared_levels_in_order() {
        let survey = Survey {
            attributes: vec![attr("one", false), attr("two", false)],
            restrictions: Vec::new(),
            cross_restrictions: Vec::new(),
            num_profiles: 2,
            num_tasks: 1,
            csv_lines: 1,
            randomize: false,
            weighted: true,
            fixed_profile: None,
            fixed_profile_position: 0,
            repeated_tasks: false,
            repeated_tasks_flipped: false,
            task_to_repeat: 1,
            where_to_repeat: 2,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let profile = draw_profile(&survey, &[1, 0], &mut rng);
        assert_eq!(profile.entries[0].attribute, "two");
        assert_eq!(profile.entries[1].attribute, "one");
        for entry in &profile.entries {
            assert!(entry.level == "a" || entry.level == "b");
        }
    }
}
