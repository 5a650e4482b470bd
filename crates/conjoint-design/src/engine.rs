use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use conjoint_core::{Survey, validate_survey};

use crate::errors::{DesignError, RetryScope};
use crate::model::{Design, DesignOptions, DesignReport, Profile, ProfileEntry, Task};
use crate::output::csv::write_design_csv;
use crate::output::preview::Preview;
use crate::restrictions::{profile_satisfies, task_satisfies_cross};
use crate::sampling::{attribute_order, draw_profile};

/// Result of a full design generation run.
#[derive(Debug, Clone)]
pub struct DesignResult {
    pub design: Design,
    pub report: DesignReport,
}

/// Entry point for generating designs from a validated survey.
///
/// Every call builds its own RNG and attribute order; nothing is shared
/// across calls.
#[derive(Debug, Clone)]
pub struct DesignEngine {
    options: DesignOptions,
}

impl DesignEngine {
    pub fn new(options: DesignOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DesignOptions {
        &self.options
    }

    /// Generate one task and return it as preview data, attributes listed
    /// in the batch display order.
    pub fn preview(&self, survey: &Survey) -> Result<Preview, DesignError> {
        validate_survey(survey)?;
        let mut rng = self.make_rng();
        let order = attribute_order(&survey.attributes, survey.randomize, &mut rng);
        let mut report = DesignReport::new(uuid::Uuid::new_v4().to_string(), self.options.seed);

        let task = self.build_task(survey, &order, &mut rng, &mut report)?;

        Ok(Preview {
            attributes: order
                .iter()
                .map(|&index| survey.attributes[index].name.clone())
                .collect(),
            previews: task.profiles,
        })
    }

    /// Generate the full design: `num_tasks` tasks of `num_profiles`
    /// profiles each, with repeated-task mirroring applied last.
    pub fn design(&self, survey: &Survey) -> Result<DesignResult, DesignError> {
        validate_survey(survey)?;
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = DesignReport::new(run_id.clone(), self.options.seed);
        let mut rng = self.make_rng();
        let order = attribute_order(&survey.attributes, survey.randomize, &mut rng);

        info!(
            run_id = %run_id,
            tasks = survey.num_tasks,
            profiles = survey.num_profiles,
            seed = ?self.options.seed,
            "design generation started"
        );

        let mut tasks = Vec::with_capacity(survey.num_tasks);
        for _ in 0..survey.num_tasks {
            tasks.push(self.build_task(survey, &order, &mut rng, &mut report)?);
        }
        let mut design = Design { tasks };

        if survey.repeated_tasks {
            mirror_repeated_task(survey, &mut design);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            tasks_generated = report.tasks_generated,
            profile_retries = report.profile_retries,
            task_retries = report.task_retries,
            duration_ms = report.duration_ms,
            "design generation completed"
        );

        Ok(DesignResult { design, report })
    }

    /// Generate `csv_lines` independent tasks and write them as one CSV
    /// file, one task per row. The attribute order is computed once for
    /// the whole file.
    pub fn write_csv(&self, survey: &Survey, path: &Path) -> Result<DesignReport, DesignError> {
        validate_survey(survey)?;
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = DesignReport::new(run_id.clone(), self.options.seed);
        let mut rng = self.make_rng();
        let order = attribute_order(&survey.attributes, survey.randomize, &mut rng);

        info!(
            run_id = %run_id,
            rows = survey.csv_lines,
            profiles = survey.num_profiles,
            seed = ?self.options.seed,
            "csv generation started"
        );

        let mut tasks = Vec::with_capacity(survey.csv_lines);
        for _ in 0..survey.csv_lines {
            tasks.push(self.build_task(survey, &order, &mut rng, &mut report)?);
        }

        report.bytes_written = write_design_csv(path, survey, &order, &tasks)?;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            rows = tasks.len(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "csv generation completed"
        );

        Ok(report)
    }

    fn make_rng(&self) -> ChaCha8Rng {
        match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        }
    }

    /// Assemble one task, rebuilding it from scratch whenever the
    /// cross-profile restrictions reject the full profile set.
    fn build_task(
        &self,
        survey: &Survey,
        order: &[usize],
        rng: &mut ChaCha8Rng,
        report: &mut DesignReport,
    ) -> Result<Task, DesignError> {
        for _ in 0..self.options.max_attempts_task {
            let mut profiles: Vec<Profile> = Vec::with_capacity(survey.num_profiles);
            while profiles.len() < survey.num_profiles {
                let profile = self.sample_task_profile(survey, order, &profiles, rng, report)?;
                profiles.push(profile);
            }

            if task_satisfies_cross(&profiles, &survey.cross_restrictions) {
                let mut task = Task { profiles };
                apply_fixed_profile(survey, order, &mut task)?;
                report.tasks_generated += 1;
                return Ok(task);
            }
            report.task_retries += 1;
        }

        warn!(
            attempts = self.options.max_attempts_task,
            "cross-profile restrictions rejected every task"
        );
        Err(DesignError::Unsatisfiable {
            scope: RetryScope::Task,
            attempts: self.options.max_attempts_task,
        })
    }

    /// Sample one profile for a task position. Restriction retries and
    /// duplicate retries are bounded separately: a duplicate discards
    /// only this position, never the accepted profiles before it.
    fn sample_task_profile(
        &self,
        survey: &Survey,
        order: &[usize],
        accepted: &[Profile],
        rng: &mut ChaCha8Rng,
        report: &mut DesignReport,
    ) -> Result<Profile, DesignError> {
        let mut duplicate_attempts = 0;
        loop {
            let profile = self.sample_restricted_profile(survey, order, rng, report)?;
            if survey.no_duplicate_profiles()
                && accepted.iter().any(|other| other.same_levels(&profile))
            {
                duplicate_attempts += 1;
                report.duplicate_retries += 1;
                if duplicate_attempts >= self.options.max_attempts_profile {
                    warn!(
                        attempts = duplicate_attempts,
                        "duplicate avoidance exhausted its attempts"
                    );
                    return Err(DesignError::Unsatisfiable {
                        scope: RetryScope::Duplicate,
                        attempts: self.options.max_attempts_profile,
                    });
                }
                continue;
            }
            return Ok(profile);
        }
    }

    fn sample_restricted_profile(
        &self,
        survey: &Survey,
        order: &[usize],
        rng: &mut ChaCha8Rng,
        report: &mut DesignReport,
    ) -> Result<Profile, DesignError> {
        for _ in 0..self.options.max_attempts_profile {
            let profile = draw_profile(survey, order, rng);
            if profile_satisfies(&profile, &survey.restrictions) {
                return Ok(profile);
            }
            report.profile_retries += 1;
        }

        warn!(
            attempts = self.options.max_attempts_profile,
            "single-profile restrictions rejected every candidate"
        );
        Err(DesignError::Unsatisfiable {
            scope: RetryScope::Profile,
            attempts: self.options.max_attempts_profile,
        })
    }
}

/// Substitute the caller-supplied profile verbatim, bypassing every
/// restriction check. Values are reordered to the task's display order.
fn apply_fixed_profile(
    survey: &Survey,
    order: &[usize],
    task: &mut Task,
) -> Result<(), DesignError> {
    let Some(fixed) = &survey.fixed_profile else {
        return Ok(());
    };

    let entries = order
        .iter()
        .map(|&index| {
            let name = &survey.attributes[index].name;
            fixed
                .get(name)
                .map(|level| ProfileEntry {
                    attribute: name.clone(),
                    level: level.clone(),
                })
                .ok_or_else(|| {
                    conjoint_core::Error::InvalidSurvey(format!(
                        "fixed profile is missing attribute '{name}'"
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    task.profiles[survey.fixed_profile_position] = Profile { entries };
    Ok(())
}

/// Overwrite task `where_to_repeat` with a copy of task `task_to_repeat`.
/// The copy reuses the already-drawn values; a flipped copy reverses the
/// profile order.
fn mirror_repeated_task(survey: &Survey, design: &mut Design) {
    let mut copy = design.tasks[survey.task_to_repeat - 1].clone();
    if survey.repeated_tasks_flipped {
        copy.profiles.reverse();
    }
    design.tasks[survey.where_to_repeat - 1] = copy;
}
