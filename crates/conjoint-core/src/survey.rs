use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::restrictions::{CrossRestriction, Restriction};

/// One concrete value an attribute can take, with a sampling weight.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Level {
    pub name: String,
    /// Relative sampling weight among sibling levels. Weights within one
    /// attribute need not sum to 1.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// A named dimension of variation in a profile.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,
    /// Declared levels, in display order. Must be nonempty.
    pub levels: Vec<Level>,
    /// Locked attributes keep their declared position when the display
    /// order is randomized.
    #[serde(default)]
    pub locked: bool,
}

/// Validated survey definition consumed by the design engine.
///
/// Field names and defaults follow the survey JSON contract; request
/// parsing and schema validation belong to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Survey {
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub cross_restrictions: Vec<CrossRestriction>,
    /// Profiles shown together in one task.
    #[serde(default = "default_num_profiles")]
    pub num_profiles: usize,
    /// Tasks shown to one respondent.
    #[serde(default = "default_num_tasks")]
    pub num_tasks: usize,
    /// Rows to generate for the CSV export, one independent task per row.
    #[serde(default = "default_csv_lines")]
    pub csv_lines: usize,
    /// Randomize the display order of unlocked attributes.
    #[serde(default)]
    pub randomize: bool,
    /// Use level weights when sampling; uniform among siblings otherwise.
    #[serde(default, alias = "random")]
    pub weighted: bool,
    /// Profile substituted verbatim at `fixed_profile_position`, keyed by
    /// attribute name. Bypasses all restriction checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_profile: Option<BTreeMap<String, String>>,
    /// Zero-based position of the fixed profile within each task.
    #[serde(default)]
    pub fixed_profile_position: usize,
    /// Overwrite one task with a copy of another after generation.
    #[serde(default)]
    pub repeated_tasks: bool,
    /// Reverse the profile order of the repeated copy.
    #[serde(default)]
    pub repeated_tasks_flipped: bool,
    /// One-based index of the task whose values are copied.
    #[serde(default = "default_task_to_repeat")]
    pub task_to_repeat: usize,
    /// One-based index of the task that receives the copy.
    #[serde(default = "default_where_to_repeat")]
    pub where_to_repeat: usize,
}

impl Survey {
    /// Duplicate profiles are rejected within a task unless the survey
    /// repeats tasks, in which case identical profiles are expected.
    pub fn no_duplicate_profiles(&self) -> bool {
        !self.repeated_tasks
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_num_profiles() -> usize {
    2
}

fn default_num_tasks() -> usize {
    5
}

fn default_csv_lines() -> usize {
    500
}

fn default_task_to_repeat() -> usize {
    1
}

fn default_where_to_repeat() -> usize {
    2
}
