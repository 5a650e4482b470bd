use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Options for the design engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignOptions {
    /// Seed for reproducible output. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Maximum attempts to sample one restriction-satisfying profile, and
    /// separately to find a non-duplicate profile for one task position.
    pub max_attempts_profile: u32,
    /// Maximum attempts to assemble a task that passes cross-profile
    /// restrictions.
    pub max_attempts_task: u32,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts_profile: 1000,
            max_attempts_task: 100,
        }
    }
}

/// One chosen level for one attribute within a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub attribute: String,
    pub level: String,
}

/// One fully-instantiated candidate: one level per attribute, in the
/// display order fixed for the generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub entries: Vec<ProfileEntry>,
}

impl Profile {
    pub fn level_of(&self, attribute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.attribute == attribute)
            .map(|entry| entry.level.as_str())
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.attribute.clone())
            .collect()
    }

    /// Two profiles are duplicates when their full ordered level tuples
    /// match; attribute order is shared within a batch, so comparing
    /// levels positionally is exact.
    pub fn same_levels(&self, other: &Profile) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.level == b.level)
    }
}

// Serialized as an attribute -> level map so previews keep the shape
// collaborators expect, while entry order stays the batch display order.
impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.attribute, &entry.level)?;
        }
        map.end()
    }
}

/// Profiles shown together on one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub profiles: Vec<Profile>,
}

/// The full sequence of tasks generated for one respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Design {
    pub tasks: Vec<Task>,
}

/// Summary of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignReport {
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub seed: Option<u64>,
    pub tasks_generated: u64,
    pub profile_retries: u64,
    pub duplicate_retries: u64,
    pub task_retries: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl DesignReport {
    pub fn new(run_id: String, seed: Option<u64>) -> Self {
        Self {
            run_id,
            started_at: chrono::Utc::now(),
            seed,
            tasks_generated: 0,
            profile_retries: 0,
            duplicate_retries: 0,
            task_retries: 0,
            bytes_written: 0,
            duration_ms: 0,
        }
    }
}
