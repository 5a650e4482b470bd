//! Randomized conjoint design generation.
//!
//! This crate consumes a validated survey definition and produces
//! restriction-satisfying task sets: in-memory previews, CSV exports with
//! one task per row, and a self-contained Qualtrics JavaScript block.

pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod restrictions;
pub mod sampling;

pub use engine::{DesignEngine, DesignResult};
pub use errors::{DesignError, RetryScope};
pub use model::{Design, DesignOptions, DesignReport, Profile, ProfileEntry, Task};
pub use output::preview::Preview;
pub use output::script::emit_script;
