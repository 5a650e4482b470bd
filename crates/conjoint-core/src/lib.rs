//! Core contracts for conjoint design generation.
//!
//! This crate defines the canonical survey input types, validation helpers,
//! and the shared error type used by the design engine and the CLI.

pub mod error;
pub mod restrictions;
pub mod survey;
pub mod validation;

pub use error::{Error, Result};
pub use restrictions::{Clause, CompareOp, ConditionClause, CrossRestriction, LogicalOp, Restriction};
pub use survey::{Attribute, Level, Survey};
pub use validation::validate_survey;

/// Current contract version for survey JSON artifacts.
pub const SURVEY_VERSION: &str = "0.1";
