use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Comparison applied to one attribute's chosen level.
///
/// Only equality operators are supported; any other operation string is
/// rejected at parse time rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

/// Connective joining a condition clause to the running fold result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LogicalOp {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

/// A single attribute/operation/value comparison.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clause {
    pub attribute: String,
    pub operation: CompareOp,
    pub value: String,
}

/// A condition clause with the connective that joins it to the clauses
/// before it. The first clause's connective, if present, is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConditionClause {
    pub attribute: String,
    pub operation: CompareOp,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<LogicalOp>,
}

/// Single-profile restriction: when the condition fold holds, every result
/// clause must hold as well.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Restriction {
    pub condition: Vec<ConditionClause>,
    pub result: Vec<Clause>,
}

/// Cross-profile restriction relating two different profiles in one task:
/// a profile matching `condition` requires some other profile in the same
/// task to match `result`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrossRestriction {
    pub condition: Clause,
    pub result: Clause,
}
