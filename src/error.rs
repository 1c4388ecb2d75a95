//! Defines the failure taxonomy shared by identification and estimation.
use thiserror::Error;

/// Every failure the core can surface to a caller.
///
/// All variants are deterministic functions of the input, so none of them is
/// worth retrying without changing the request.
#[derive(Error, Debug)]
pub enum CausalError {
    /// Treatment/outcome sets overlap, are adjacent, or cannot be separated.
    #[error("Invalid node set: {0}")]
    InvalidNodeSet(String),
    #[error("Cycle detected in causal graph at node '{node}'")]
    CyclicGraph { node: String },
    /// The normal equations of an adjustment regression are singular.
    #[error("Cannot determine causal effect: {0}")]
    CannotDetermineCausalEffect(String),
    #[error("Invalid inference mode '{0}'")]
    InvalidInferenceMode(String),
    #[error("Node '{node}' has cost {cost}; costs must be finite and non-negative")]
    InvalidNodeCost { node: String, cost: f64 },
    #[error("Node '{0}' is not in the causal graph")]
    NodeNotFound(String),
    #[error("Column '{0}' is not in the dataset")]
    MissingColumn(String),
    #[error("Column '{0}' appears twice in the dataset")]
    DuplicateColumn(String),
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    DatasetShape { column: String, expected: usize, actual: usize },
    #[error("Invalid estimator config: {0}")]
    InvalidConfig(String),
    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CausalError>;
