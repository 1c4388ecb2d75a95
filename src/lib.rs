// Library facade: causal identification on a DAG and effect estimation on
// observational data.

// --- Core model ---
pub mod error;
pub mod graph;
pub mod store;

// --- Identification and estimation ---
pub mod identification;
pub mod inference;
pub mod solver;

// --- Surfaces ---
pub mod bindings;
pub mod config;
pub mod display;

pub use config::EstimatorConfig;
pub use error::{CausalError, Result};
pub use graph::CausalGraph;
pub use identification::{find_minimum_backdoor_set, find_minimum_d_separator, NodeSet};
pub use inference::{CausalInference, InferenceMode, SimultaneousCausalInference};
pub use store::Dataset;
