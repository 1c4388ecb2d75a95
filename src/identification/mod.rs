//! Causal identification: deciding, from the graph alone, which covariates
//! must be controlled for.
//!
//! The d-separator search reduces to a minimum s-t cut on a node-split flow
//! network, and the back-door search reuses it. Sequential covariate blocks
//! for several treatments come from the topological order instead.
pub mod admissible;
pub mod backdoor;
pub mod flow;
pub mod separator;

use std::collections::BTreeSet;

/// Duplicate-free set of node names with a deterministic iteration order.
pub type NodeSet = BTreeSet<String>;

pub use admissible::{AdmissibleVariableFinder, TopologicalBlockFinder};
pub use backdoor::find_minimum_backdoor_set;
pub use separator::find_minimum_d_separator;
