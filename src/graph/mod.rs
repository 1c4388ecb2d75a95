//! Defines the causal graph the identification layer reasons over.
pub mod dag;
pub mod node;

// Re-export key types for convenient access
pub use dag::CausalGraph;
pub use node::{CausalNode, NodeId, DEFAULT_NODE_COST};
