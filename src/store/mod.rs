//! Columnar storage for the observational data.
pub mod dataset;

pub use dataset::Dataset;
