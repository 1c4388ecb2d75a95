//! Effect estimation on top of the identified adjustment sets.
pub mod mode;
pub mod simultaneous;
pub mod single;

pub use mode::InferenceMode;
pub use simultaneous::SimultaneousCausalInference;
pub use single::CausalInference;
