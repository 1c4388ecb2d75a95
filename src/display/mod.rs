pub mod report;

pub use report::{format_report, format_simultaneous_report};
