//! Plain-text audit report of an identification and its estimates.
use crate::error::Result;
use crate::inference::{CausalInference, InferenceMode, SimultaneousCausalInference};
use std::fmt::Write;

pub fn format_report(inference: &CausalInference<'_>, modes: &[InferenceMode]) -> Result<String> {
    let (cost, adjustment) = inference.identify()?;
    let mut out = String::new();

    let _ = writeln!(out, "CAUSAL AUDIT for '{}' -> '{}':", inference.treatment(), inference.outcome());
    let _ = writeln!(out, "--------------------------------------------------");
    let _ = writeln!(out, "Back-door set (cost {:.3}):", cost);
    if adjustment.is_empty() {
        let _ = writeln!(out, "`-- (empty, no adjustment needed)");
    }
    for (i, name) in adjustment.iter().enumerate() {
        let connector = if i == adjustment.len() - 1 { "`--" } else { "|--" };
        let _ = writeln!(out, "{} {}", connector, name);
    }

    if !modes.is_empty() {
        let _ = writeln!(out, "Estimates:");
    }
    for (i, mode) in modes.iter().enumerate() {
        let connector = if i == modes.len() - 1 { "`--" } else { "|--" };
        let _ = writeln!(out, "{} {:<26} {}", connector, mode.as_str(), format_value(inference.causal_effect(*mode)?));
    }
    Ok(out)
}

/// Covariate blocks per treatment followed by the total effects.
pub fn format_simultaneous_report(inference: &SimultaneousCausalInference<'_>) -> Result<String> {
    let blocks = inference.admissible_blocks()?;
    let effects = inference.causal_effect()?;
    let mut out = String::new();

    let _ = writeln!(out, "SIMULTANEOUS AUDIT for outcome '{}':", inference.outcome());
    let _ = writeln!(out, "--------------------------------------------------");
    let treatments = inference.treatments();
    for (i, (treatment, block)) in treatments.iter().zip(&blocks).enumerate() {
        let connector = if i == treatments.len() - 1 { "`--" } else { "|--" };
        let _ = writeln!(
            out,
            "{} [{}] {} = {} (covariates: {:?})",
            connector,
            i,
            treatment,
            format_value(effects[treatment]),
            block
        );
    }
    Ok(out)
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CausalGraph;
    use crate::store::Dataset;

    #[test]
    fn test_report_lists_adjustment_and_estimates() {
        let ds = Dataset::from_columns([
            ("z", vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0]),
            ("t", vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0]),
            ("y", vec![0.0, 3.0, 2.0, 3.0, 1.0, 0.0]),
        ])
        .unwrap();
        let g = CausalGraph::from_edges(&["z", "t", "y"], &[("z", "t"), ("z", "y"), ("t", "y")]).unwrap();
        let ci = CausalInference::new(&ds, &g, "t", "y").unwrap();

        let report = format_report(&ci, &[InferenceMode::NaiveTreatmentEffect, InferenceMode::LinearRegressionEffect]).unwrap();
        assert!(report.starts_with("CAUSAL AUDIT for 't' -> 'y':"));
        assert!(report.contains("Back-door set (cost 1.000):\n`-- z\n"));
        assert!(report.contains("|-- NaiveTreatmentEffect"));
        assert!(report.contains("`-- LinearRegressionEffect     2.0000"));
    }

    #[test]
    fn test_nan_effects_read_as_undefined() {
        let ds = Dataset::from_columns([
            ("t1", vec![1.0; 4]),
            ("t2", vec![0.0, 1.0, 2.0, 3.0]),
            ("y", vec![1.0, 2.0, 3.0, 5.0]),
        ])
        .unwrap();
        let g = CausalGraph::from_edges(&["t1", "t2", "y"], &[("t1", "y"), ("t2", "y")]).unwrap();
        let treatments = vec!["t1".to_string(), "t2".to_string()];
        let si = SimultaneousCausalInference::new(&ds, &treatments, "y", Some(&g)).unwrap();

        let report = format_simultaneous_report(&si).unwrap();
        assert!(report.contains("t1 = undefined (covariates: [])"));
    }
}
