//! Simultaneous effects of several treatments via standardized path
//! coefficients.
//!
//! Treatments are visited in topological order. Step `i` regresses the next
//! admissible block (or, at the last step, the outcome) on every treatment
//! and covariate introduced so far. The direct coefficients are then chained
//! into total effects by solving `(I - B) E = C`, where `B` holds
//! covariate-to-target and `C` treatment-to-target coefficients.
use crate::config::EstimatorConfig;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use crate::identification::{AdmissibleVariableFinder, TopologicalBlockFinder};
use crate::solver::{solve, solve_normal_equations, ColumnStats};
use crate::store::Dataset;
use log::{debug, info};
use nalgebra::DMatrix;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

pub struct SimultaneousCausalInference<'a> {
    dataset: &'a Dataset,
    graph: Cow<'a, CausalGraph>,
    /// Treatments in topological order.
    treatments: Vec<String>,
    outcome: String,
    finder: Box<dyn AdmissibleVariableFinder + Send + Sync + 'a>,
    config: EstimatorConfig,
}

impl<'a> SimultaneousCausalInference<'a> {
    /// Without a graph, [`CausalGraph::default_for`] is built from the
    /// dataset's columns.
    pub fn new(
        dataset: &'a Dataset,
        treatments: &[String],
        outcome: &str,
        graph: Option<&'a CausalGraph>,
    ) -> Result<Self> {
        let graph = match graph {
            Some(graph) => Cow::Borrowed(graph),
            None => Cow::Owned(CausalGraph::default_for(dataset.column_names(), treatments, outcome)),
        };
        for name in treatments.iter().map(String::as_str).chain([outcome]) {
            dataset.column(name)?;
            graph.node_id(name)?;
        }
        if treatments.iter().any(|t| t == outcome) {
            return Err(CausalError::InvalidNodeSet(format!(
                "'{}' cannot be both treatment and outcome",
                outcome
            )));
        }

        let sorted: Vec<String> = graph
            .topological_order()?
            .into_iter()
            .filter(|node| treatments.contains(node))
            .collect();
        debug!("treatments in topological order: {:?}", sorted);

        Ok(Self {
            dataset,
            graph,
            treatments: sorted,
            outcome: outcome.to_string(),
            finder: Box::new(TopologicalBlockFinder),
            config: EstimatorConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the strategy that assigns covariates to steps.
    pub fn with_finder(mut self, finder: impl AdmissibleVariableFinder + Send + Sync + 'a) -> Self {
        self.finder = Box::new(finder);
        self
    }

    pub fn treatments(&self) -> &[String] { &self.treatments }
    pub fn outcome(&self) -> &str { &self.outcome }
    pub fn graph(&self) -> &CausalGraph { &self.graph }

    pub fn admissible_blocks(&self) -> Result<Vec<Vec<String>>> {
        let blocks = self.finder.find(&self.graph, &self.treatments, &self.outcome)?;
        if blocks.len() != self.treatments.len() {
            return Err(CausalError::CannotDetermineCausalEffect(format!(
                "expected {} admissible blocks, the finder produced {}",
                self.treatments.len(),
                blocks.len()
            )));
        }
        Ok(blocks)
    }

    /// Total effect of each treatment on the outcome, holding the other
    /// treatments fixed. Zero-variance treatments map to NaN.
    pub fn causal_effect(&self) -> Result<BTreeMap<String, f64>> {
        let k = self.treatments.len();
        let blocks = self.admissible_blocks()?;

        // Extended target space: every admissible covariate, then the outcome.
        let extended: Vec<&str> = blocks
            .iter()
            .flatten()
            .map(String::as_str)
            .chain([self.outcome.as_str()])
            .collect();
        let position: HashMap<&str, usize> = extended.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        let treatment_index: HashMap<&str, usize> =
            self.treatments.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

        let mut stats = HashMap::new();
        for name in self.treatments.iter().map(String::as_str).chain(extended.iter().copied()) {
            stats.insert(name, ColumnStats::of(self.dataset.column(name)?));
        }
        let varies = |name: &str| !stats[name].is_constant();
        let standardized = |names: &[&str]| -> Result<DMatrix<f64>> {
            let columns = names
                .iter()
                .map(|n| Ok(stats[n].standardize(self.dataset.column(n)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(DMatrix::from_fn(self.dataset.n_rows(), columns.len(), |r, c| columns[c][r]))
        };

        let m = extended.len();
        let mut covariate_coeffs = DMatrix::<f64>::zeros(m, m);
        let mut treatment_coeffs = DMatrix::<f64>::zeros(m, k);
        let mut explain: Vec<&str> = Vec::new();

        for i in 0..k {
            let treatment = self.treatments[i].as_str();
            if varies(treatment) {
                // Treatments stay ahead of covariates in the explanatory list.
                let insert_at = explain.iter().take_while(|n| treatment_index.contains_key(*n)).count();
                explain.insert(insert_at, treatment);
            }
            explain.extend(blocks[i].iter().map(String::as_str).filter(|n| varies(*n)));

            let targets: Vec<&str> = match blocks.get(i + 1) {
                Some(next) => next.iter().map(String::as_str).filter(|n| varies(*n)).collect(),
                None if varies(self.outcome.as_str()) => vec![self.outcome.as_str()],
                None => Vec::new(),
            };
            if explain.is_empty() || targets.is_empty() {
                continue;
            }

            let beta = solve_normal_equations(
                &standardized(explain.as_slice())?,
                &standardized(targets.as_slice())?,
                self.config.singular_tolerance,
            )?;
            debug!("step {}: {:?} on {:?}", i, targets, explain);

            for (e, source) in explain.iter().enumerate() {
                for (o, target) in targets.iter().enumerate() {
                    let coeff = beta[(e, o)] / stats[source].std * stats[target].std;
                    match treatment_index.get(source) {
                        Some(&j) => treatment_coeffs[(position[target], j)] = coeff,
                        None => covariate_coeffs[(position[target], position[source])] = coeff,
                    }
                }
            }
        }

        let identity = DMatrix::<f64>::identity(m, m);
        let totals = solve(&(identity - covariate_coeffs), &treatment_coeffs, self.config.singular_tolerance)?;
        let outcome_row = position[self.outcome.as_str()];

        let effects: BTreeMap<String, f64> = self
            .treatments
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let effect = if varies(name.as_str()) { totals[(outcome_row, j)] } else { f64::NAN };
                (name.clone(), effect)
            })
            .collect();
        info!("simultaneous effects on '{}': {:?}", self.outcome, effects);
        Ok(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{CausalInference, InferenceMode};
    use crate::solver::LinearRegression;
    use nalgebra::DVector;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn noise(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.gen::<f64>() - 0.5).collect()
    }

    #[test]
    fn test_single_treatment_matches_linear_regression() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 200;
        let z = noise(&mut rng, n);
        let t: Vec<f64> = z.iter().zip(noise(&mut rng, n)).map(|(z, e)| 0.8 * z + e).collect();
        let y: Vec<f64> = z
            .iter()
            .zip(&t)
            .zip(noise(&mut rng, n))
            .map(|((z, t), e)| 1.5 * z + 2.0 * t + 0.1 * e)
            .collect();
        let ds = Dataset::from_columns([("z", z), ("t", t), ("y", y)]).unwrap();
        let g = CausalGraph::from_edges(&["z", "t", "y"], &[("z", "t"), ("z", "y"), ("t", "y")]).unwrap();

        let simultaneous = SimultaneousCausalInference::new(&ds, &names(&["t"]), "y", Some(&g))
            .unwrap()
            .causal_effect()
            .unwrap();
        let linear = CausalInference::new(&ds, &g, "t", "y")
            .unwrap()
            .causal_effect(InferenceMode::LinearRegressionEffect)
            .unwrap();
        assert!((simultaneous["t"] - linear).abs() < 1e-8, "{} vs {}", simultaneous["t"], linear);
    }

    #[test]
    fn test_mediated_paths_are_chained_into_total_effects() {
        // t1 -> m -> y, t1 -> y, t2 -> y, with m also driving t2.
        let mut rng = StdRng::seed_from_u64(5);
        let n = 300;
        let t1 = noise(&mut rng, n);
        let m: Vec<f64> = t1.iter().zip(noise(&mut rng, n)).map(|(t, e)| 2.0 * t + e).collect();
        let t2: Vec<f64> = m.iter().zip(noise(&mut rng, n)).map(|(m, e)| 0.5 * m + e).collect();
        let y: Vec<f64> = (0..n).map(|i| t1[i] + 0.7 * m[i] + 3.0 * t2[i]).collect();
        let ds = Dataset::from_columns([("t1", t1), ("m", m), ("t2", t2), ("y", y)]).unwrap();
        let g = CausalGraph::from_edges(
            &["t1", "m", "t2", "y"],
            &[("t1", "m"), ("m", "t2"), ("t1", "y"), ("m", "y"), ("t2", "y")],
        )
        .unwrap();

        let estimator = SimultaneousCausalInference::new(&ds, &names(&["t2", "t1"]), "y", Some(&g)).unwrap();
        assert_eq!(estimator.treatments(), names(&["t1", "t2"]).as_slice());
        let effects = estimator.causal_effect().unwrap();

        // Reference: the same two regressions done by hand.
        let a = LinearRegression::fit(
            &ds.matrix(&names(&["t1"])).unwrap(),
            &DVector::from_column_slice(ds.column("m").unwrap()),
            1e-10,
        )
        .unwrap()
        .coefficients[0];
        let direct = LinearRegression::fit(
            &ds.matrix(&names(&["t1", "t2", "m"])).unwrap(),
            &DVector::from_column_slice(ds.column("y").unwrap()),
            1e-10,
        )
        .unwrap()
        .coefficients;

        assert!((effects["t1"] - (direct[0] + a * direct[2])).abs() < 1e-6);
        assert!((effects["t2"] - direct[1]).abs() < 1e-6);
        // The structural equation is exact, so the path model recovers it.
        assert!((effects["t1"] - (1.0 + 0.7 * a)).abs() < 1e-6);
        assert!((effects["t2"] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_treatment_yields_nan() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 50;
        let t2 = noise(&mut rng, n);
        let y: Vec<f64> = t2.iter().zip(noise(&mut rng, n)).map(|(t, e)| 4.0 * t + e).collect();
        let ds = Dataset::from_columns([("t1", vec![1.0; n]), ("t2", t2), ("y", y)]).unwrap();
        let g = CausalGraph::from_edges(&["t1", "t2", "y"], &[("t1", "y"), ("t2", "y")]).unwrap();

        let effects = SimultaneousCausalInference::new(&ds, &names(&["t1", "t2"]), "y", Some(&g))
            .unwrap()
            .causal_effect()
            .unwrap();
        assert!(effects["t1"].is_nan());
        assert!(effects["t2"].is_finite());
    }

    #[test]
    fn test_duplicated_covariate_is_singular() {
        let mut rng = StdRng::seed_from_u64(8);
        let n = 40;
        let z = noise(&mut rng, n);
        let t: Vec<f64> = z.iter().zip(noise(&mut rng, n)).map(|(z, e)| z + e).collect();
        let y: Vec<f64> = z.iter().zip(&t).map(|(z, t)| z + t).collect();
        let ds = Dataset::from_columns([("z1", z.clone()), ("z2", z), ("t", t), ("y", y)]).unwrap();
        let g = CausalGraph::from_edges(
            &["z1", "z2", "t", "y"],
            &[("z1", "t"), ("z2", "t"), ("z1", "y"), ("z2", "y"), ("t", "y")],
        )
        .unwrap();

        let result = SimultaneousCausalInference::new(&ds, &names(&["t"]), "y", Some(&g))
            .unwrap()
            .causal_effect();
        assert!(matches!(result, Err(CausalError::CannotDetermineCausalEffect(_))));
    }

    #[test]
    fn test_default_graph_is_used_without_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 100;
        let w = noise(&mut rng, n);
        let t: Vec<f64> = w.iter().zip(noise(&mut rng, n)).map(|(w, e)| w + e).collect();
        let y: Vec<f64> = w.iter().zip(&t).map(|(w, t)| 2.0 * w - t).collect();
        let ds = Dataset::from_columns([("w", w), ("t", t), ("y", y)]).unwrap();

        let estimator = SimultaneousCausalInference::new(&ds, &names(&["t"]), "y", None).unwrap();
        assert!(estimator.graph().has_edge("w", "t"));
        let effects = estimator.causal_effect().unwrap();
        assert!((effects["t"] + 1.0).abs() < 1e-9);
    }

    struct NoCovariates;

    impl AdmissibleVariableFinder for NoCovariates {
        fn find(&self, _: &CausalGraph, treatments: &[String], _: &str) -> Result<Vec<Vec<String>>> {
            Ok(vec![Vec::new(); treatments.len()])
        }
    }

    #[test]
    fn test_custom_finder_replaces_the_default() {
        // Ignoring the confounder brings back the naive regression slope.
        let mut rng = StdRng::seed_from_u64(21);
        let n = 100;
        let z = noise(&mut rng, n);
        let t: Vec<f64> = z.iter().zip(noise(&mut rng, n)).map(|(z, e)| z + e).collect();
        let y: Vec<f64> = z.iter().zip(&t).map(|(z, t)| 5.0 * z + t).collect();
        let ds = Dataset::from_columns([("z", z), ("t", t), ("y", y)]).unwrap();
        let g = CausalGraph::from_edges(&["z", "t", "y"], &[("z", "t"), ("z", "y"), ("t", "y")]).unwrap();

        let adjusted = SimultaneousCausalInference::new(&ds, &names(&["t"]), "y", Some(&g))
            .unwrap()
            .causal_effect()
            .unwrap();
        let unadjusted = SimultaneousCausalInference::new(&ds, &names(&["t"]), "y", Some(&g))
            .unwrap()
            .with_finder(NoCovariates)
            .causal_effect()
            .unwrap();
        assert!((adjusted["t"] - 1.0).abs() < 1e-9);
        assert!((unadjusted["t"] - 1.0).abs() > 0.5);
    }
}
