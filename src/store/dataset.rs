//! dataset.rs
//! Column-oriented table of observations, one `Vec<f64>` per variable.

use crate::error::{CausalError, Result};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    // Columnar Arrays (insertion order is preserved)
    names: Vec<String>,
    columns: Vec<Vec<f64>>,

    // Name lookup into the arrays above
    positions: HashMap<String, usize>,
}

impl Dataset {
    pub fn new() -> Self { Self::default() }

    /// Builds a dataset from `(name, values)` pairs, keeping their order.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, values) in columns {
            dataset.push_column(name, values)?;
        }
        Ok(dataset)
    }

    /// Builds a dataset from a name-keyed table, keeping the table's order.
    pub fn from_table(table: &IndexMap<String, Vec<f64>>) -> Result<Self> {
        Self::from_columns(table.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if let Some(expected) = self.columns.first().map(Vec::len) {
            if values.len() != expected {
                return Err(CausalError::DatasetShape { column: name, expected, actual: values.len() });
            }
        }
        if self.positions.contains_key(&name) {
            return Err(CausalError::DuplicateColumn(name));
        }
        self.positions.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.positions
            .get(name)
            .map(|&i| self.columns[i].as_slice())
            .ok_or_else(|| CausalError::MissingColumn(name.to_string()))
    }

    pub fn column_names(&self) -> &[String] { &self.names }
    pub fn contains(&self, name: &str) -> bool { self.positions.contains_key(name) }
    pub fn n_rows(&self) -> usize { self.columns.first().map_or(0, Vec::len) }
    pub fn n_columns(&self) -> usize { self.names.len() }

    /// Design matrix with one column per entry of `names`, in the given order.
    pub fn matrix(&self, names: &[String]) -> Result<DMatrix<f64>> {
        let cols = names.iter().map(|n| self.column(n)).collect::<Result<Vec<_>>>()?;
        Ok(DMatrix::from_fn(self.n_rows(), cols.len(), |r, c| cols[c][r]))
    }
}
