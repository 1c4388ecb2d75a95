//! Numeric kernels behind the estimators: least squares, standardization,
//! logistic regression and the train/test split.
pub mod linalg;
pub mod logistic;
pub mod split;

pub use linalg::{solve, solve_normal_equations, ColumnStats, LinearRegression};
pub use logistic::{accuracy, LogisticRegression};
pub use split::{train_test_split, TrainTestSplit};
