pub mod linalg;
pub mod logistic_trend;
pub mod stats;
