pub mod capacity_estimator;
