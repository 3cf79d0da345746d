pub mod observed_point;
