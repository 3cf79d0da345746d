use crate::common::enums::BoundaryFill;

#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    /// Whisker length in IQRs; values beyond it are clamped
    pub iqr_multiplier: f64,

    /// Policy for gaps at either end of the series
    pub boundary_fill: BoundaryFill,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            boundary_fill: BoundaryFill::Nearest,
        }
    }
}

impl CleanConfig {
    pub fn new(iqr_multiplier: Option<f64>, boundary_fill: Option<BoundaryFill>) -> Self {
        let default = Self::default();
        Self {
            iqr_multiplier: iqr_multiplier.unwrap_or(default.iqr_multiplier),
            boundary_fill: boundary_fill.unwrap_or(default.boundary_fill),
        }
    }
}
