use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Spacing of the future dates appended by a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[strum(serialize = "daily")]
    Daily,
    #[strum(serialize = "weekly")]
    Weekly,
    /// Month-end dates
    #[default]
    #[strum(serialize = "monthly")]
    Monthly,
    #[strum(serialize = "month_start")]
    MonthStart,
}

/// How to fill a gap that has a known neighbour on one side only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryFill {
    /// Copy the closest known value
    #[default]
    #[strum(serialize = "nearest")]
    Nearest,
    #[strum(serialize = "reject")]
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cadence_parse() {
        assert_eq!(Cadence::from_str("monthly").unwrap(), Cadence::Monthly);
        assert_eq!(Cadence::from_str("month_start").unwrap(), Cadence::MonthStart);
        assert!(Cadence::from_str("M").is_err());
        assert_eq!(Cadence::default(), Cadence::Monthly);
    }

    #[test]
    fn test_boundary_fill_display() {
        assert_eq!(BoundaryFill::Nearest.to_string(), "nearest");
        assert_eq!(BoundaryFill::from_str("reject").unwrap(), BoundaryFill::Reject);
    }
}
