//! Aggregation functions applied to groups of metric values.
use std::{fmt, str::FromStr};

use crate::error::Error;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Min,
    Max,
    Average,
}

impl Statistic {
    // ---
    /// Apply the statistic to `values`, in order.
    ///
    /// Empty input yields `0.0` for `Sum` and `Average` and `NaN` for
    /// `Min`/`Max`. Groups built from fetched readings are never empty.
    pub fn compute(self, values: &[f64]) -> f64 {
        // ---
        match self {
            Self::Sum => values.iter().sum(),
            Self::Min => values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
            Self::Max => values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
            Self::Average if values.is_empty() => 0.0,
            Self::Average => values.iter().sum::<f64>() / values.len() as f64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Average => "average",
        }
    }
}

impl FromStr for Statistic {
    type Err = Error;

    /// Case-insensitive parse of `sum`, `min`, `max` or `average`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "average" => Ok(Self::Average),
            _ => Err(Error::InvalidStatistic(s.to_string())),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const READINGS: [f64; 3] = [10.0, 20.0, 30.0];

    #[test]
    fn test_statistics_over_readings() {
        // ---
        assert_eq!(Statistic::Sum.compute(&READINGS), 60.0);
        assert_eq!(Statistic::Max.compute(&READINGS), 30.0);
        assert_eq!(Statistic::Min.compute(&READINGS), 10.0);
        assert_eq!(Statistic::Average.compute(&READINGS), 20.0);
    }

    #[test]
    fn test_single_value() {
        // ---
        for stat in [Statistic::Sum, Statistic::Min, Statistic::Max, Statistic::Average] {
            assert_eq!(stat.compute(&[22.5]), 22.5, "{stat}");
        }
    }

    #[test]
    fn test_negative_values() {
        // ---
        let values = [-5.0, 3.0, -12.5];
        assert_eq!(Statistic::Min.compute(&values), -12.5);
        assert_eq!(Statistic::Max.compute(&values), 3.0);
        assert_eq!(Statistic::Sum.compute(&values), -14.5);
    }

    #[test]
    fn test_empty_group() {
        // ---
        assert_eq!(Statistic::Sum.compute(&[]), 0.0);
        assert_eq!(Statistic::Average.compute(&[]), 0.0);
        assert!(Statistic::Min.compute(&[]).is_nan());
        assert!(Statistic::Max.compute(&[]).is_nan());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        // ---
        assert_eq!("Average".parse::<Statistic>().unwrap(), Statistic::Average);
        assert_eq!("average".parse::<Statistic>().unwrap(), Statistic::Average);
        assert_eq!("SUM".parse::<Statistic>().unwrap(), Statistic::Sum);
        assert_eq!("mAx".parse::<Statistic>().unwrap(), Statistic::Max);
        assert_eq!("Min".parse::<Statistic>().unwrap(), Statistic::Min);
    }

    #[test]
    fn test_unknown_statistic_rejected() {
        // ---
        for name in ["median", "", "avg", "count"] {
            match name.parse::<Statistic>() {
                Err(Error::InvalidStatistic(s)) => assert_eq!(s, name),
                other => panic!("expected InvalidStatistic for {name:?}, got {other:?}"),
            }
        }
    }
}
