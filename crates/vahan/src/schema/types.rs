//! Core type definitions for categories and time granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::VahanError;

/// Closed set of vehicle categories.
///
/// Variant order matches the lexical order of the labels, so sorting by
/// category sorts the same way the exported strings do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleCategory {
    /// Two-wheelers (scooters, motorcycles).
    #[serde(rename = "2W")]
    TwoWheeler,
    /// Three-wheelers (auto-rickshaws).
    #[serde(rename = "3W")]
    ThreeWheeler,
    /// Four-wheelers (cars, jeeps).
    #[serde(rename = "4W")]
    FourWheeler,
    /// Anything the classifier does not recognise.
    #[serde(rename = "OTHER")]
    Other,
}

impl VehicleCategory {
    /// All categories in sort order.
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::TwoWheeler,
        VehicleCategory::ThreeWheeler,
        VehicleCategory::FourWheeler,
        VehicleCategory::Other,
    ];

    /// Label used in tables and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "2W",
            VehicleCategory::ThreeWheeler => "3W",
            VehicleCategory::FourWheeler => "4W",
            VehicleCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = VahanError;

    /// Parses an exact label (`2W`, `3W`, `4W`, `OTHER`), case-insensitively.
    ///
    /// Free text goes through [`crate::normalize::classify`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2W" => Ok(VehicleCategory::TwoWheeler),
            "3W" => Ok(VehicleCategory::ThreeWheeler),
            "4W" => Ok(VehicleCategory::FourWheeler),
            "OTHER" => Ok(VehicleCategory::Other),
            _ => Err(VahanError::Config(format!(
                "Unknown vehicle category: {}. Use 2W, 3W, 4W or OTHER.",
                s
            ))),
        }
    }
}

/// Time-bucket width used for aggregation.
///
/// Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Truncate a date to the start of its enclosing bucket.
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            Granularity::Monthly => date.month(),
            Granularity::Quarterly => (date.month0() / 3) * 3 + 1,
            Granularity::Yearly => 1,
        };
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
    }

    /// Number of buckets in one year; the trailing offset used for YoY.
    pub fn periods_per_year(&self) -> usize {
        match self {
            Granularity::Monthly => 12,
            Granularity::Quarterly => 4,
            Granularity::Yearly => 1,
        }
    }

    /// True if `date` already sits on a bucket boundary.
    pub fn is_boundary(&self, date: NaiveDate) -> bool {
        self.bucket(date) == date
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Monthly => write!(f, "monthly"),
            Granularity::Quarterly => write!(f, "quarterly"),
            Granularity::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Granularity {
    type Err = VahanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "monthly" | "month" => Ok(Granularity::Monthly),
            "q" | "quarterly" | "quarter" => Ok(Granularity::Quarterly),
            "y" | "yearly" | "year" | "annual" => Ok(Granularity::Yearly),
            _ => Err(VahanError::UnsupportedFrequency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_bucket_truncation() {
        let date = d(2023, 8, 17);
        assert_eq!(Granularity::Monthly.bucket(date), d(2023, 8, 1));
        assert_eq!(Granularity::Quarterly.bucket(date), d(2023, 7, 1));
        assert_eq!(Granularity::Yearly.bucket(date), d(2023, 1, 1));
    }

    #[test]
    fn test_quarter_edges() {
        assert_eq!(Granularity::Quarterly.bucket(d(2023, 3, 31)), d(2023, 1, 1));
        assert_eq!(Granularity::Quarterly.bucket(d(2023, 4, 1)), d(2023, 4, 1));
        assert_eq!(Granularity::Quarterly.bucket(d(2023, 12, 31)), d(2023, 10, 1));
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("M".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!("quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert_eq!(" y ".parse::<Granularity>().unwrap(), Granularity::Yearly);
        assert!(matches!(
            "W".parse::<Granularity>(),
            Err(VahanError::UnsupportedFrequency(_))
        ));
    }

    #[test]
    fn test_category_order_matches_labels() {
        let mut labels: Vec<&str> = VehicleCategory::ALL.iter().map(|c| c.as_str()).collect();
        labels.sort();
        let ordered: Vec<&str> = VehicleCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, ordered);
    }

    #[test]
    fn test_category_serde_labels() {
        let json = serde_json::to_string(&VehicleCategory::TwoWheeler).unwrap();
        assert_eq!(json, "\"2W\"");
        let back: VehicleCategory = serde_json::from_str("\"OTHER\"").unwrap();
        assert_eq!(back, VehicleCategory::Other);
    }
}
