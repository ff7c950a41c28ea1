//! Column-name reconciliation and cell coercion.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::input::DataTable;

/// Known header synonyms, applied after lower-casing and trimming.
const SYNONYMS: &[(&str, &str)] = &[("total", "registrations"), ("maker", "manufacturer")];

pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const QUARTER: &str = "quarter";
pub const PERIOD: &str = "period";
pub const DATE: &str = "date";
pub const CATEGORY: &str = "vehicle_category";
pub const MANUFACTURER: &str = "manufacturer";
pub const REGISTRATIONS: &str = "registrations";

/// Lower-case, trim and apply synonym renames.
pub fn normalize_column_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| to.to_string())
        .unwrap_or(lowered)
}

/// Canonical column name to position in the source row.
///
/// When two headers normalize to the same name the first one wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: IndexMap<String, usize>,
}

impl ColumnIndex {
    /// Build the index from raw headers.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = IndexMap::new();
        for (i, header) in headers.iter().enumerate() {
            positions.entry(normalize_column_name(header)).or_insert(i);
        }
        Self { positions }
    }

    /// Build the index for a parsed table.
    pub fn for_table(table: &DataTable) -> Self {
        Self::from_headers(&table.headers)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Cell for a canonical column, if the column exists.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.position(name)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
    }
}

/// Parse a year cell. Accepts `2021` and `2021.0`; anything else is `None`.
pub fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if DataTable::is_null_value(trimmed) {
        return None;
    }

    let year = match trimmed.parse::<i32>() {
        Ok(y) => y,
        Err(_) => {
            let f = trimmed.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 || f.abs() > i32::MAX as f64 {
                return None;
            }
            f as i32
        }
    };

    NaiveDate::from_ymd_opt(year, 1, 1).map(|_| year)
}

/// Parse a registration count.
///
/// Thousands separators and whitespace are stripped. Unparseable, negative
/// or non-finite values become `0.0`.
pub fn parse_registrations(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

const MONTH_NAMES: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a month cell: `1`-`12`, `01`, or an English month name.
pub fn parse_month(value: &str) -> Option<u32> {
    let trimmed = value.trim().to_lowercase();
    if let Ok(m) = trimmed.parse::<u32>() {
        return (1..=12).contains(&m).then_some(m);
    }
    if trimmed.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| trimmed.starts_with(name))
        .map(|i| i as u32 + 1)
}

/// Parse a quarter cell: `1`-`4` or `Q1`-`Q4`.
pub fn parse_quarter(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('Q')
        .or_else(|| trimmed.strip_prefix('q'))
        .unwrap_or(trimmed);
    digits
        .parse::<u32>()
        .ok()
        .filter(|q| (1..=4).contains(q))
}

/// Parse an ISO date (`2023-04-01`, `2023-04-01T00:00:00`, `2023-04`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Some(head) = trimmed.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(d);
        }
    }
    NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d").ok()
}
