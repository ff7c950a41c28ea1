//! Human-readable number formatting for terminal output.

/// Compact magnitude: `1.23B`, `4.56M`, `7.8K`, or the integer part below a thousand.
pub fn format_big_number(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    if x >= 1e9 {
        format!("{:.2}B", x / 1e9)
    } else if x >= 1e6 {
        format!("{:.2}M", x / 1e6)
    } else if x >= 1e3 {
        format!("{:.1}K", x / 1e3)
    } else {
        format!("{}", x.trunc() as i64)
    }
}

/// Percentage with two decimals, or `N/A` when there is no value.
pub fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p.is_finite() => format!("{:.2}%", p),
        _ => "N/A".to_string(),
    }
}
