//! Free-text vehicle type to category.

use crate::schema::VehicleCategory;

const TWO_WHEELER: &[&str] = &["two", "2w"];
const THREE_WHEELER: &[&str] = &["three", "3w", "auto"];
const FOUR_WHEELER: &[&str] = &["four", "4w", "car", "jeep"];

/// Classify a vehicle-type string.
///
/// Case-insensitive substring match, rules checked in order 2W, 3W, 4W;
/// the first rule that matches wins and anything else is `OTHER`.
pub fn classify(text: &str) -> VehicleCategory {
    let s = text.to_lowercase();
    let matches = |needles: &[&str]| needles.iter().any(|n| s.contains(n));

    if matches(TWO_WHEELER) {
        VehicleCategory::TwoWheeler
    } else if matches(THREE_WHEELER) {
        VehicleCategory::ThreeWheeler
    } else if matches(FOUR_WHEELER) {
        VehicleCategory::FourWheeler
    } else {
        VehicleCategory::Other
    }
}
