//! Units offered in the line-item unit picker.
//!
//! The unit field is free text; this list only drives suggestions and a debug
//! note when a row uses something else.

/// Check whether `unit` is one of the common picker units (case-sensitive).
pub fn is_common_unit(unit: &str) -> bool {
    COMMON_UNITS.binary_search(&unit).is_ok()
}

/// All picker units, sorted.
pub fn common_units() -> &'static [&'static str] {
    COMMON_UNITS
}

/// Sorted for binary search.
static COMMON_UNITS: &[&str] = &[
    "Bag",   // Bag
    "Box",   // Box
    "Days",  // Days (services)
    "Dozen", // Dozen
    "Feet",  // Feet
    "Gm",    // Gram
    "Hrs",   // Hours (services)
    "Kg",    // Kilogram
    "Km",    // Kilometre
    "Ltr",   // Litre
    "Ml",    // Millilitre
    "Mtr",   // Metre
    "Nos",   // Numbers (pieces), the default
    "Pair",  // Pair
    "Pcs",   // Pieces
    "Roll",  // Roll
    "Set",   // Set
    "Sqft",  // Square feet
    "Sqm",   // Square metre
    "Ton",   // Metric ton
    "Unit",  // Unit
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_units() {
        assert!(is_common_unit("Nos"));
        assert!(is_common_unit("Kg"));
        assert!(is_common_unit("Ltr"));
        assert!(is_common_unit("Sqft"));
    }

    #[test]
    fn unknown_units() {
        assert!(!is_common_unit("nos"));
        assert!(!is_common_unit(""));
        assert!(!is_common_unit("Barrel"));
    }

    #[test]
    fn list_is_sorted() {
        for window in COMMON_UNITS.windows(2) {
            assert!(
                window[0] < window[1],
                "units not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }
}
