// ---------------------------------------------------------------------------
// Canonical field names
// ---------------------------------------------------------------------------

pub const DATE: &str = "date";
pub const LOCATION: &str = "location";
pub const COUNTRY_CODE: &str = "country_code";
pub const NEW_CASES: &str = "new_cases";
pub const TOTAL_CASES: &str = "total_cases";
pub const NEW_DEATHS: &str = "new_deaths";
pub const TOTAL_DEATHS: &str = "total_deaths";

pub const NEW_CASES_7D_AVG: &str = "new_cases_7d_avg";
pub const NEW_DEATHS_7D_AVG: &str = "new_deaths_7d_avg";

/// Integer count fields carried by every observation.
pub const COUNT_FIELDS: [&str; 4] = [NEW_CASES, TOTAL_CASES, NEW_DEATHS, TOTAL_DEATHS];

/// Normalized source header → canonical field name.
///
/// Headers not listed here are kept as they are after normalization.
pub const RENAME_MAP: [(&str, &str); 7] = [
    ("date_reported", DATE),
    ("country", LOCATION),
    ("new_cases", NEW_CASES),
    ("cumulative_cases", TOTAL_CASES),
    ("new_deaths", NEW_DEATHS),
    ("cumulative_deaths", TOTAL_DEATHS),
    ("country_code", COUNTRY_CODE),
];

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Trim, lowercase and replace every space with `_`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Map a normalized header to its canonical name.
pub fn canonical_name(normalized: &str) -> &str {
    RENAME_MAP
        .iter()
        .find(|(source, _)| *source == normalized)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(normalized)
}

/// Normalize then rename a whole header row, preserving order.
pub fn canonicalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|h| canonical_name(&normalize_header(h.as_ref())).to_string())
        .collect()
}

/// Whether `field` is one of the typed count fields.
pub fn is_count_field(field: &str) -> bool {
    COUNT_FIELDS.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_whitespace_and_spaces() {
        assert_eq!(normalize_header("  Date Reported "), "date_reported");
        assert_eq!(normalize_header("New_Cases"), "new_cases");
        assert_eq!(normalize_header("WHO region"), "who_region");
    }

    #[test]
    fn normalization_is_idempotent() {
        for h in ["  Cumulative Deaths", "Country_code", "A  B", "\tx y\t"] {
            let once = normalize_header(h);
            assert_eq!(normalize_header(&once), once);
        }
    }

    #[test]
    fn renames_known_headers_and_keeps_the_rest() {
        let headers = canonicalize_headers(&[
            "Date_reported",
            "Country_code",
            "Country",
            "WHO_region",
            "New_cases",
            "Cumulative_cases",
            "New_deaths",
            "Cumulative_deaths",
        ]);
        assert_eq!(
            headers,
            vec![
                "date",
                "country_code",
                "location",
                "who_region",
                "new_cases",
                "total_cases",
                "new_deaths",
                "total_deaths",
            ]
        );
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        for (_, canonical) in RENAME_MAP {
            assert_eq!(canonical_name(canonical), canonical);
        }
    }
}
