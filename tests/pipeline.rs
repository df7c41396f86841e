//! End-to-end tests of the cleaning pipeline and the per-country report.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use covid_dashboard::data::loader::{load_csv_reader, load_file};
use covid_dashboard::data::metrics::rolling_average;
use covid_dashboard::report::CountryReport;
use covid_dashboard::DataError;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ──────────────────────────────────────────────
// Scenarios
// ──────────────────────────────────────────────

#[test]
fn single_row_is_mapped_to_canonical_fields() {
    let csv = "Date Reported,Country,New_Cases,Cumulative_Cases,New_Deaths,Cumulative_Deaths\n\
               2021-03-05,India,500,10000,10,200\n";
    let ds = load_csv_reader(csv.as_bytes()).unwrap();

    assert_eq!(
        ds.columns(),
        ["date", "location", "new_cases", "total_cases", "new_deaths", "total_deaths"]
    );
    assert_eq!(ds.len(), 1);
    let obs = &ds.observations()[0];
    assert_eq!(obs.date, date(2021, 3, 5));
    assert_eq!(obs.location, "India");
    assert_eq!(obs.new_cases, Some(500));
    assert_eq!(obs.total_cases, Some(10000));
    assert_eq!(obs.new_deaths, Some(10));
    assert_eq!(obs.total_deaths, Some(200));
}

#[test]
fn unparsable_date_row_is_dropped_without_error() {
    let csv = "Date Reported,Country,New_Cases,Cumulative_Cases,New_Deaths,Cumulative_Deaths\n\
               not-a-date,India,10,10,0,0\n";
    let ds = load_csv_reader(csv.as_bytes()).unwrap();
    assert!(ds.is_empty());
    assert_eq!(ds.load_report().rows_dropped, 1);
}

#[test]
fn seven_identical_values_average_to_the_value() {
    let series = vec![Some(100.0); 7];
    assert_eq!(
        rolling_average(&series, 7),
        vec![None, None, None, None, None, None, Some(100.0)]
    );
}

// ──────────────────────────────────────────────
// Fixture file
// ──────────────────────────────────────────────

#[test]
fn fixture_loads_with_every_row_dated() {
    let ds = load_file(&fixture("who_sample.csv")).unwrap();

    let report = ds.load_report();
    assert_eq!(report.rows_read, 14);
    assert_eq!(report.rows_dropped, 2);
    assert_eq!(ds.len(), 12);

    let locations: Vec<&str> = ds.locations().iter().map(String::as_str).collect();
    assert_eq!(locations, ["India", "Peru"]);
    assert!(ds.has_column("country_code"));
    assert!(ds.has_column("who_region"));
    assert_eq!(
        ds.numeric_columns(),
        ["new_cases", "total_cases", "new_deaths", "total_deaths"]
    );
    assert!(ds
        .observations()
        .iter()
        .all(|o| o.country_code.is_some()));
}

#[test]
fn view_is_sorted_and_leaves_the_dataset_untouched() {
    let ds = load_file(&fixture("who_sample.csv")).unwrap();
    let before = ds.observations().to_vec();

    let peru = ds.view("Peru");
    assert_eq!(
        peru.dates(),
        vec![date(2021, 3, 1), date(2021, 3, 2), date(2021, 3, 3), date(2021, 3, 4)]
    );
    assert!(peru.observations().iter().all(|o| o.location == "Peru"));
    assert_eq!(ds.observations(), before.as_slice());
}

#[test]
fn missing_daily_value_blanks_the_covering_averages() {
    let ds = load_file(&fixture("who_sample.csv")).unwrap();
    let report = CountryReport::build(&ds, "India", 7);
    let avg = report.new_cases_avg.unwrap();
    assert_eq!(avg.len(), 8);
    assert!(avg.iter().all(Option::is_none));
}

#[test]
fn zero_filled_view_matches_the_console_report() {
    let ds = load_file(&fixture("who_sample.csv")).unwrap();
    let report = CountryReport::from_view(ds.view("India").zero_filled(), 7);
    let avg = report.new_cases_avg.as_ref().unwrap();
    assert!(avg[..6].iter().all(Option::is_none));
    assert!((avg[6].unwrap() - 2990.0 / 7.0).abs() < 1e-9);
    assert!((avg[7].unwrap() - 3260.0 / 7.0).abs() < 1e-9);

    let summary = report.summary();
    assert_eq!(summary.total_cases, Some(11960));
    assert_eq!(summary.total_deaths, Some(238));
    let peak = summary.peak_new_cases.unwrap();
    assert_eq!((peak.date, peak.value), (date(2021, 3, 7), 700.0));
}

#[test]
fn key_correlation_is_symmetric_with_unit_diagonal() {
    let ds = load_file(&fixture("who_sample.csv")).unwrap();
    let report = CountryReport::build(&ds, "India", 7);
    let m = report.key_correlation().unwrap();
    for a in m.fields() {
        assert_eq!(m.get(a, a), Some(1.0));
        for b in m.fields() {
            assert_eq!(m.get(a, b), m.get(b, a));
            if let Some(r) = m.get(a, b) {
                assert!((-1.0..=1.0).contains(&r));
            }
        }
    }
}

#[test]
fn correlation_with_one_row_is_undefined_not_a_crash() {
    let csv = "Date_reported,Country,New_cases,New_deaths\n2021-01-01,India,5,1\n";
    let ds = load_csv_reader(csv.as_bytes()).unwrap();
    let m = CountryReport::build(&ds, "India", 7).key_correlation().unwrap();
    assert_eq!(m.get("new_cases", "new_deaths"), None);
    assert_eq!(m.get("new_cases", "new_cases"), None);
}

#[test]
fn single_numeric_column_is_insufficient_for_correlation() {
    let csv = "Date_reported,Country,New_cases\n2021-01-01,India,5\n2021-01-02,India,6\n";
    let ds = load_csv_reader(csv.as_bytes()).unwrap();
    let err = CountryReport::build(&ds, "India", 7).key_correlation().unwrap_err();
    assert!(!err.is_fatal());
    assert!(matches!(err, DataError::InsufficientData { .. }));
}

// ──────────────────────────────────────────────
// Failure modes
// ──────────────────────────────────────────────

#[test]
fn missing_file_names_the_resource() {
    let path = Path::new("tests/fixtures/does_not_exist.csv");
    let err = load_file(path).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, DataError::DataSource { .. }));
    assert!(err.to_string().contains("does_not_exist.csv"));
}

#[test]
fn empty_file_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "").unwrap();
    let err = load_file(&path).unwrap_err();
    assert!(matches!(err, DataError::Schema(_)), "{err}");
}
