use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataError;
use super::model::{is_missing_marker, CellValue, Dataset, LoadReport, Observation};
use super::schema;

/// Where `load_and_clean_data` reads from, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/covid_data.csv";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and clean the dataset at [`DEFAULT_DATA_PATH`].
pub fn load_and_clean_data() -> Result<Dataset, DataError> {
    load_file(Path::new(DEFAULT_DATA_PATH))
}

/// Load and clean a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-separated text with a header row
/// * `.parquet` – any flat Parquet table; cells are rendered to text first
pub fn load_file(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv_table(open(path)?, path)?,
        "parquet" | "pq" => read_parquet_table(path)?,
        other => return Err(DataError::schema(format!("unsupported file extension: .{other}"))),
    };

    let dataset = clean_table(table)?;
    let report = dataset.load_report();
    log::info!(
        "Loaded {} observations for {} locations from {}",
        dataset.len(),
        dataset.locations().len(),
        path.display()
    );
    if report.rows_dropped > 0 {
        log::warn!(
            "Dropped {} of {} rows with unparsable dates from {}",
            report.rows_dropped,
            report.rows_read,
            path.display()
        );
    }
    Ok(dataset)
}

/// Run the cleaning pipeline over CSV text from any reader.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, DataError> {
    clean_table(read_csv_table(reader, Path::new("<reader>"))?)
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::DataSource {
        path: path.to_path_buf(),
        source,
    })
}

/// I/O failures while streaming are source errors; anything else means the
/// text is not a usable table.
fn csv_error(origin: &Path, err: csv::Error) -> DataError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataError::DataSource {
            path: origin.to_path_buf(),
            source,
        },
        kind => DataError::schema(format!("{}: malformed CSV: {kind:?}", origin.display())),
    }
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// Headers and text cells exactly as read, before any cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// `None` marks an empty or null cell.
    pub rows: Vec<Vec<Option<String>>>,
}

/// CSV layout: one header row, then records. Short records are padded with
/// empty cells; records longer than the header are rejected.
fn read_csv_table<R: Read>(reader: R, origin: &Path) -> Result<RawTable, DataError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(origin, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(origin, e))?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(DataError::schema(format!(
                "{}: line {line}: expected {} fields, found {}",
                origin.display(),
                headers.len(),
                record.len()
            )));
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Read every record batch of a Parquet file, formatting each cell as text so
/// the CSV cleaning rules apply unchanged.
fn read_parquet_table(path: &Path) -> Result<RawTable, DataError> {
    let file = open(path)?;
    let parquet_err = |e: parquet::errors::ParquetError| {
        DataError::schema(format!("{}: {e}", path.display()))
    };
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::schema(format!("{}: reading record batch: {e}", path.display())))?;

        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataError::schema(format!("{}: {e}", path.display())))?;

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&formatters)
                .map(|(col, fmt)| {
                    if col.is_null(row) {
                        None
                    } else {
                        let text = fmt.value(row).to_string();
                        (!text.trim().is_empty()).then(|| text.trim().to_string())
                    }
                })
                .collect();
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Normalize and rename headers, parse dates, drop undated rows.
pub fn clean_table(table: RawTable) -> Result<Dataset, DataError> {
    if table.headers.is_empty() {
        return Err(DataError::schema("table has no columns"));
    }

    let columns = schema::canonicalize_headers(&table.headers);
    for (i, col) in columns.iter().enumerate() {
        if columns[..i].contains(col) {
            return Err(DataError::schema(format!(
                "more than one source column maps to '{col}'"
            )));
        }
    }

    let position = |name: &str| columns.iter().position(|c| c == name);
    let date_idx = position(schema::DATE)
        .ok_or_else(|| DataError::schema(format!("missing required column '{}'", schema::DATE)))?;
    let location_idx = position(schema::LOCATION).ok_or_else(|| {
        DataError::schema(format!("missing required column '{}'", schema::LOCATION))
    })?;
    let code_idx = position(schema::COUNTRY_CODE);

    let mut report = LoadReport {
        rows_read: table.rows.len(),
        ..LoadReport::default()
    };
    let mut observations = Vec::with_capacity(table.rows.len());

    for row in table.rows {
        let cell = |idx: usize| row.get(idx).and_then(|c| c.as_deref());
        let Some(date) = cell(date_idx).and_then(parse_date) else {
            report.rows_dropped += 1;
            continue;
        };

        let mut obs = Observation::new(date, cell(location_idx).unwrap_or_default());
        obs.country_code = code_idx.and_then(cell).map(str::to_string);

        for (col_idx, cell) in row.into_iter().enumerate() {
            if col_idx == date_idx || col_idx == location_idx || Some(col_idx) == code_idx {
                continue;
            }
            let Some(name) = columns.get(col_idx) else {
                break;
            };
            if let Some(slot) = obs.count_mut(name) {
                let text = cell.as_deref().filter(|s| !is_missing_marker(s));
                *slot = match text.map(parse_count) {
                    Some(Some(v)) => Some(v),
                    Some(None) => {
                        report.invalid_numeric_cells += 1;
                        None
                    }
                    None => None,
                };
            } else {
                let value = cell.as_deref().map(CellValue::guess).unwrap_or(CellValue::Null);
                obs.extra.insert(name.clone(), value);
            }
        }

        observations.push(obs);
    }

    if report.invalid_numeric_cells > 0 {
        log::warn!(
            "{} count cells were not integers and are treated as missing",
            report.invalid_numeric_cells
        );
    }

    Ok(Dataset::from_observations(observations, columns, report))
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date; `None` for anything unrecognised.
///
/// Date-times keep the date part as written, whatever the offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Parse an integer count, accepting whole-number decimals such as `500.0`.
/// Missing-value markers are filtered out before this is called.
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
