//! Writes a deterministic WHO-style dataset to `data/covid_data.csv` and
//! `data/covid_data.parquet`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const HEADERS: [&str; 8] = [
    "Date_reported",
    "Country_code",
    "Country",
    "WHO_region",
    "New_cases",
    "Cumulative_cases",
    "New_deaths",
    "Cumulative_deaths",
];

/// (code, name, region, population scale, wave peaks as day offsets)
const COUNTRIES: [(&str, &str, &str, f64, &[usize]); 4] = [
    ("IN", "India", "SEARO", 40_000.0, &[150, 420, 720]),
    ("BR", "Brazil", "AMRO", 25_000.0, &[200, 430, 740]),
    ("DE", "Germany", "EURO", 12_000.0, &[90, 330, 700]),
    ("ZA", "South Africa", "AFRO", 6_000.0, &[180, 380, 690]),
];

const DAYS: usize = 800;

fn wave(day: usize, peaks: &[usize], scale: f64) -> f64 {
    peaks
        .iter()
        .enumerate()
        .map(|(k, &mu)| {
            let sigma = 25.0 + 10.0 * k as f64;
            let amplitude = scale * (1.0 + 0.6 * k as f64);
            amplitude * (-((day as f64 - mu as f64).powi(2)) / (2.0 * sigma.powi(2))).exp()
        })
        .sum()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative noise in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

/// One output row; `None` cells are written empty.
struct Row {
    date: String,
    code: &'static str,
    country: &'static str,
    region: &'static str,
    new_cases: Option<i64>,
    total_cases: i64,
    new_deaths: Option<i64>,
    total_deaths: i64,
}

fn generate(rng: &mut SimpleRng) -> Result<Vec<Row>> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 3).context("invalid start date")?;
    let mut rows = Vec::new();

    for &(code, country, region, scale, peaks) in &COUNTRIES {
        let mut total_cases = 0i64;
        let mut total_deaths = 0i64;
        for day in 0..DAYS {
            let cases = (wave(day, peaks, scale) * rng.jitter(0.25)).round().max(0.0) as i64;
            let deaths = (cases as f64 * 0.015 * rng.jitter(0.4)).round() as i64;
            total_cases += cases;
            total_deaths += deaths;

            // Reporting gaps: a missing daily figure every 97th day.
            let reported = day % 97 != 96;
            rows.push(Row {
                date: (start + Duration::days(day as i64)).to_string(),
                code,
                country,
                region,
                new_cases: reported.then_some(cases),
                total_cases,
                new_deaths: reported.then_some(deaths),
                total_deaths,
            });
        }

        // A malformed date the loader is expected to drop.
        rows.push(Row {
            date: "not-a-date".to_string(),
            code,
            country,
            region,
            new_cases: Some(0),
            total_cases,
            new_deaths: Some(0),
            total_deaths,
        });
    }
    Ok(rows)
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    let opt = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
    for r in rows {
        writer.write_record([
            r.date.clone(),
            r.code.to_string(),
            r.country.to_string(),
            r.region.to_string(),
            opt(r.new_cases),
            r.total_cases.to_string(),
            opt(r.new_deaths),
            r.total_deaths.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let strings = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Row) -> Option<i64>| -> ArrayRef {
        let mut b = Int64Builder::with_capacity(rows.len());
        for r in rows {
            b.append_option(f(r));
        }
        Arc::new(b.finish())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Utf8, false),
        Field::new(HEADERS[4], DataType::Int64, true),
        Field::new(HEADERS[5], DataType::Int64, true),
        Field::new(HEADERS[6], DataType::Int64, true),
        Field::new(HEADERS[7], DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|r| r.date.as_str()),
            strings(|r| r.code),
            strings(|r| r.country),
            strings(|r| r.region),
            ints(|r| r.new_cases),
            ints(|r| Some(r.total_cases)),
            ints(|r| r.new_deaths),
            ints(|r| Some(r.total_deaths)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng)?;

    let dir = Path::new("data");
    std::fs::create_dir_all(dir).context("creating data directory")?;
    let csv_path = dir.join("covid_data.csv");
    let parquet_path = dir.join("covid_data.parquet");

    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} rows for {} countries to {} and {}",
        rows.len(),
        COUNTRIES.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
