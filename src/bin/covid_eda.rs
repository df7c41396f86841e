//! Console analysis of one country: shapes, summary statistics, correlation,
//! peak and totals.

use anyhow::{Context, Result};

use covid_dashboard::config::DashboardConfig;
use covid_dashboard::data::loader;
use covid_dashboard::data::metrics::CorrelationMatrix;
use covid_dashboard::report::{format_optional_float, CountryReport, NOT_AVAILABLE};

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let dataset = loader::load_file(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    println!("Raw shape: ({}, {})", dataset.len(), dataset.columns().len());

    let country = if dataset.locations().contains(&config.default_location) {
        config.default_location.clone()
    } else {
        let first = dataset
            .locations()
            .iter()
            .next()
            .cloned()
            .context("dataset has no locations")?;
        log::warn!(
            "'{}' not found in the data, analysing '{first}' instead",
            config.default_location
        );
        first
    };

    let view = dataset.view(&country).zero_filled();
    println!("Country data shape: ({}, {})", view.len(), dataset.columns().len());

    let report = CountryReport::from_view(view, config.rolling_window);

    println!("\nSummary statistics:");
    print_summary_statistics(&report);

    match report.key_correlation() {
        Ok(matrix) => {
            println!("\nCorrelation matrix:");
            print_matrix(&matrix);
        }
        Err(e) => log::info!("Correlation matrix skipped: {e}"),
    }

    println!();
    println!("{}", report.summary());
    Ok(())
}

fn print_summary_statistics(report: &CountryReport) {
    let stats = report.describe_all();
    let width = stats.iter().map(|(name, _)| name.len()).max().unwrap_or(0).max(8);

    println!(
        "{:<width$} {:>8} {:>14} {:>14} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (name, result) in &stats {
        match result {
            Ok(s) => println!(
                "{:<width$} {:>8} {:>14.2} {:>14} {:>12.1} {:>12.1} {:>12.1} {:>12.1} {:>12.1}",
                name,
                s.count,
                s.mean,
                format_optional_float(s.std, 2),
                s.min,
                s.q25,
                s.median,
                s.q75,
                s.max
            ),
            Err(_) => println!("{name:<width$} {:>8} {NOT_AVAILABLE}", 0),
        }
    }
}

fn print_matrix(matrix: &CorrelationMatrix) {
    let fields = matrix.fields();
    let width = fields.iter().map(String::len).max().unwrap_or(0);

    print!("{:<width$}", "");
    for f in fields {
        print!(" {f:>14}");
    }
    println!();
    for (i, row) in fields.iter().enumerate() {
        print!("{row:<width$}");
        for j in 0..fields.len() {
            let cell = matrix
                .at(i, j)
                .map(|r| format!("{r:.6}"))
                .unwrap_or_else(|| "NaN".to_string());
            print!(" {cell:>14}");
        }
        println!();
    }
}
