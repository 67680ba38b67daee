//! CSV export of the yearly cash-flow projection.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::projection::YearProjection;

/// Column header of the projection export.
const HEADER: &str = "year,energy_price_eur_per_kwh,incremental_value_eur,feed_in_eur,\
                      community_eur,deduction_eur,bill_savings_eur,benefit_eur,\
                      total_eur,cumulative_total_eur";

/// Exports the projection to a CSV file at the given path.
///
/// Writes a header row followed by one data row per projected year.
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `rows` - Yearly projection, usually 20 rows
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(rows: &[YearProjection], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes the projection as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(rows: &[YearProjection], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.year.to_string(),
            format!("{:.4}", r.energy_price_eur_per_kwh),
            format!("{:.2}", r.incremental_value_eur),
            format!("{:.2}", r.feed_in_eur),
            format!("{:.2}", r.community_eur),
            format!("{:.2}", r.deduction_eur),
            format!("{:.2}", r.bill_savings_eur),
            format!("{:.2}", r.benefit_eur),
            format!("{:.2}", r.total_eur),
            format!("{:.2}", r.cumulative_total_eur),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
