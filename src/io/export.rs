//! CSV export for dispatch schedules.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::evaluate::EnergyBalanceRecord;
use crate::model::DispatchSchedule;

/// Column header for schedule CSV export.
const HEADER: &str = "t,charge_power,discharge_power,grid_import,grid_export,\
                      curtailment,state_of_charge,cost,balance_residual,balanced";

/// Exports a schedule with its energy balance to a CSV file.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `schedule` - Solved schedule
/// * `balance` - Per-step balance records from the evaluator
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(
    schedule: &DispatchSchedule,
    balance: &[EnergyBalanceRecord],
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(schedule, balance, buf)
}

/// Writes a schedule as CSV to any writer.
///
/// Steps without a matching balance record leave the last three columns empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(
    schedule: &DispatchSchedule,
    balance: &[EnergyBalanceRecord],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (i, s) in schedule.iter().enumerate() {
        let (cost, residual, balanced) = balance
            .get(i)
            .map(|r| {
                (
                    format!("{:.6}", r.cost),
                    format!("{:.6}", r.residual),
                    r.balanced.to_string(),
                )
            })
            .unwrap_or_default();
        wtr.write_record(&[
            s.t.to_string(),
            format!("{:.4}", s.charge_power),
            format!("{:.4}", s.discharge_power),
            format!("{:.4}", s.grid_import),
            format!("{:.4}", s.grid_export),
            format!("{:.4}", s.curtailment),
            format!("{:.4}", s.state_of_charge),
            cost,
            residual,
            balanced,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
