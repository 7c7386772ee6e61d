//! Load plans, rate tables and prepayment tables from flat files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::info;

use super::params::RateSchedule;
use super::plan::LoanPlan;
use crate::amortization::PrepaymentEvent;
use crate::error::{LoanError, Result};

/// Raw CSV row of a rate table (`period,annual_rate`)
#[derive(Debug, serde::Deserialize)]
struct RateRow {
    period: u32,
    annual_rate: f64,
}

/// Load a single plan from a JSON file
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<LoanPlan> {
    let file = File::open(path.as_ref())?;
    let plan: LoanPlan = serde_json::from_reader(file)?;
    info!("loaded plan '{}' from {}", plan.name, path.as_ref().display());
    Ok(plan)
}

/// Load a JSON array of plans
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanPlan>> {
    let file = File::open(path.as_ref())?;
    let plans: Vec<LoanPlan> = serde_json::from_reader(file)?;
    info!("loaded {} plans from {}", plans.len(), path.as_ref().display());
    Ok(plans)
}

/// Load a rate table from CSV
pub fn load_rate_schedule<P: AsRef<Path>>(path: P) -> Result<RateSchedule> {
    load_rate_schedule_from_reader(File::open(path)?)
}

/// Load a rate table from any reader
///
/// Rows may appear in any order but periods must run 1..=n without gaps.
pub fn load_rate_schedule_from_reader<R: Read>(reader: R) -> Result<RateSchedule> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: RateRow = result?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(LoanError::InvalidData("rate table has no rows".to_string()));
    }

    rows.sort_by_key(|r| r.period);
    for (expected, row) in (1..).zip(&rows) {
        if row.period != expected {
            return Err(LoanError::InvalidData(format!(
                "rate table periods must run 1..={} without gaps, found period {} where {} was expected",
                rows.len(),
                row.period,
                expected
            )));
        }
    }

    Ok(RateSchedule::new(rows.into_iter().map(|r| r.annual_rate).collect()))
}

/// Load prepayment events from CSV (`month,amount,fee_rate`)
pub fn load_prepayments<P: AsRef<Path>>(path: P) -> Result<Vec<PrepaymentEvent>> {
    load_prepayments_from_reader(File::open(path)?)
}

/// Load prepayment events from any reader
pub fn load_prepayments_from_reader<R: Read>(reader: R) -> Result<Vec<PrepaymentEvent>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut events = Vec::new();

    for result in csv_reader.deserialize() {
        let event: PrepaymentEvent = result?;
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table_sorted_by_period() {
        let data = "period,annual_rate\n2,6.5\n1,6.0\n3,7.0\n";
        let rates = load_rate_schedule_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rates.rates(), &[6.0, 6.5, 7.0]);
    }

    #[test]
    fn test_rate_table_gap_rejected() {
        let data = "period,annual_rate\n1,6.0\n3,7.0\n";
        let err = load_rate_schedule_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoanError::InvalidData(_)));
    }

    #[test]
    fn test_empty_rate_table_rejected() {
        let data = "period,annual_rate\n";
        assert!(load_rate_schedule_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_malformed_rate_is_csv_error() {
        let data = "period,annual_rate\n1,six\n";
        let err = load_rate_schedule_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoanError::Csv(_)));
    }

    #[test]
    fn test_load_prepayments() {
        let data = "month,amount,fee_rate\n9,50000,1.5\n3,100000,2\n";
        let events = load_prepayments_from_reader(data.as_bytes()).unwrap();

        assert_eq!(
            events,
            vec![
                PrepaymentEvent::new(9, 50_000.0, 1.5),
                PrepaymentEvent::new(3, 100_000.0, 2.0),
            ]
        );
    }

    #[test]
    fn test_missing_plan_file_is_io_error() {
        let err = load_plan("does/not/exist.json").unwrap_err();
        assert!(matches!(err, LoanError::Io(_)));
    }
}
