//! CSV export of schedules

use std::io::Write;
use std::path::Path;

use crate::amortization::Schedule;
use crate::error::Result;

/// Write one CSV record per schedule row, with a header
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in schedule {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a schedule to a CSV file
pub fn write_schedule_csv_path<P: AsRef<Path>>(schedule: &Schedule, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_schedule_csv(schedule, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::AmortizationEngine;
    use crate::loan::LoanParameters;
    use chrono::NaiveDate;

    #[test]
    fn test_schedule_csv_layout() {
        let params = LoanParameters::new(12_000.0, 12, vec![0.0])
            .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let schedule = AmortizationEngine::default().compute_schedule(&params).unwrap();

        let mut buffer = Vec::new();
        write_schedule_csv(&schedule, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(
            lines[0],
            "month,payment_date,period_index,annual_rate,opening_balance,closing_balance,\
             interest_amount,principal_amount,prepayment_amount,prepayment_fee,total_payment"
        );
        assert!(lines[1].starts_with("1,2025-01-01,0,0.0,12000.0,11000.0,"));
    }
}
