//! CSV export with the fixed output schema.
//!
//! The column set and order never vary with what was actually extracted;
//! absent fields render as empty cells. Funding columns use the shorthand
//! rendering so a spreadsheet shows "1.5M" rather than 1500000.

use anyhow::Result;
use csv::Writer;
use std::fs::File;
use tracing::{debug, info};

use crate::company::CompanyRecord;
use crate::currency::format_amount;

/// Output columns, in order. A subset of the record: the profile-only
/// fields stay out of the CSV.
const CSV_HEADERS: [&str; 8] = [
    "Name",
    "Location",
    "Company Type",
    "Total Funding Usd",
    "Total Funding Cny",
    "Employee Count",
    "Year Founded",
    "Website",
];

pub fn export_csv(records: &[CompanyRecord], output_path: &str) -> Result<()> {
    debug!("Exporting {} companies to CSV: {}", records.len(), output_path);

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(CSV_HEADERS)?;

    for record in records {
        wtr.write_record(&[
            record.name.clone(),
            record.location.clone().unwrap_or_default(),
            record.company_type.clone().unwrap_or_default(),
            format_amount(record.total_funding_usd),
            format_amount(record.total_funding_cny),
            record.employee_count.clone().unwrap_or_default(),
            record
                .year_founded
                .map(|y| y.to_string())
                .unwrap_or_default(),
            record.website.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    info!("Successfully exported {} companies to CSV: {}", records.len(), output_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_record() -> CompanyRecord {
        let mut record = CompanyRecord::new("Acme Corp");
        record.location = Some("Austin, Texas".to_string());
        record.company_type = Some("Private".to_string());
        record.total_funding_usd = Some(1_500_000.0);
        record.total_funding_cny = Some(10_875_000.0);
        record.employee_count = Some("11-50".to_string());
        record.year_founded = Some(2012);
        record.website = Some("https://acme.example".to_string());
        record
    }

    #[test]
    fn test_export_writes_fixed_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&[sample_record()], path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "Name,Location,Company Type,Total Funding Usd,Total Funding Cny,Employee Count,Year Founded,Website"
        );
    }

    #[test]
    fn test_export_renders_funding_shorthand() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&[sample_record()], path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "Acme Corp,\"Austin, Texas\",Private,1.5M,10.9M,11-50,2012,https://acme.example"
        );
    }

    #[test]
    fn test_export_absent_fields_are_empty_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&[CompanyRecord::new("Bare Co")], path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(row, "Bare Co,,,,,,,");
    }

    #[test]
    fn test_export_empty_record_set_still_writes_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&[], path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
