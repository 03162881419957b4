// Primitives for reading and writing CSV files.

use crate::report::io_common::{field_to_text, simplify_file_name};
use crate::report::*;

/// Reads a CSV export: the first line holds the column names.
pub fn read_csv_table(path: &str, max_columns: Option<usize>) -> ReportResult<RecordTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let width = max_columns.unwrap_or(usize::MAX);
    let columns: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .take(width)
        .map(|s| s.to_string())
        .collect();
    let mut table = RecordTable::new(columns);
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells: Vec<Cell> = line.iter().take(width).map(field_to_text).collect();
        if cells.iter().all(|c| c.is_none()) {
            continue;
        }
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, cells);
        table.push_row(cells);
    }
    info!(
        "read_csv_table: {}: {} rows",
        simplify_file_name(path),
        table.len()
    );
    Ok(table)
}

/// Writes the report table with the legacy layout: six columns, empty cells on the
/// section headers.
pub fn write_report_csv(report: &PerformanceReport, path: &str) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(CsvOpenSnafu { path })?;
    wtr.write_record(REPORT_COLUMNS)
        .context(WritingCsvSnafu { path })?;
    for row in report.rows.iter() {
        let mut record: Vec<String> = vec![row.destination.clone()];
        record.extend(row.rendered_values());
        wtr.write_record(&record).context(WritingCsvSnafu { path })?;
    }
    wtr.flush().context(WritingOutputSnafu { path })?;
    info!("write_report_csv: {} rows written to {}", report.rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_with_blank_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Unique ID,Household ID,DOB,Notes").unwrap();
        writeln!(f, "1,H1,03/15/1990,a").unwrap();
        writeln!(f, ",,,").unwrap();
        writeln!(f, "2,H1,,b").unwrap();
        let table = read_csv_table(f.path().to_str().unwrap(), Some(3)).unwrap();
        assert_eq!(table.columns, vec!["Unique ID", "Household ID", "DOB"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "DOB"), None);
        assert_eq!(table.value(1, "Unique ID"), Some("2"));
    }

    #[test]
    fn missing_file() {
        let res = read_csv_table("/nonexistent/entry.csv", None);
        assert!(matches!(res, Err(ReportError::CsvOpen { .. })));
    }

    #[test]
    fn report_layout() {
        let report = exit_destination::assemble::assemble_report(&[]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q23c.csv");
        let path = path.to_str().unwrap();
        write_report_csv(&report, path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1 + report.rows.len());
        assert_eq!(
            lines[0],
            "Destination,Total,Without Children,With Children and Adults,With Only Children,Unknown Household Type"
        );
        assert_eq!(lines[1], "Permanent Destinations,,,,,");
        assert_eq!(*lines.last().unwrap(), "Percentage,N/A,N/A,N/A,N/A,N/A");
    }
}
