// Reading the HMIS exports stored as Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::io_common::{cell_to_text, simplify_file_name};
use crate::report::*;

/// Reads one worksheet as a record table. The first row holds the column names, only
/// the first `max_columns` columns are kept. Blank rows are skipped.
fn read_excel_sheet<RS>(
    workbook: &mut Xlsx<RS>,
    path: &str,
    sheet: &str,
    max_columns: usize,
) -> ReportResult<RecordTable>
where
    RS: std::io::Read + std::io::Seek,
{
    let wrange = workbook
        .worksheet_range(sheet)
        .context(MissingSheetSnafu { path, sheet })?
        .context(OpeningExcelSnafu { path })?;
    sheet_to_table(wrange.rows(), max_columns)
        .with_context(|| MissingSheetSnafu { path, sheet })
}

/// `None` when the sheet has no header row.
fn sheet_to_table<'a, I>(mut rows: I, max_columns: usize) -> Option<RecordTable>
where
    I: Iterator<Item = &'a [DataType]>,
{
    let header = rows.next()?;
    let columns: Vec<String> = header
        .iter()
        .take(max_columns)
        .enumerate()
        .map(|(idx, c)| cell_to_text(c).unwrap_or_else(|| format!("Unnamed: {}", idx)))
        .collect();
    let mut table = RecordTable::new(columns);
    for row in rows {
        let cells: Vec<Cell> = row.iter().take(max_columns).map(cell_to_text).collect();
        if cells.iter().all(|c| c.is_none()) {
            continue;
        }
        table.push_row(cells);
    }
    Some(table)
}

/// Reads the entry and the exit sheets of a workbook.
pub fn read_workbook(
    path: &str,
    entry_sheet: &str,
    exit_sheet: &str,
    max_columns: usize,
) -> ReportResult<(RecordTable, RecordTable)> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let entry = read_excel_sheet(&mut workbook, path, entry_sheet, max_columns)?;
    let exit = read_excel_sheet(&mut workbook, path, exit_sheet, max_columns)?;
    info!(
        "read_workbook: {}: {} entry rows, {} exit rows",
        simplify_file_name(path),
        entry.len(),
        exit.len()
    );
    debug!(
        "read_workbook: entry columns: {:?} exit columns: {:?}",
        entry.columns, exit.columns
    );
    Ok((entry, exit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_sheet(workbook: &mut Workbook, name: &str, rows: &[Vec<&str>]) {
        let worksheet = workbook.add_worksheet().set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                match value.parse::<f64>() {
                    Ok(n) => worksheet.write_number(r as u32, c as u16, n).unwrap(),
                    Err(_) => worksheet.write_string(r as u32, c as u16, *value).unwrap(),
                };
            }
        }
    }

    #[test]
    fn read_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        let mut workbook = Workbook::new();
        write_sheet(
            &mut workbook,
            DEFAULT_ENTRY_SHEET,
            &[
                vec!["Unique ID", "Household ID", "DOB", "Extra"],
                vec!["101", "H1", "03/15/1990", "x"],
                vec!["", "", "", ""],
                vec!["102", "H1", "", "y"],
            ],
        );
        write_sheet(
            &mut workbook,
            DEFAULT_EXIT_SHEET,
            &[
                vec!["Unique ID", "Household ID", "Destination"],
                vec!["101", "H1", "Deceased"],
            ],
        );
        workbook.save(&path).unwrap();

        let (entry, exit) = read_workbook(
            path.to_str().unwrap(),
            DEFAULT_ENTRY_SHEET,
            DEFAULT_EXIT_SHEET,
            3,
        )
        .unwrap();
        assert_eq!(entry.columns, vec!["Unique ID", "Household ID", "DOB"]);
        assert_eq!(entry.len(), 2);
        assert_eq!(entry.value(0, "Unique ID"), Some("101"));
        assert_eq!(entry.value(1, "DOB"), None);
        assert_eq!(exit.value(0, "Destination"), Some("Deceased"));
    }

    #[test]
    fn missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, DEFAULT_ENTRY_SHEET, &[vec!["Unique ID"]]);
        workbook.save(&path).unwrap();
        let path = path.to_str().unwrap();
        let res = read_workbook(path, DEFAULT_ENTRY_SHEET, DEFAULT_EXIT_SHEET, 10);
        assert!(matches!(res, Err(ReportError::MissingSheet { .. })));
        let res = read_workbook(path, DEFAULT_ENTRY_SHEET, "Exits", 10);
        assert!(matches!(
            res,
            Err(ReportError::MissingSheet { sheet, .. }) if sheet == "Exits"
        ));
    }
}
