//! Joining the entry and the exit records into one row per enrollment.

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::household::parse_date;

/// The joined records and what was dropped along the way.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MergedRecords {
    pub table: RecordTable,
    pub entry_duplicates_removed: usize,
    pub exit_duplicates_removed: usize,
    pub rows_without_exit_date: usize,
    pub households_with_conflicting_move_in: Vec<String>,
}

/// Trims the whitespace around the column names.
pub fn normalize_columns(table: &RecordTable) -> RecordTable {
    RecordTable {
        columns: table.columns.iter().map(|c| c.trim().to_string()).collect(),
        rows: table.rows.clone(),
    }
}

/// Removes the rows that are exact copies of an earlier row.
/// Returns the deduplicated table and the number of rows removed.
pub fn drop_duplicates(table: &RecordTable) -> (RecordTable, usize) {
    let mut seen: HashSet<&Vec<Cell>> = HashSet::new();
    let mut res = RecordTable::new(table.columns.clone());
    for row in table.rows.iter() {
        if seen.insert(row) {
            res.rows.push(row.clone());
        }
    }
    let removed = table.len() - res.len();
    (res, removed)
}

/// The columns present on both sides, in the order of the entry records.
pub fn common_columns(entry: &RecordTable, exit: &RecordTable) -> Vec<String> {
    entry
        .columns
        .iter()
        .filter(|c| exit.columns.contains(c))
        .cloned()
        .collect()
}

/// Left join of the exit rows onto the entry rows.
///
/// Two rows match when they agree on every column of `on`. Missing values match
/// missing values. An entry row without a matching exit row is kept with missing
/// exit cells, an entry row with several matches appears once per match.
///
/// `on` must not be empty: that would be a cartesian product.
pub fn left_join(
    entry: &RecordTable,
    exit: &RecordTable,
    on: &[String],
) -> Result<RecordTable, ReportErrors> {
    if on.is_empty() {
        return Err(ReportErrors::NoCommonColumns);
    }
    let entry_key_idxs: Vec<usize> = key_indices(entry, on)?;
    let exit_key_idxs: Vec<usize> = key_indices(exit, on)?;
    // The exit-only columns, appended after the entry columns.
    let exit_extra_idxs: Vec<usize> = (0..exit.columns.len())
        .filter(|idx| !exit_key_idxs.contains(idx))
        .collect();

    let mut exit_by_key: HashMap<Vec<Cell>, Vec<usize>> = HashMap::new();
    for (row_idx, row) in exit.rows.iter().enumerate() {
        let key: Vec<Cell> = exit_key_idxs.iter().map(|i| cell(row, *i)).collect();
        exit_by_key.entry(key).or_default().push(row_idx);
    }

    let mut columns = entry.columns.clone();
    columns.extend(exit_extra_idxs.iter().map(|i| exit.columns[*i].clone()));
    let mut res = RecordTable::new(columns);

    for row in entry.rows.iter() {
        let key: Vec<Cell> = entry_key_idxs.iter().map(|i| cell(row, *i)).collect();
        match exit_by_key.get(&key) {
            Some(matches) => {
                for exit_idx in matches {
                    let exit_row = &exit.rows[*exit_idx];
                    let mut joined = row.clone();
                    joined.resize(entry.columns.len(), None);
                    joined.extend(exit_extra_idxs.iter().map(|i| cell(exit_row, *i)));
                    res.rows.push(joined);
                }
            }
            None => {
                let mut joined = row.clone();
                joined.resize(entry.columns.len() + exit_extra_idxs.len(), None);
                res.rows.push(joined);
            }
        }
    }
    debug!(
        "left_join: {} entry rows, {} exit rows -> {} rows",
        entry.len(),
        exit.len(),
        res.len()
    );
    Ok(res)
}

fn cell(row: &[Cell], idx: usize) -> Cell {
    row.get(idx).cloned().flatten()
}

fn key_indices(table: &RecordTable, on: &[String]) -> Result<Vec<usize>, ReportErrors> {
    on.iter()
        .map(|c| {
            table
                .column_index(c)
                .ok_or_else(|| ReportErrors::MissingColumn(c.clone()))
        })
        .collect()
}

/// Gives every row of a household the move-in date found for that household.
///
/// The first filled move-in date in row order is used for the whole household.
/// Rows without a household id are left untouched.
/// Returns the households that had more than one distinct move-in date. Two values
/// are the same date when they parse to the same day, even if written differently.
pub fn backfill_move_in_dates(
    table: &mut RecordTable,
    household_column: &str,
    move_in_column: &str,
) -> Result<Vec<String>, ReportErrors> {
    let hh_idx = table
        .column_index(household_column)
        .ok_or_else(|| ReportErrors::MissingColumn(household_column.to_string()))?;
    let move_idx = table
        .column_index(move_in_column)
        .ok_or_else(|| ReportErrors::MissingColumn(move_in_column.to_string()))?;

    let mut first_seen: HashMap<String, String> = HashMap::new();
    let mut conflicts: Vec<String> = Vec::new();
    for row in table.rows.iter() {
        if let (Some(hh), Some(date)) = (cell(row, hh_idx), cell(row, move_idx)) {
            match first_seen.get(&hh) {
                None => {
                    first_seen.insert(hh, date);
                }
                Some(prev) if !same_date(prev, &date) && !conflicts.contains(&hh) => {
                    warn!(
                        "backfill_move_in_dates: household {} has several move-in dates ({} and {}), using {}",
                        hh, prev, date, prev
                    );
                    conflicts.push(hh);
                }
                Some(_) => {}
            }
        }
    }

    let width = table.columns.len();
    for row in table.rows.iter_mut() {
        row.resize(width, None);
        if let Some(date) = row[hh_idx].as_ref().and_then(|hh| first_seen.get(hh)) {
            row[move_idx] = Some(date.clone());
        }
    }
    Ok(conflicts)
}

/// Compares the parsed dates, or the text when one of them is not a date.
fn same_date(a: &str, b: &str) -> bool {
    match (parse_date(a), parse_date(b)) {
        (Some(da), Some(db)) => da == db,
        _ => a == b,
    }
}

/// Removes the rows where the given column is missing. Returns the number of rows removed.
pub fn drop_missing(table: &mut RecordTable, column: &str) -> Result<usize, ReportErrors> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| ReportErrors::MissingColumn(column.to_string()))?;
    let before = table.len();
    table.rows.retain(|row| cell(row, idx).is_some());
    Ok(before - table.len())
}

/// Runs the full merge: column cleanup, deduplication, join, move-in backfill and
/// removal of the enrollments that have not exited.
pub fn merge_records(
    entry: &RecordTable,
    exit: &RecordTable,
    columns: &ColumnNames,
) -> Result<MergedRecords, ReportErrors> {
    let (entry, entry_duplicates_removed) = drop_duplicates(&normalize_columns(entry));
    let (exit, exit_duplicates_removed) = drop_duplicates(&normalize_columns(exit));

    let on = common_columns(&entry, &exit);
    info!("merge_records: joining on {} columns: {:?}", on.len(), on);
    if on.is_empty() {
        return Err(ReportErrors::NoCommonColumns);
    }
    let mut table = left_join(&entry, &exit, &on)?;

    for c in columns.required() {
        if table.column_index(c).is_none() {
            return Err(ReportErrors::MissingColumn(c.to_string()));
        }
    }

    let households_with_conflicting_move_in = backfill_move_in_dates(
        &mut table,
        &columns.household_id,
        &columns.housing_move_in_date,
    )?;
    let rows_without_exit_date = drop_missing(&mut table, &columns.enrollment_exit_date)?;
    info!(
        "merge_records: {} rows with an exit date ({} duplicate entry rows, {} duplicate exit rows, {} rows without exit date removed)",
        table.len(),
        entry_duplicates_removed,
        exit_duplicates_removed,
        rows_without_exit_date
    );

    Ok(MergedRecords {
        table,
        entry_duplicates_removed,
        exit_duplicates_removed,
        rows_without_exit_date,
        households_with_conflicting_move_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> RecordTable {
        let mut t = RecordTable::new(columns.iter().map(|c| c.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|c| c.map(|s| s.to_string())).collect());
        }
        t
    }

    #[test]
    fn column_names_are_trimmed() {
        let t = table(&[" Unique ID", "DOB  "], &[]);
        assert_eq!(normalize_columns(&t).columns, vec!["Unique ID", "DOB"]);
    }

    #[test]
    fn duplicates_are_removed_keeping_the_first() {
        let t = table(
            &["a", "b"],
            &[
                &[Some("1"), Some("x")],
                &[Some("2"), None],
                &[Some("1"), Some("x")],
                &[Some("2"), None],
            ],
        );
        let (res, removed) = drop_duplicates(&t);
        assert_eq!(removed, 2);
        assert_eq!(res.rows, t.rows[..2].to_vec());
    }

    #[test]
    fn join_uses_every_common_column() {
        let entry = table(
            &["id", "hh", "start"],
            &[
                &[Some("1"), Some("H1"), Some("01/01/2020")],
                &[Some("2"), Some("H1"), Some("01/01/2020")],
            ],
        );
        // Same person id but a different household: not a match.
        let exit = table(
            &["id", "hh", "dest"],
            &[
                &[Some("1"), Some("H1"), Some("Deceased")],
                &[Some("2"), Some("H9"), Some("Other")],
            ],
        );
        let on = common_columns(&entry, &exit);
        assert_eq!(on, vec!["id", "hh"]);
        let joined = left_join(&entry, &exit, &on).unwrap();
        assert_eq!(joined.columns, vec!["id", "hh", "start", "dest"]);
        assert_eq!(joined.value(0, "dest"), Some("Deceased"));
        assert_eq!(joined.value(1, "dest"), None);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn join_keeps_every_match_and_matches_missing_values() {
        let entry = table(&["id", "hh"], &[&[Some("1"), None]]);
        let exit = table(
            &["id", "hh", "dest"],
            &[
                &[Some("1"), None, Some("Deceased")],
                &[Some("1"), None, Some("Other")],
            ],
        );
        let joined = left_join(&entry, &exit, &common_columns(&entry, &exit)).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.value(1, "dest"), Some("Other"));
    }

    #[test]
    fn no_common_column_is_an_error() {
        let entry = table(&["a"], &[&[Some("1")]]);
        let exit = table(&["b"], &[&[Some("1")]]);
        assert_eq!(
            merge_records(&entry, &exit, &ColumnNames::default()),
            Err(ReportErrors::NoCommonColumns)
        );
        assert_eq!(
            left_join(&entry, &exit, &[]),
            Err(ReportErrors::NoCommonColumns)
        );
    }

    #[test]
    fn move_in_dates_are_backfilled_first_seen_wins() {
        let mut t = table(
            &["hh", "move"],
            &[
                &[Some("H1"), None],
                &[Some("H1"), Some("02/01/2020")],
                &[Some("H1"), Some("03/01/2020")],
                &[Some("H2"), None],
                &[None, Some("04/01/2020")],
            ],
        );
        let conflicts = backfill_move_in_dates(&mut t, "hh", "move").unwrap();
        assert_eq!(conflicts, vec!["H1".to_string()]);
        assert_eq!(t.value(0, "move"), Some("02/01/2020"));
        assert_eq!(t.value(2, "move"), Some("02/01/2020"));
        assert_eq!(t.value(3, "move"), None);
        assert_eq!(t.value(4, "move"), Some("04/01/2020"));
    }

    #[test]
    fn move_in_dates_written_differently_are_not_conflicts() {
        let mut t = table(
            &["hh", "move"],
            &[
                &[Some("H1"), Some("2/1/2020")],
                &[Some("H1"), Some("02/01/2020")],
                &[Some("H1"), Some("2020-02-01")],
                &[Some("H2"), Some("unknown")],
                &[Some("H2"), Some("Unknown")],
            ],
        );
        let conflicts = backfill_move_in_dates(&mut t, "hh", "move").unwrap();
        assert_eq!(conflicts, vec!["H2".to_string()]);
        assert_eq!(t.value(1, "move"), Some("2/1/2020"));
        assert_eq!(t.value(2, "move"), Some("2/1/2020"));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let entry = table(&["Household ID"], &[&[Some("H1")]]);
        let exit = table(&["Household ID"], &[&[Some("H1")]]);
        assert!(matches!(
            merge_records(&entry, &exit, &ColumnNames::default()),
            Err(ReportErrors::MissingColumn(_))
        ));
    }
}
