pub use crate::config::*;

use crate::{run_performance_report, PerformanceAnalysis};

/// A builder for assembling the entry and exit records in code.
///
/// The readers of the command line tool produce [RecordTable]s directly; the builder
/// is convenient for other sources (databases, APIs) and for experiments.
///
/// ```
/// use exit_destination::builder::Builder;
/// use exit_destination::{ColumnNames, ReportErrors, RowKind};
///
/// let mut builder = Builder::new(
///     &ColumnNames::default(),
///     &["Unique ID", "Household ID", "DOB", "Housing Move-In Date",
///       "Relationship to Head of Household"],
///     &["Unique ID", "Household ID", "Enrollment Exit Date", "Destination"],
/// )?;
///
/// builder.add_entry(&["1", "H1", "03/15/1990", "06/01/2020", "Self (head of household)"]);
/// builder.add_exit(&["1", "H1", "03/14/2021", "Deceased"]);
///
/// let analysis = builder.run()?;
/// assert_eq!(analysis.report.counts_of(RowKind::Total).unwrap().total, 1);
///
/// # Ok::<(), ReportErrors>(())
/// ```
pub struct Builder {
    pub(crate) _columns: ColumnNames,
    pub(crate) _entry: RecordTable,
    pub(crate) _exit: RecordTable,
}

impl Builder {
    /// Starts a builder with the headers of both record sets.
    ///
    /// The headers must share at least one column, the one used to join them.
    pub fn new(
        columns: &ColumnNames,
        entry_columns: &[&str],
        exit_columns: &[&str],
    ) -> Result<Builder, ReportErrors> {
        if !entry_columns.iter().any(|c| exit_columns.contains(c)) {
            return Err(ReportErrors::NoCommonColumns);
        }
        Ok(Builder {
            _columns: columns.clone(),
            _entry: RecordTable::new(entry_columns.iter().map(|c| c.to_string()).collect()),
            _exit: RecordTable::new(exit_columns.iter().map(|c| c.to_string()).collect()),
        })
    }

    /// Adds an entry row. Empty strings are missing values.
    pub fn add_entry(&mut self, values: &[&str]) {
        self._entry.push_row(to_cells(values));
    }

    /// Adds an exit row. Empty strings are missing values.
    pub fn add_exit(&mut self, values: &[&str]) {
        self._exit.push_row(to_cells(values));
    }

    pub fn tables(&self) -> (&RecordTable, &RecordTable) {
        (&self._entry, &self._exit)
    }

    pub fn run(&self) -> Result<PerformanceAnalysis, ReportErrors> {
        run_performance_report(&self._entry, &self._exit, &self._columns)
    }
}

fn to_cells(values: &[&str]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                None
            } else {
                Some(v.to_string())
            }
        })
        .collect()
}

/// A head of household record that moved in on 06/01/2020, with its household type
/// computed as if it was alone in its household.
#[cfg(test)]
pub(crate) fn test_record(
    household_id: &str,
    age: Option<u32>,
    destination: Option<&str>,
) -> EnrollmentRecord {
    use chrono::NaiveDate;
    EnrollmentRecord {
        unique_id: Some(format!("{}-1", household_id)),
        household_id: household_id.to_string(),
        enrollment_start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
        enrollment_exit_date: NaiveDate::from_ymd_opt(2021, 1, 1),
        date_of_birth: None,
        housing_move_in_date: NaiveDate::from_ymd_opt(2020, 6, 1),
        gender: None,
        race: None,
        ethnicity: None,
        relationship_to_head_of_household: Some(HEAD_OF_HOUSEHOLD.to_string()),
        destination: destination.map(|d| d.to_string()),
        specify_other_exit_destination: None,
        age,
        household_type: crate::household::classify_household(&[age]),
        destination_type: crate::destination::classify_destination(destination, true),
    }
}
