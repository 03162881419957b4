mod config;
pub mod aggregate;
pub mod assemble;
pub mod builder;
pub mod destination;
pub mod household;
pub mod manual;
pub mod merge;
pub mod summaries;

use log::{debug, info, warn};

pub use crate::config::*;

use crate::destination::{classify_destination, is_known_destination};
use crate::household::{age_at, assign_household_types, parse_date};

/// Everything computed from one batch of entry and exit records.
#[derive(PartialEq, Debug, Clone)]
pub struct PerformanceAnalysis {
    /// The classified records, one per (person, enrollment) that exited.
    pub records: Vec<EnrollmentRecord>,
    pub report: PerformanceReport,
    pub data_quality: DataQuality,
}

fn text(table: &RecordTable, row: usize, column: &str) -> Option<String> {
    table
        .value(row, column)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

fn date(table: &RecordTable, row: usize, column: &str) -> Option<chrono::NaiveDate> {
    table.value(row, column).and_then(parse_date)
}

/// Turns the merged rows into enrollment records, with the age at exit, the destination
/// type and the household type.
///
/// Rows without a household id are dropped. The observations on the data are added
/// to `data_quality`.
pub fn classify_records(
    table: &RecordTable,
    columns: &ColumnNames,
    data_quality: &mut DataQuality,
) -> Vec<EnrollmentRecord> {
    let mut records: Vec<EnrollmentRecord> = Vec::new();
    for row in 0..table.len() {
        let household_id = match text(table, row, &columns.household_id) {
            Some(hh) => hh,
            None => {
                data_quality.rows_without_household_id += 1;
                continue;
            }
        };
        let enrollment_exit_date = date(table, row, &columns.enrollment_exit_date);
        let date_of_birth = date(table, row, &columns.date_of_birth);
        let housing_move_in_date = date(table, row, &columns.housing_move_in_date);
        let destination = text(table, row, &columns.destination);
        let age = match (date_of_birth, enrollment_exit_date) {
            (Some(birth), Some(exit)) => age_at(birth, exit),
            _ => None,
        };
        let destination_type =
            classify_destination(destination.as_deref(), housing_move_in_date.is_some());

        if age.is_none() {
            data_quality.records_with_unknown_age += 1;
        }
        if housing_move_in_date.is_none() {
            data_quality.records_without_move_in_date += 1;
        }
        if let Some(dest) = destination.as_ref() {
            if housing_move_in_date.is_some() && !is_known_destination(dest) {
                data_quality.taxonomy_mismatches += 1;
                if !data_quality.unmatched_destinations.contains(dest) {
                    warn!(
                        "classify_records: destination {:?} is not a known destination, household {} will not be counted",
                        dest, household_id
                    );
                    data_quality.unmatched_destinations.push(dest.clone());
                }
            }
        }

        let record = EnrollmentRecord {
            unique_id: text(table, row, &columns.unique_id),
            household_id,
            enrollment_start_date: date(table, row, &columns.enrollment_start_date),
            enrollment_exit_date,
            date_of_birth,
            housing_move_in_date,
            gender: text(table, row, &columns.gender),
            race: text(table, row, &columns.race),
            ethnicity: text(table, row, &columns.ethnicity),
            relationship_to_head_of_household: text(
                table,
                row,
                &columns.relationship_to_head_of_household,
            ),
            destination,
            specify_other_exit_destination: text(
                table,
                row,
                &columns.specify_other_exit_destination,
            ),
            age,
            household_type: HouseholdType::Unknown,
            destination_type,
        };
        debug!("classify_records: {:?}", record);
        records.push(record);
    }
    assign_household_types(&mut records);
    records
}

/// Computes the exit destination report from the entry and the exit records.
///
/// Arguments:
/// * `entry` the entry records, with the move-in dates and the relationships
/// * `exit` the exit records, with the destinations
/// * `columns` the names of the columns in both tables
///
/// Fails only when the tables cannot be joined or a required column is missing.
pub fn run_performance_report(
    entry: &RecordTable,
    exit: &RecordTable,
    columns: &ColumnNames,
) -> Result<PerformanceAnalysis, ReportErrors> {
    info!(
        "Processing {} entry rows and {} exit rows",
        entry.len(),
        exit.len()
    );
    let merged = merge::merge_records(entry, exit, columns)?;
    let mut data_quality = DataQuality {
        entry_duplicates_removed: merged.entry_duplicates_removed,
        exit_duplicates_removed: merged.exit_duplicates_removed,
        rows_without_exit_date: merged.rows_without_exit_date,
        households_with_conflicting_move_in: merged.households_with_conflicting_move_in,
        ..DataQuality::default()
    };

    let records = classify_records(&merged.table, columns, &mut data_quality);
    info!(
        "Classified {} records, {} heads of household with a move-in date",
        records.len(),
        aggregate::scored_records(&records).len()
    );
    if data_quality.taxonomy_mismatches > 0 {
        warn!(
            "{} records with an unknown destination: {:?}",
            data_quality.taxonomy_mismatches, data_quality.unmatched_destinations
        );
    }

    let report = assemble::assemble_report(&records);
    info!("Data quality: {:?}", data_quality);
    Ok(PerformanceAnalysis {
        records,
        report,
        data_quality,
    })
}
