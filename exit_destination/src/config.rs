// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;

/// A single cell of an uploaded record set. `None` stands for a missing value
/// (an empty spreadsheet cell).
pub type Cell = Option<String>;

/// A record set as read from an upload: named columns and rows of optional text cells.
///
/// Rows are always as wide as the column list.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> RecordTable {
        RecordTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Adds a row. Short rows are padded with missing cells, extra cells are dropped.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The value of a cell, if the column exists and the cell is filled.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stacks several tables. The columns are the union of all the columns, in order
    /// of first appearance; cells of columns absent from a table are missing.
    pub fn concat(tables: &[RecordTable]) -> RecordTable {
        let mut columns: Vec<String> = Vec::new();
        for t in tables {
            for c in t.columns.iter() {
                if !columns.contains(c) {
                    columns.push(c.clone());
                }
            }
        }
        let mut res = RecordTable::new(columns);
        for t in tables {
            let mapping: Vec<Option<usize>> =
                res.columns.iter().map(|c| t.column_index(c)).collect();
            for row in t.rows.iter() {
                let aligned: Vec<Cell> = mapping
                    .iter()
                    .map(|idx| idx.and_then(|i| row.get(i).cloned().flatten()))
                    .collect();
                res.rows.push(aligned);
            }
        }
        res
    }
}

/// The names of the columns in the HMIS exports.
///
/// The defaults follow the "Entry data" / "Exit data" extracts of the case management
/// system. Any of them can be overridden when an export uses other headers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnNames {
    pub unique_id: String,
    pub household_id: String,
    pub enrollment_start_date: String,
    pub enrollment_exit_date: String,
    pub date_of_birth: String,
    pub housing_move_in_date: String,
    pub gender: String,
    pub race: String,
    pub ethnicity: String,
    pub relationship_to_head_of_household: String,
    pub destination: String,
    pub specify_other_exit_destination: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            unique_id: "Unique ID".to_string(),
            household_id: "Household ID".to_string(),
            enrollment_start_date: "Enrollment Start Date".to_string(),
            enrollment_exit_date: "Enrollment Exit Date".to_string(),
            date_of_birth: "DOB".to_string(),
            housing_move_in_date: "Housing Move-In Date".to_string(),
            gender: "Gender".to_string(),
            race: "Race".to_string(),
            ethnicity: "Ethnicity".to_string(),
            relationship_to_head_of_household: "Relationship to Head of Household".to_string(),
            destination: "Destination".to_string(),
            specify_other_exit_destination: "Specify Other Exit Destination".to_string(),
        }
    }
}

impl ColumnNames {
    /// The columns without which no record can be scored.
    pub fn required(&self) -> Vec<&str> {
        vec![
            self.household_id.as_str(),
            self.enrollment_exit_date.as_str(),
            self.date_of_birth.as_str(),
            self.housing_move_in_date.as_str(),
            self.relationship_to_head_of_household.as_str(),
            self.destination.as_str(),
        ]
    }
}

/// The value of the relationship column that marks the head of household.
pub const HEAD_OF_HOUSEHOLD: &str = "Self (head of household)";

// ********* Classified records ***********

/// The age composition of a household.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum HouseholdType {
    WithoutChildren,
    WithChildrenAndAdults,
    WithOnlyChildren,
    Unknown,
}

impl HouseholdType {
    /// All the household types, in the column order of the report.
    pub fn ordered() -> [HouseholdType; 4] {
        [
            HouseholdType::WithoutChildren,
            HouseholdType::WithChildrenAndAdults,
            HouseholdType::WithOnlyChildren,
            HouseholdType::Unknown,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            HouseholdType::WithoutChildren => "Without Children",
            HouseholdType::WithChildrenAndAdults => "With Children and Adults",
            HouseholdType::WithOnlyChildren => "With Only Children",
            HouseholdType::Unknown => "Unknown Household Type",
        }
    }
}

/// The four exit destination buckets of the reporting standard.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum DestinationType {
    Permanent,
    Temporary,
    Institutional,
    Other,
}

impl DestinationType {
    /// The categories in report order.
    pub fn ordered() -> [DestinationType; 4] {
        [
            DestinationType::Permanent,
            DestinationType::Temporary,
            DestinationType::Institutional,
            DestinationType::Other,
        ]
    }

    /// The label of the section header row of the category.
    pub fn label(&self) -> &'static str {
        match self {
            DestinationType::Permanent => "Permanent Destinations",
            DestinationType::Temporary => "Temporary Destinations",
            DestinationType::Institutional => "Institutional Settings",
            DestinationType::Other => "Other Destinations",
        }
    }

    /// Short name, used by the chart data.
    pub fn short_label(&self) -> &'static str {
        match self {
            DestinationType::Permanent => "Permanent",
            DestinationType::Temporary => "Temporary",
            DestinationType::Institutional => "Institutional Setting",
            DestinationType::Other => "Other",
        }
    }
}

/// One (person, enrollment) row after the entry and exit records have been joined.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EnrollmentRecord {
    pub unique_id: Option<String>,
    pub household_id: String,
    pub enrollment_start_date: Option<NaiveDate>,
    pub enrollment_exit_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub housing_move_in_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub ethnicity: Option<String>,
    pub relationship_to_head_of_household: Option<String>,
    pub destination: Option<String>,
    pub specify_other_exit_destination: Option<String>,
    // Derived
    pub age: Option<u32>,
    pub household_type: HouseholdType,
    pub destination_type: Option<DestinationType>,
}

impl EnrollmentRecord {
    pub fn is_head_of_household(&self) -> bool {
        self.relationship_to_head_of_household.as_deref() == Some(HEAD_OF_HOUSEHOLD)
    }

    pub fn has_move_in_date(&self) -> bool {
        self.housing_move_in_date.is_some()
    }
}

// ******** Output data structures *********

/// The household counts of one line of the report.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct HouseholdCounts {
    pub total: u64,
    pub without_children: u64,
    pub with_children_and_adults: u64,
    pub with_only_children: u64,
    pub unknown: u64,
}

impl HouseholdCounts {
    pub const EMPTY: HouseholdCounts = HouseholdCounts {
        total: 0,
        without_children: 0,
        with_children_and_adults: 0,
        with_only_children: 0,
        unknown: 0,
    };

    pub fn by_type(&self, household_type: HouseholdType) -> u64 {
        match household_type {
            HouseholdType::WithoutChildren => self.without_children,
            HouseholdType::WithChildrenAndAdults => self.with_children_and_adults,
            HouseholdType::WithOnlyChildren => self.with_only_children,
            HouseholdType::Unknown => self.unknown,
        }
    }

    /// The values in column order: total first, then each household type.
    pub fn values(&self) -> [u64; 5] {
        [
            self.total,
            self.without_children,
            self.with_children_and_adults,
            self.with_only_children,
            self.unknown,
        ]
    }
}

impl AddAssign for HouseholdCounts {
    fn add_assign(&mut self, rhs: HouseholdCounts) {
        self.total += rhs.total;
        self.without_children += rhs.without_children;
        self.with_children_and_adults += rhs.with_children_and_adults;
        self.with_only_children += rhs.with_only_children;
        self.unknown += rhs.unknown;
    }
}

impl Add for HouseholdCounts {
    type Output = HouseholdCounts;
    fn add(mut self, rhs: HouseholdCounts) -> HouseholdCounts {
        self += rhs;
        self
    }
}

impl Sum for HouseholdCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HouseholdCounts::EMPTY, |acc, c| acc + c)
    }
}

impl<'a> Sum<&'a HouseholdCounts> for HouseholdCounts {
    fn sum<I: Iterator<Item = &'a HouseholdCounts>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// The header of the report table.
pub const REPORT_COLUMNS: [&str; 6] = [
    "Destination",
    "Total",
    "Without Children",
    "With Children and Adults",
    "With Only Children",
    "Unknown Household Type",
];

pub const SUBTOTAL_LABEL: &str = "Subtotal";
pub const TOTAL_LABEL: &str = "Total";
pub const POSITIVE_TOTAL_LABEL: &str = "Total persons exiting to positive housing destinations";
pub const EXCLUDED_TOTAL_LABEL: &str =
    "Total persons whose destinations excluded them from the calculation";
pub const PERCENTAGE_LABEL: &str = "Percentage";

/// The role of a row in the report.
///
/// The legacy spreadsheet formatter does not see this tag: it finds the headers by their
/// missing total and the summary block by the `Subtotal` and `Total` labels.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RowKind {
    Header,
    Destination,
    Subtotal,
    Total,
    PositiveTotal,
    ExcludedTotal,
    Percentage,
}

impl RowKind {
    pub fn name(&self) -> &'static str {
        match self {
            RowKind::Header => "header",
            RowKind::Destination => "destination",
            RowKind::Subtotal => "subtotal",
            RowKind::Total => "total",
            RowKind::PositiveTotal => "positiveTotal",
            RowKind::ExcludedTotal => "excludedTotal",
            RowKind::Percentage => "percentage",
        }
    }
}

/// A percentage cell, printed as the rounded value followed by `%`.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Percentage {
    Value(f64),
    NotAvailable,
}

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Percentage::NotAvailable => write!(f, "N/A"),
            // Integral values keep one decimal: 50 -> "50.0%"
            Percentage::Value(v) if v.fract() == 0.0 => write!(f, "{:.1}%", v),
            Percentage::Value(v) => write!(f, "{}%", v),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum RowValues {
    /// Section headers carry no value.
    Empty,
    Counts(HouseholdCounts),
    /// Total first, then one per household type.
    Percentages([Percentage; 5]),
}

#[derive(PartialEq, Debug, Clone)]
pub struct ReportRow {
    pub kind: RowKind,
    pub destination: String,
    pub values: RowValues,
}

impl ReportRow {
    pub fn counts(&self) -> Option<&HouseholdCounts> {
        match &self.values {
            RowValues::Counts(c) => Some(c),
            _ => None,
        }
    }

    /// The five value cells as rendered in the legacy table. Header rows have empty cells.
    pub fn rendered_values(&self) -> Vec<String> {
        match &self.values {
            RowValues::Empty => vec![String::new(); 5],
            RowValues::Counts(c) => c.values().iter().map(|v| v.to_string()).collect(),
            RowValues::Percentages(ps) => ps.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The exit destination table.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PerformanceReport {
    pub rows: Vec<ReportRow>,
}

impl PerformanceReport {
    pub fn rows_of_kind(&self, kind: RowKind) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    /// The counts of the first row of the given kind.
    pub fn counts_of(&self, kind: RowKind) -> Option<&HouseholdCounts> {
        self.rows_of_kind(kind).next().and_then(|r| r.counts())
    }

    pub fn subtotals(&self) -> Vec<HouseholdCounts> {
        self.rows_of_kind(RowKind::Subtotal)
            .filter_map(|r| r.counts().copied())
            .collect()
    }

    pub fn percentages(&self) -> Option<&[Percentage; 5]> {
        self.rows_of_kind(RowKind::Percentage)
            .find_map(|r| match &r.values {
                RowValues::Percentages(ps) => Some(ps),
                _ => None,
            })
    }
}

/// Observations on the input data that did not prevent the report from being produced.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DataQuality {
    pub entry_duplicates_removed: usize,
    pub exit_duplicates_removed: usize,
    pub rows_without_exit_date: usize,
    pub rows_without_household_id: usize,
    pub records_with_unknown_age: usize,
    pub records_without_move_in_date: usize,
    pub taxonomy_mismatches: usize,
    /// The distinct destination values not found in the taxonomy, in order of appearance.
    pub unmatched_destinations: Vec<String>,
    /// Households whose rows carry more than one move-in date. The first one seen is used.
    pub households_with_conflicting_move_in: Vec<String>,
}

/// Errors that prevent the report from being produced.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportErrors {
    /// The entry and exit records share no column to join on.
    NoCommonColumns,
    /// A column needed to score the records is absent.
    MissingColumn(String),
    /// The attribute flows need at least two attributes.
    NotEnoughFlowAttributes(usize),
}

impl Error for ReportErrors {}

impl Display for ReportErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportErrors::NoCommonColumns => write!(
                f,
                "the entry and exit records have no column in common, cannot join them"
            ),
            ReportErrors::MissingColumn(c) => write!(f, "missing column {:?}", c),
            ReportErrors::NotEnoughFlowAttributes(n) => write!(
                f,
                "at least two attributes are needed for the flows, got {}",
                n
            ),
        }
    }
}
