//! Descriptive statistics of the exits, as shown in the charts that accompany the report.
//!
//! Every function takes the classified records explicitly.

use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::*;

/// A labelled count, for pie and bar charts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

impl CountEntry {
    fn new(label: &str, count: u64) -> CountEntry {
        CountEntry {
            label: label.to_string(),
            count,
        }
    }
}

/// Move-ins during one calendar month.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MonthlyMoveIns {
    /// For example `June 2020`
    pub month: String,
    pub individuals: u64,
    pub households: u64,
}

/// One link of a flow diagram: how many clients go from one attribute value to the next.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub count: u64,
}

/// The client attributes that can be chained in a flow diagram.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Attribute {
    Race,
    DestinationType,
    Destination,
    Ethnicity,
    Gender,
}

impl Attribute {
    pub const DEFAULT_FLOW: [Attribute; 3] = [
        Attribute::Race,
        Attribute::DestinationType,
        Attribute::Destination,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Race => "Race",
            Attribute::DestinationType => "Destination Type",
            Attribute::Destination => "Destination",
            Attribute::Ethnicity => "Ethnicity",
            Attribute::Gender => "Gender",
        }
    }

    pub fn from_label(label: &str) -> Option<Attribute> {
        [
            Attribute::Race,
            Attribute::DestinationType,
            Attribute::Destination,
            Attribute::Ethnicity,
            Attribute::Gender,
        ]
        .into_iter()
        .find(|a| a.label().eq_ignore_ascii_case(label.trim()))
    }

    fn value(&self, r: &EnrollmentRecord) -> Option<String> {
        match self {
            Attribute::Race => r.race.clone(),
            Attribute::DestinationType => r.destination_type.map(|dt| dt.label().to_string()),
            Attribute::Destination => r.destination.clone(),
            Attribute::Ethnicity => r.ethnicity.clone(),
            Attribute::Gender => r.gender.clone(),
        }
    }
}

/// All the chart data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Summaries {
    pub destination_households: Vec<CountEntry>,
    pub household_types: Vec<CountEntry>,
    pub age_ranges: Vec<CountEntry>,
    pub genders: Vec<CountEntry>,
    pub races: Vec<CountEntry>,
    pub ethnicities: Vec<CountEntry>,
    pub move_in_timeline: Vec<MonthlyMoveIns>,
    pub flows: Vec<FlowLink>,
}

/// Households per destination type, from the subtotals of the report.
pub fn destination_households(report: &PerformanceReport) -> Vec<CountEntry> {
    DestinationType::ordered()
        .iter()
        .zip(report.subtotals())
        .map(|(dt, c)| CountEntry::new(dt.short_label(), c.total))
        .collect()
}

/// Households per household type, from the total row of the report.
pub fn household_types(report: &PerformanceReport) -> Vec<CountEntry> {
    let total = report
        .counts_of(RowKind::Total)
        .copied()
        .unwrap_or(HouseholdCounts::EMPTY);
    HouseholdType::ordered()
        .iter()
        .map(|ht| CountEntry::new(ht.label(), total.by_type(*ht)))
        .collect()
}

/// (label, lower bound inclusive, upper bound exclusive)
const AGE_RANGES: [(&str, u32, u32); 9] = [
    ("Under 5", 0, 5),
    ("5-12", 5, 13),
    ("13-17", 13, 18),
    ("18-24", 18, 25),
    ("25-34", 25, 35),
    ("35-44", 35, 45),
    ("45-54", 45, 55),
    ("55-62", 55, 62),
    ("62+", 62, u32::MAX),
];

/// Clients per age range. Clients of unknown age are under `No Answer`.
pub fn age_ranges(records: &[EnrollmentRecord]) -> Vec<CountEntry> {
    let mut res: Vec<CountEntry> = AGE_RANGES
        .iter()
        .map(|(label, low, high)| {
            let count = records
                .iter()
                .filter(|r| matches!(r.age, Some(a) if a >= *low && a < *high))
                .count();
            CountEntry::new(label, count as u64)
        })
        .collect();
    let unknown = records.iter().filter(|r| r.age.is_none()).count();
    res.push(CountEntry::new("No Answer", unknown as u64));
    res
}

pub const MISSING_LABEL: &str = "Missing";

/// Counts the values of a categorical attribute, in order of first appearance.
pub fn value_counts<F>(records: &[EnrollmentRecord], get: F) -> Vec<CountEntry>
where
    F: Fn(&EnrollmentRecord) -> Option<&String>,
{
    let mut res: Vec<CountEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for r in records.iter() {
        let label = get(r).map(|s| s.as_str()).unwrap_or(MISSING_LABEL);
        match positions.get(label) {
            Some(idx) => res[*idx].count += 1,
            None => {
                positions.insert(label.to_string(), res.len());
                res.push(CountEntry::new(label, 1));
            }
        }
    }
    res
}

fn next_month(d: NaiveDate) -> Option<NaiveDate> {
    if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    }
}

/// Move-ins per month, for every month between the first and the last move-in date,
/// months without any move-in included.
///
/// A person (or a household) is counted once per distinct move-in date.
pub fn move_in_timeline(records: &[EnrollmentRecord]) -> Vec<MonthlyMoveIns> {
    let individuals: BTreeSet<(Option<&str>, NaiveDate)> = records
        .iter()
        .filter_map(|r| {
            r.housing_move_in_date
                .map(|d| (r.unique_id.as_deref(), d))
        })
        .collect();
    let households: BTreeSet<(&str, NaiveDate)> = records
        .iter()
        .filter_map(|r| {
            r.housing_move_in_date
                .map(|d| (r.household_id.as_str(), d))
        })
        .collect();

    let (first, last) = match (
        households.iter().map(|(_, d)| *d).min(),
        households.iter().map(|(_, d)| *d).max(),
    ) {
        (Some(f), Some(l)) => (f, l),
        _ => return Vec::new(),
    };

    let month_of = |d: &NaiveDate| (d.year(), d.month());
    let mut by_month: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
    for (_, d) in individuals.iter() {
        by_month.entry(month_of(d)).or_default().0 += 1;
    }
    for (_, d) in households.iter() {
        by_month.entry(month_of(d)).or_default().1 += 1;
    }

    let mut res: Vec<MonthlyMoveIns> = Vec::new();
    let mut cur = first.with_day(1);
    while let Some(month_start) = cur {
        if month_of(&month_start) > month_of(&last) {
            break;
        }
        let (individuals, households) = by_month
            .get(&month_of(&month_start))
            .copied()
            .unwrap_or((0, 0));
        res.push(MonthlyMoveIns {
            month: month_start.format("%B %Y").to_string(),
            individuals,
            households,
        });
        cur = next_month(month_start);
    }
    res
}

/// The links between consecutive attributes, counted by client.
///
/// Clients missing one of the attributes are left out, as are records without a
/// client id. Links are sorted by source then target.
pub fn attribute_flows(
    records: &[EnrollmentRecord],
    attributes: &[Attribute],
) -> Result<Vec<FlowLink>, ReportErrors> {
    if attributes.len() < 2 {
        return Err(ReportErrors::NotEnoughFlowAttributes(attributes.len()));
    }
    let mut links: BTreeMap<(String, String), u64> = BTreeMap::new();
    for r in records.iter().filter(|r| r.unique_id.is_some()) {
        let values: Option<Vec<String>> = attributes.iter().map(|a| a.value(r)).collect();
        if let Some(values) = values {
            for pair in values.windows(2) {
                *links
                    .entry((pair[0].clone(), pair[1].clone()))
                    .or_default() += 1;
            }
        }
    }
    debug!("attribute_flows: {} links for {:?}", links.len(), attributes);
    Ok(links
        .into_iter()
        .map(|((source, target), count)| FlowLink {
            source,
            target,
            count,
        })
        .collect())
}

pub fn summarize(
    records: &[EnrollmentRecord],
    report: &PerformanceReport,
    flow_attributes: &[Attribute],
) -> Result<Summaries, ReportErrors> {
    Ok(Summaries {
        destination_households: destination_households(report),
        household_types: household_types(report),
        age_ranges: age_ranges(records),
        genders: value_counts(records, |r| r.gender.as_ref()),
        races: value_counts(records, |r| r.race.as_ref()),
        ethnicities: value_counts(records, |r| r.ethnicity.as_ref()),
        move_in_timeline: move_in_timeline(records),
        flows: attribute_flows(records, flow_attributes)?,
    })
}
