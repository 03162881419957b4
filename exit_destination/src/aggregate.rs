//! Household counts per destination.

use log::debug;
use std::collections::HashSet;

use crate::config::*;

/// The records that are counted in the report: the heads of the households that moved in.
/// Each household is then seen once.
pub fn scored_records(records: &[EnrollmentRecord]) -> Vec<&EnrollmentRecord> {
    records
        .iter()
        .filter(|r| r.has_move_in_date() && r.is_head_of_household())
        .collect()
}

/// The number of distinct households, in total and for each household type.
pub fn count_households<'a, I>(records: I) -> HouseholdCounts
where
    I: IntoIterator<Item = &'a EnrollmentRecord>,
{
    let mut all: HashSet<&str> = HashSet::new();
    let mut by_type: [HashSet<&str>; 4] = Default::default();
    for r in records {
        all.insert(r.household_id.as_str());
        let idx = HouseholdType::ordered()
            .iter()
            .position(|t| *t == r.household_type)
            .unwrap_or(3);
        by_type[idx].insert(r.household_id.as_str());
    }
    HouseholdCounts {
        total: all.len() as u64,
        without_children: by_type[0].len() as u64,
        with_children_and_adults: by_type[1].len() as u64,
        with_only_children: by_type[2].len() as u64,
        unknown: by_type[3].len() as u64,
    }
}

/// The block of the report for one destination type: a section header, one row for
/// each destination of the list (even when nobody went there) and the subtotal.
///
/// The subtotal is the sum of the rows above it. A record has a single destination,
/// so a household is never counted in two rows of the same block.
pub fn build_destination_table(
    category: DestinationType,
    destination_list: &[&str],
    records: &[EnrollmentRecord],
) -> Vec<ReportRow> {
    let scored = scored_records(records);
    let mut rows: Vec<ReportRow> = vec![ReportRow {
        kind: RowKind::Header,
        destination: category.label().to_string(),
        values: RowValues::Empty,
    }];

    let mut subtotal = HouseholdCounts::EMPTY;
    for dest in destination_list.iter() {
        let counts = count_households(scored.iter().copied().filter(|r| {
            r.destination.as_deref() == Some(*dest) && r.destination_type == Some(category)
        }));
        debug!(
            "build_destination_table: {:?} {:?}: {:?}",
            category, dest, counts
        );
        subtotal += counts;
        rows.push(ReportRow {
            kind: RowKind::Destination,
            destination: dest.to_string(),
            values: RowValues::Counts(counts),
        });
    }

    rows.push(ReportRow {
        kind: RowKind::Subtotal,
        destination: SUBTOTAL_LABEL.to_string(),
        values: RowValues::Counts(subtotal),
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::test_record;

    #[test]
    fn every_destination_has_a_row() {
        let rows = build_destination_table(
            DestinationType::Institutional,
            &DestinationType::Institutional.destinations(),
            &[],
        );
        assert_eq!(rows.len(), 1 + 6 + 1);
        assert_eq!(rows[0].kind, RowKind::Header);
        assert_eq!(rows[0].destination, "Institutional Settings");
        assert_eq!(rows[7].destination, "Subtotal");
        for r in rows[1..].iter() {
            assert_eq!(r.counts(), Some(&HouseholdCounts::EMPTY));
        }
    }

    #[test]
    fn households_are_counted_once_through_their_head() {
        let mut head = test_record("H1", Some(40), Some("Deceased"));
        head.household_type = HouseholdType::WithChildrenAndAdults;
        let mut child = test_record("H1", Some(4), Some("Deceased"));
        child.relationship_to_head_of_household = Some("Child".to_string());
        child.household_type = HouseholdType::WithChildrenAndAdults;
        // Same household, two head rows (two enrollments).
        let head2 = head.clone();
        let mut other = test_record("H2", Some(30), Some("Other"));
        other.household_type = HouseholdType::WithoutChildren;
        let mut no_move_in = test_record("H3", Some(30), Some("Other"));
        no_move_in.housing_move_in_date = None;
        no_move_in.destination_type = None;

        let records = vec![head, child, head2, other, no_move_in];
        let rows = build_destination_table(
            DestinationType::Other,
            &DestinationType::Other.destinations(),
            &records,
        );
        let deceased = rows.iter().find(|r| r.destination == "Deceased").unwrap();
        assert_eq!(deceased.counts().unwrap().total, 1);
        assert_eq!(deceased.counts().unwrap().with_children_and_adults, 1);
        let other_row = rows.iter().find(|r| r.destination == "Other").unwrap();
        assert_eq!(other_row.counts().unwrap().total, 1);
        assert_eq!(other_row.counts().unwrap().without_children, 1);

        let subtotal = rows.last().unwrap().counts().unwrap();
        assert_eq!(subtotal.total, 2);
        let summed: u64 = rows
            .iter()
            .filter(|r| r.kind == RowKind::Destination)
            .map(|r| r.counts().unwrap().total)
            .sum();
        assert_eq!(summed, subtotal.total);
    }

    #[test]
    fn rows_only_count_their_own_category() {
        let r = test_record("H1", Some(40), Some("Safe Haven"));
        let rows = build_destination_table(
            DestinationType::Permanent,
            &DestinationType::Permanent.destinations(),
            &[r],
        );
        assert_eq!(rows.last().unwrap().counts(), Some(&HouseholdCounts::EMPTY));
    }
}
