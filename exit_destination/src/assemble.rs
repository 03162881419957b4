//! Assembly of the full exit destination table.

use log::{info, warn};

use crate::aggregate::{build_destination_table, scored_records};
use crate::config::*;

/// Sums the counts of the rows selected by the predicate.
fn sum_rows<F>(rows: &[ReportRow], predicate: F) -> HouseholdCounts
where
    F: Fn(&ReportRow) -> bool,
{
    rows.iter()
        .filter(|r| predicate(*r))
        .filter_map(|r| r.counts())
        .sum()
}

fn percentage(count: u64, denominator: usize) -> Percentage {
    if denominator == 0 {
        return Percentage::NotAvailable;
    }
    let p = count as f64 / denominator as f64 * 100.0;
    // Ties round to even: 3.125 -> 3.12
    Percentage::Value((p * 100.0).round_ties_even() / 100.0)
}

/// The number of head of household rows that moved in and have a destination type.
/// This is the denominator of the percentage row.
pub fn percentage_denominator(records: &[EnrollmentRecord]) -> usize {
    scored_records(records)
        .iter()
        .filter(|r| r.destination_type.is_some())
        .count()
}

/// Builds the complete table: the four destination blocks, then the total, the positive
/// and excluded destinations and the percentages.
pub fn assemble_report(records: &[EnrollmentRecord]) -> PerformanceReport {
    let mut rows: Vec<ReportRow> = Vec::new();
    for category in DestinationType::ordered() {
        rows.extend(build_destination_table(
            category,
            &category.destinations(),
            records,
        ));
    }

    let total = sum_rows(&rows, |r| r.kind == RowKind::Subtotal);
    let positive = sum_rows(&rows, |r| {
        r.kind == RowKind::Destination
            && DestinationType::Permanent
                .destinations()
                .contains(&r.destination.as_str())
    });
    let excluded = sum_rows(&rows, |r| {
        r.kind == RowKind::Destination
            && [
                DestinationType::Temporary,
                DestinationType::Institutional,
                DestinationType::Other,
            ]
            .iter()
            .any(|dt| dt.destinations().contains(&r.destination.as_str()))
    });

    let denominator = percentage_denominator(records);
    if denominator == 0 {
        warn!(
            "assemble_report: no household with a move-in date and a known destination, percentages are not available"
        );
    }
    let values = total.values();
    let percentages: [Percentage; 5] = [
        percentage(values[0], denominator),
        percentage(values[1], denominator),
        percentage(values[2], denominator),
        percentage(values[3], denominator),
        percentage(values[4], denominator),
    ];
    info!(
        "assemble_report: total {:?}, positive {:?}, excluded {:?}, denominator {}",
        total, positive, excluded, denominator
    );

    rows.push(ReportRow {
        kind: RowKind::Total,
        destination: TOTAL_LABEL.to_string(),
        values: RowValues::Counts(total),
    });
    rows.push(ReportRow {
        kind: RowKind::PositiveTotal,
        destination: POSITIVE_TOTAL_LABEL.to_string(),
        values: RowValues::Counts(positive),
    });
    rows.push(ReportRow {
        kind: RowKind::ExcludedTotal,
        destination: EXCLUDED_TOTAL_LABEL.to_string(),
        values: RowValues::Counts(excluded),
    });
    rows.push(ReportRow {
        kind: RowKind::Percentage,
        destination: PERCENTAGE_LABEL.to_string(),
        values: RowValues::Percentages(percentages),
    });
    PerformanceReport { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::test_record;

    fn sample() -> Vec<EnrollmentRecord> {
        vec![
            test_record("H1", Some(40), Some("Rental by client in a public housing unit")),
            test_record("H2", Some(30), Some("Safe Haven")),
            test_record("H3", Some(12), Some("Deceased")),
            test_record("H4", None, Some("Jail, prison, or juvenile detention facility")),
            // Not in the taxonomy
            test_record("H5", Some(50), Some("Moved to the moon")),
        ]
    }

    #[test]
    fn layout_of_the_report() {
        let report = assemble_report(&sample());
        // 4 headers, 33 destinations, 4 subtotals, 4 summary rows
        assert_eq!(report.rows.len(), 4 + 33 + 4 + 4);
        assert_eq!(report.rows_of_kind(RowKind::Header).count(), 4);
        let labels: Vec<&str> = report.rows[41..]
            .iter()
            .map(|r| r.destination.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Total",
                "Total persons exiting to positive housing destinations",
                "Total persons whose destinations excluded them from the calculation",
                "Percentage"
            ]
        );
        for r in report.rows_of_kind(RowKind::Header) {
            assert_eq!(r.rendered_values(), vec![""; 5]);
        }
    }

    #[test]
    fn subtotals_and_totals_add_up() {
        let report = assemble_report(&sample());
        let mut block_sum = HouseholdCounts::EMPTY;
        for r in report.rows.iter() {
            match r.kind {
                RowKind::Destination => block_sum += *r.counts().unwrap(),
                RowKind::Subtotal => {
                    assert_eq!(block_sum, *r.counts().unwrap());
                    block_sum = HouseholdCounts::EMPTY;
                }
                _ => {}
            }
        }
        let total: HouseholdCounts = report.subtotals().iter().sum();
        assert_eq!(Some(&total), report.counts_of(RowKind::Total));
        assert_eq!(total.total, 4);
        assert_eq!(total.without_children, 2);
        assert_eq!(total.with_only_children, 1);
        assert_eq!(total.unknown, 1);

        let positive = report.counts_of(RowKind::PositiveTotal).unwrap();
        let excluded = report.counts_of(RowKind::ExcludedTotal).unwrap();
        assert_eq!(positive.total, 1);
        assert_eq!(excluded.total, 3);
        assert_eq!(*positive + *excluded, total);
    }

    #[test]
    fn percentages_are_rendered_like_the_legacy_report() {
        let report = assemble_report(&sample());
        let rendered: Vec<String> = report
            .percentages()
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(rendered, vec!["100.0%", "50.0%", "0.0%", "25.0%", "25.0%"]);

        let three = vec![
            test_record("H1", Some(40), Some("Deceased")),
            test_record("H2", Some(40), Some("Other")),
            test_record("H3", Some(10), Some("Other")),
        ];
        let report = assemble_report(&three);
        let p = report.percentages().unwrap();
        assert_eq!(p[1].to_string(), "66.67%");
        assert_eq!(p[3].to_string(), "33.33%");

        // One household with only children out of 32: 3.125 rounds to even.
        let mut many: Vec<EnrollmentRecord> = (0..31)
            .map(|i| test_record(&format!("A{}", i), Some(40), Some("Deceased")))
            .collect();
        many.push(test_record("C1", Some(12), Some("Deceased")));
        let report = assemble_report(&many);
        let p = report.percentages().unwrap();
        assert_eq!(p[1].to_string(), "96.88%");
        assert_eq!(p[3].to_string(), "3.12%");
    }

    #[test]
    fn no_move_in_date_gives_not_available() {
        let mut records = sample();
        for r in records.iter_mut() {
            r.housing_move_in_date = None;
            r.destination_type = None;
        }
        let report = assemble_report(&records);
        for p in report.percentages().unwrap() {
            assert_eq!(p.to_string(), "N/A");
        }
        assert_eq!(report.counts_of(RowKind::Total), Some(&HouseholdCounts::EMPTY));
    }

    #[test]
    fn assembling_twice_gives_the_same_table() {
        let records = sample();
        assert_eq!(assemble_report(&records), assemble_report(&records));
    }
}
