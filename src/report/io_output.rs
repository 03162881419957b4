// The JSON summary and the Excel version of the report.

use exit_destination::summaries::{CountEntry, FlowLink, MonthlyMoveIns, Summaries};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Map as JSMap;

use crate::report::*;

pub const XLSX_SHEET_NAME: &str = "Q23c";

/// One object per row: the legacy columns plus the `kind` of the row.
/// Counts are numbers, header cells null and percentages strings.
pub fn report_to_json(report: &PerformanceReport) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for row in report.rows.iter() {
        let mut js: JSMap<String, JSValue> = JSMap::new();
        js.insert("kind".to_string(), json!(row.kind.name()));
        js.insert(REPORT_COLUMNS[0].to_string(), json!(row.destination));
        let values: Vec<JSValue> = match &row.values {
            RowValues::Empty => vec![JSValue::Null; 5],
            RowValues::Counts(c) => c.values().iter().map(|v| json!(v)).collect(),
            RowValues::Percentages(ps) => ps.iter().map(|p| json!(p.to_string())).collect(),
        };
        for (name, value) in REPORT_COLUMNS[1..].iter().zip(values) {
            js.insert(name.to_string(), value);
        }
        l.push(JSValue::Object(js));
    }
    l
}

fn counts_to_json(entries: &[CountEntry]) -> Vec<JSValue> {
    entries
        .iter()
        .map(|e| json!({"label": e.label, "count": e.count}))
        .collect()
}

fn timeline_to_json(months: &[MonthlyMoveIns]) -> Vec<JSValue> {
    months
        .iter()
        .map(|m| {
            json!({
                "month": m.month,
                "individuals": m.individuals,
                "households": m.households,
            })
        })
        .collect()
}

fn flows_to_json(links: &[FlowLink]) -> Vec<JSValue> {
    links
        .iter()
        .map(|l| json!({"source": l.source, "target": l.target, "count": l.count}))
        .collect()
}

pub fn summaries_to_json(s: &Summaries) -> JSValue {
    json!({
        "destinationHouseholds": counts_to_json(&s.destination_households),
        "householdTypes": counts_to_json(&s.household_types),
        "ageRanges": counts_to_json(&s.age_ranges),
        "genders": counts_to_json(&s.genders),
        "races": counts_to_json(&s.races),
        "ethnicities": counts_to_json(&s.ethnicities),
        "moveInTimeline": timeline_to_json(&s.move_in_timeline),
        "flows": flows_to_json(&s.flows),
    })
}

pub fn data_quality_to_json(dq: &DataQuality) -> JSValue {
    json!({
        "entryDuplicatesRemoved": dq.entry_duplicates_removed,
        "exitDuplicatesRemoved": dq.exit_duplicates_removed,
        "rowsWithoutExitDate": dq.rows_without_exit_date,
        "rowsWithoutHouseholdId": dq.rows_without_household_id,
        "recordsWithUnknownAge": dq.records_with_unknown_age,
        "recordsWithoutMoveInDate": dq.records_without_move_in_date,
        "taxonomyMismatches": dq.taxonomy_mismatches,
        "unmatchedDestinations": dq.unmatched_destinations,
        "householdsWithConflictingMoveIn": dq.households_with_conflicting_move_in,
    })
}

pub fn build_summary_js(
    config: &OutputConfig,
    analysis: &PerformanceAnalysis,
    summaries: &Summaries,
) -> JSValue {
    json!({
        "config": config,
        "report": report_to_json(&analysis.report),
        "summaries": summaries_to_json(summaries),
        "dataQuality": data_quality_to_json(&analysis.data_quality),
    })
}

pub fn write_json(js: &JSValue, path: &str) -> ReportResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    fs::write(path, pretty).context(WritingOutputSnafu { path })?;
    info!("write_json: summary written to {}", path);
    Ok(())
}

/// Writes the report in a single worksheet. Section headers and the summary rows are
/// in bold, the counts are numbers.
pub fn write_report_xlsx(report: &PerformanceReport, path: &str) -> ReportResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let plain = Format::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(XLSX_SHEET_NAME)
        .context(WritingXlsxSnafu { path })?;

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &bold)
            .context(WritingXlsxSnafu { path })?;
    }
    worksheet
        .set_column_width(0, 60)
        .context(WritingXlsxSnafu { path })?;

    for (idx, row) in report.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        let format = match row.kind {
            RowKind::Destination => &plain,
            _ => &bold,
        };
        worksheet
            .write_string_with_format(r, 0, &row.destination, format)
            .context(WritingXlsxSnafu { path })?;
        match &row.values {
            RowValues::Empty => {}
            RowValues::Counts(c) => {
                for (col, v) in c.values().iter().enumerate() {
                    worksheet
                        .write_number_with_format(r, (col + 1) as u16, *v as f64, format)
                        .context(WritingXlsxSnafu { path })?;
                }
            }
            RowValues::Percentages(ps) => {
                for (col, p) in ps.iter().enumerate() {
                    worksheet
                        .write_string_with_format(r, (col + 1) as u16, p.to_string(), format)
                        .context(WritingXlsxSnafu { path })?;
                }
            }
        }
    }

    workbook.save(path).context(WritingXlsxSnafu { path })?;
    info!("write_report_xlsx: {} rows written to {}", report.rows.len(), path);
    Ok(())
}
