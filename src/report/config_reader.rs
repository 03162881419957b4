use crate::report::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENTRY_SHEET: &str = "Entry data";
pub const DEFAULT_EXIT_SHEET: &str = "Exit data";
pub const DEFAULT_MAX_COLUMNS: usize = 10;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: Option<String>,
    #[serde(rename = "continuumName")]
    pub continuum_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// The metadata written at the top of the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub report: String,
    pub continuum: Option<String>,
    pub columns: Vec<String>,
}

/// One source of records: a workbook with both sheets, or a pair of CSV files.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "entryPath")]
    pub entry_path: Option<String>,
    #[serde(rename = "exitPath")]
    pub exit_path: Option<String>,
    #[serde(rename = "entrySheet")]
    pub entry_sheet: Option<String>,
    #[serde(rename = "exitSheet")]
    pub exit_sheet: Option<String>,
}

impl FileSource {
    pub fn xlsx(path: &str) -> FileSource {
        FileSource {
            provider: "xlsx".to_string(),
            file_path: Some(path.to_string()),
            entry_path: None,
            exit_path: None,
            entry_sheet: None,
            exit_sheet: None,
        }
    }

    pub fn csv(entry_path: &str, exit_path: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: None,
            entry_path: Some(entry_path.to_string()),
            exit_path: Some(exit_path.to_string()),
            entry_sheet: None,
            exit_sheet: None,
        }
    }
}

/// Column names that differ from the defaults of the exports.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnOverrides {
    #[serde(rename = "uniqueId")]
    pub unique_id: Option<String>,
    #[serde(rename = "householdId")]
    pub household_id: Option<String>,
    #[serde(rename = "enrollmentStartDate")]
    pub enrollment_start_date: Option<String>,
    #[serde(rename = "enrollmentExitDate")]
    pub enrollment_exit_date: Option<String>,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: Option<String>,
    #[serde(rename = "housingMoveInDate")]
    pub housing_move_in_date: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub ethnicity: Option<String>,
    #[serde(rename = "relationshipToHeadOfHousehold")]
    pub relationship_to_head_of_household: Option<String>,
    pub destination: Option<String>,
    #[serde(rename = "specifyOtherExitDestination")]
    pub specify_other_exit_destination: Option<String>,
}

impl ColumnOverrides {
    pub fn apply(&self, base: &ColumnNames) -> ColumnNames {
        let pick = |o: &Option<String>, d: &String| o.clone().unwrap_or_else(|| d.clone());
        ColumnNames {
            unique_id: pick(&self.unique_id, &base.unique_id),
            household_id: pick(&self.household_id, &base.household_id),
            enrollment_start_date: pick(&self.enrollment_start_date, &base.enrollment_start_date),
            enrollment_exit_date: pick(&self.enrollment_exit_date, &base.enrollment_exit_date),
            date_of_birth: pick(&self.date_of_birth, &base.date_of_birth),
            housing_move_in_date: pick(&self.housing_move_in_date, &base.housing_move_in_date),
            gender: pick(&self.gender, &base.gender),
            race: pick(&self.race, &base.race),
            ethnicity: pick(&self.ethnicity, &base.ethnicity),
            relationship_to_head_of_household: pick(
                &self.relationship_to_head_of_household,
                &base.relationship_to_head_of_household,
            ),
            destination: pick(&self.destination, &base.destination),
            specify_other_exit_destination: pick(
                &self.specify_other_exit_destination,
                &base.specify_other_exit_destination,
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSources", default)]
    pub input_sources: Vec<FileSource>,
    pub columns: Option<ColumnOverrides>,
    #[serde(rename = "maxColumns")]
    pub max_columns: Option<usize>,
    #[serde(rename = "flowAttributes")]
    pub flow_attributes: Option<Vec<String>>,
}

impl ReportConfig {
    pub fn column_names(&self) -> ColumnNames {
        match &self.columns {
            Some(overrides) => overrides.apply(&ColumnNames::default()),
            None => ColumnNames::default(),
        }
    }

    pub fn flow_attributes(&self) -> ReportResult<Vec<Attribute>> {
        match &self.flow_attributes {
            None => Ok(Attribute::DEFAULT_FLOW.to_vec()),
            Some(labels) => {
                let mut res: Vec<Attribute> = Vec::new();
                for label in labels.iter() {
                    match Attribute::from_label(label) {
                        Some(a) => res.push(a),
                        None => whatever!(
                            "Unknown flow attribute {:?}, expected one of Race, Destination Type, Destination, Ethnicity, Gender",
                            label
                        ),
                    }
                }
                Ok(res)
            }
        }
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            report: self
                .output_settings
                .report_name
                .clone()
                .unwrap_or_else(|| "Q23c. Exit Destination".to_string()),
            continuum: self.output_settings.continuum_name.clone(),
            columns: REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {} bytes from {}", contents.len(), path);
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let s = r#"{
            "outputSettings": {"reportName": "APR 2023", "continuumName": "Example CoC"},
            "inputSources": [
                {"provider": "xlsx", "filePath": "q1.xlsx", "entrySheet": "Entries"},
                {"provider": "csv", "entryPath": "entry.csv", "exitPath": "exit.csv"}
            ],
            "columns": {"dateOfBirth": "Date of Birth"},
            "maxColumns": 12,
            "flowAttributes": ["Gender", "destination type"]
        }"#;
        let config: ReportConfig = serde_json::from_str(s).unwrap();
        assert_eq!(config.input_sources.len(), 2);
        assert_eq!(config.input_sources[0].entry_sheet.as_deref(), Some("Entries"));
        assert_eq!(config.input_sources[1], FileSource::csv("entry.csv", "exit.csv"));
        assert_eq!(config.max_columns, Some(12));
        let columns = config.column_names();
        assert_eq!(columns.date_of_birth, "Date of Birth");
        assert_eq!(columns.household_id, "Household ID");
        assert_eq!(
            config.flow_attributes().unwrap(),
            vec![Attribute::Gender, Attribute::DestinationType]
        );
        assert_eq!(config.output_config().report, "APR 2023");
    }

    #[test]
    fn empty_config() {
        let config: ReportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.column_names(), ColumnNames::default());
        assert_eq!(
            config.flow_attributes().unwrap(),
            Attribute::DEFAULT_FLOW.to_vec()
        );
    }

    #[test]
    fn unknown_flow_attribute() {
        let config = ReportConfig {
            flow_attributes: Some(vec!["Race".to_string(), "Shoe size".to_string()]),
            ..ReportConfig::default()
        };
        assert!(config.flow_attributes().is_err());
    }
}
