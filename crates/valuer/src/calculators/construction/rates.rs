use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use super::domain::{CalculatorKind, YearBand, YearRangeValue};

/// Rate table projected onto a single calculator kind.
///
/// Built from the rows fetched in one repository read; kind-specific rows
/// shadow generic (kind-less) rows for the same identifier. Lookups that find
/// no row return zero — missing schedule data means a zero cost contribution,
/// never a failure.
#[derive(Debug, Clone, Default)]
pub struct RateSchedule {
    rows: HashMap<String, YearRangeValue>,
}

impl RateSchedule {
    pub fn for_kind(kind: CalculatorKind, rows: Vec<YearRangeValue>) -> Self {
        let mut table: HashMap<String, YearRangeValue> = HashMap::new();
        for row in rows {
            match row.kind {
                Some(row_kind) if row_kind != kind => continue,
                Some(_) => {
                    table.insert(row.identifier.clone(), row);
                }
                None => {
                    // Generic rows fill gaps only.
                    table.entry(row.identifier.clone()).or_insert(row);
                }
            }
        }
        Self { rows: table }
    }

    pub fn rate_for(&self, identifier: &str, band: YearBand) -> f64 {
        self.rows
            .get(identifier)
            .map(|row| row.value_for(band))
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors raised while importing a rate schedule from CSV.
#[derive(Debug)]
pub enum ScheduleImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { record: usize, message: String },
}

impl std::fmt::Display for ScheduleImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleImportError::Io(err) => write!(f, "failed to read schedule data: {}", err),
            ScheduleImportError::Csv(err) => write!(f, "invalid schedule CSV data: {}", err),
            ScheduleImportError::Row { record, message } => {
                write!(f, "schedule row {} rejected: {}", record, message)
            }
        }
    }
}

impl std::error::Error for ScheduleImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleImportError::Io(err) => Some(err),
            ScheduleImportError::Csv(err) => Some(err),
            ScheduleImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for ScheduleImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScheduleImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    #[serde(rename = "Identifier")]
    identifier: String,
    #[serde(rename = "First")]
    first: f64,
    #[serde(rename = "Second")]
    second: f64,
    #[serde(rename = "Third")]
    third: f64,
    #[serde(rename = "Kind", default, deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Parse an admin-maintained schedule export
/// (`Identifier,First,Second,Third,Kind` with a header row).
pub fn parse_schedule_csv<R: Read>(reader: R) -> Result<Vec<YearRangeValue>, ScheduleImportError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<ScheduleRow>().enumerate() {
        let record_number = index + 1;
        let row = record?;

        if row.identifier.trim().is_empty() {
            return Err(ScheduleImportError::Row {
                record: record_number,
                message: "identifier must not be empty".to_string(),
            });
        }

        for (column, value) in [("First", row.first), ("Second", row.second), ("Third", row.third)]
        {
            if !value.is_finite() {
                return Err(ScheduleImportError::Row {
                    record: record_number,
                    message: format!("{} must be a finite number", column),
                });
            }
        }

        let kind = match row.kind.as_deref() {
            Some(label) => {
                Some(
                    label
                        .parse::<CalculatorKind>()
                        .map_err(|err| ScheduleImportError::Row {
                            record: record_number,
                            message: err.to_string(),
                        })?,
                )
            }
            None => None,
        };

        rows.push(YearRangeValue {
            identifier: row.identifier.trim().to_string(),
            first: row.first,
            second: row.second,
            third: row.third,
            kind,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(identifier: &str, first: f64, kind: Option<CalculatorKind>) -> YearRangeValue {
        YearRangeValue {
            identifier: identifier.to_string(),
            first,
            second: first + 10.0,
            third: first + 20.0,
            kind,
        }
    }

    #[test]
    fn missing_identifier_yields_zero() {
        let schedule = RateSchedule::for_kind(
            CalculatorKind::RetailShop,
            vec![row("Roofing - Tiles", 80.0, Some(CalculatorKind::RetailShop))],
        );

        assert_eq!(schedule.rate_for("Roofing - Thatch", YearBand::First), 0.0);
    }

    #[test]
    fn kind_specific_row_shadows_generic_row() {
        let schedule = RateSchedule::for_kind(
            CalculatorKind::Hotel,
            vec![
                row("Walling - Brick", 50.0, None),
                row("Walling - Brick", 75.0, Some(CalculatorKind::Hotel)),
            ],
        );

        assert_eq!(schedule.rate_for("Walling - Brick", YearBand::First), 75.0);
    }

    #[test]
    fn rows_for_other_kinds_are_ignored() {
        let schedule = RateSchedule::for_kind(
            CalculatorKind::Hotel,
            vec![row("Walling - Brick", 60.0, Some(CalculatorKind::School))],
        );

        assert!(schedule.is_empty());
        assert_eq!(schedule.rate_for("Walling - Brick", YearBand::Second), 0.0);
    }

    #[test]
    fn csv_import_parses_rows_and_blank_kind() {
        let data = "\
Identifier,First,Second,Third,Kind
Foundations - Yes,200,200,200,Residential_SS_up_to_100m2
Walling - Stone,110,130,155,
";
        let rows = parse_schedule_csv(data.as_bytes()).expect("csv parses");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, Some(CalculatorKind::ResidentialSsUpTo100m2));
        assert_eq!(rows[0].first, 200.0);
        assert_eq!(rows[1].kind, None);
    }

    #[test]
    fn csv_import_rejects_unknown_kind_label() {
        let data = "\
Identifier,First,Second,Third,Kind
Foundations - Yes,200,200,200,Residential_QS_up_to_100m2
";
        let err = parse_schedule_csv(data.as_bytes()).expect_err("unknown kind");
        assert!(matches!(err, ScheduleImportError::Row { record: 1, .. }));
    }

    #[test]
    fn csv_import_rejects_blank_identifier() {
        let data = "\
Identifier,First,Second,Third,Kind
 ,10,10,10,
";
        let err = parse_schedule_csv(data.as_bytes()).expect_err("blank identifier");
        assert!(matches!(err, ScheduleImportError::Row { record: 1, .. }));
    }
}
