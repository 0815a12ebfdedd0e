use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentBasis, CalculatorKind, ItemId, LineItem, LineItemDraft, RateSource,
};

const EARLIEST_DEV_YEAR: i32 = 1800;

/// Request payload for creating a construction record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConstructionRequest {
    pub kind: CalculatorKind,
    pub basis: AssessmentBasis,
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: String,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
}

/// Request payload for recalculating a record: updated areas and development
/// year plus the full line-item set as edited. The record's kind is fixed at
/// creation and deliberately absent here.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationRequest {
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: String,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
}

/// One rejected field, addressed by its position in the submitted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Structured per-field rejection surfaced to the caller; nothing that fails
/// validation reaches the calculator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission failed validation ({} field(s) rejected)", .fields.len())]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }
}

/// Calculation inputs after validation: numeric fields checked, the
/// development year parsed, and every line item's sentinel multiplier
/// normalized into an explicit [`RateSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCalculation {
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: i32,
    pub dev_year_raw: String,
    pub items: Vec<LineItem>,
}

pub fn validate_calculation(
    request: &CalculationRequest,
) -> Result<NormalizedCalculation, ValidationError> {
    let mut fields = Vec::new();

    check_area("floor_area", request.floor_area, &mut fields);
    check_area("veranda_floor_area", request.veranda_floor_area, &mut fields);

    let dev_year = parse_dev_year(&request.dev_year, &mut fields);

    let mut items = Vec::with_capacity(request.items.len());
    for (index, draft) in request.items.iter().enumerate() {
        if let Some(item) = normalize_item(index, draft, &mut fields) {
            items.push(item);
        }
    }

    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }

    Ok(NormalizedCalculation {
        floor_area: request.floor_area,
        veranda_floor_area: request.veranda_floor_area,
        dev_year: dev_year.unwrap_or(EARLIEST_DEV_YEAR),
        dev_year_raw: request.dev_year.trim().to_string(),
        items,
    })
}

fn check_area(field: &str, value: f64, fields: &mut Vec<FieldError>) {
    if !value.is_finite() {
        fields.push(FieldError {
            field: field.to_string(),
            message: "must be a finite number".to_string(),
        });
    } else if value < 0.0 {
        fields.push(FieldError {
            field: field.to_string(),
            message: "must not be negative".to_string(),
        });
    }
}

fn parse_dev_year(raw: &str, fields: &mut Vec<FieldError>) -> Option<i32> {
    let trimmed = raw.trim();
    let parsed = trimmed.parse::<i32>().ok();

    // Permit next year so in-flight developments can be recorded.
    let latest = Utc::now().year() + 1;
    match parsed {
        Some(year) if (EARLIEST_DEV_YEAR..=latest).contains(&year) => Some(year),
        Some(year) => {
            fields.push(FieldError {
                field: "dev_year".to_string(),
                message: format!("year {year} outside supported range {EARLIEST_DEV_YEAR}-{latest}"),
            });
            None
        }
        None => {
            fields.push(FieldError {
                field: "dev_year".to_string(),
                message: format!("'{trimmed}' is not a valid year"),
            });
            None
        }
    }
}

fn normalize_item(
    index: usize,
    draft: &LineItemDraft,
    fields: &mut Vec<FieldError>,
) -> Option<LineItem> {
    let mut valid = true;

    if draft.element.trim().is_empty() {
        fields.push(FieldError {
            field: format!("items[{index}].element"),
            message: "must not be empty".to_string(),
        });
        valid = false;
    }

    if let Some(ItemId(id)) = &draft.id {
        if id.trim().is_empty() {
            fields.push(FieldError {
                field: format!("items[{index}].id"),
                message: "must not be blank when present".to_string(),
            });
            valid = false;
        }
    }

    // The edit form submits the multiplier as a string; empty means "use the
    // schedule", anything else must parse as a number and wins outright.
    let multiplier = draft
        .multiplier
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let source = match multiplier {
        Some(raw) => match raw.parse::<f64>() {
            Ok(rate) if rate.is_finite() => RateSource::Override { rate },
            _ => {
                fields.push(FieldError {
                    field: format!("items[{index}].multiplier"),
                    message: format!("'{raw}' is not a valid rate"),
                });
                valid = false;
                RateSource::Unselected
            }
        },
        None => match draft
            .property_option
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(identifier) => RateSource::Lookup {
                identifier: identifier.to_string(),
            },
            None => RateSource::Unselected,
        },
    };

    if !valid {
        return None;
    }

    Some(LineItem {
        id: draft.id.clone(),
        element: draft.element.trim().to_string(),
        quality_of_finish: draft.quality_of_finish.trim().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CalculationRequest {
        CalculationRequest {
            floor_area: 100.0,
            veranda_floor_area: 0.0,
            dev_year: "1984".to_string(),
            items: vec![LineItemDraft {
                id: None,
                element: "Foundation".to_string(),
                property_option: Some("Foundations - Yes".to_string()),
                quality_of_finish: "standard".to_string(),
                multiplier: None,
            }],
        }
    }

    #[test]
    fn valid_request_normalizes_to_a_lookup() {
        let normalized = validate_calculation(&request()).expect("request is valid");
        assert_eq!(normalized.dev_year, 1984);
        assert_eq!(
            normalized.items[0].source,
            RateSource::Lookup {
                identifier: "Foundations - Yes".to_string()
            }
        );
    }

    #[test]
    fn empty_multiplier_string_is_the_lookup_sentinel() {
        let mut request = request();
        request.items[0].multiplier = Some("  ".to_string());

        let normalized = validate_calculation(&request).expect("sentinel accepted");
        assert!(matches!(
            normalized.items[0].source,
            RateSource::Lookup { .. }
        ));
    }

    #[test]
    fn numeric_multiplier_becomes_an_override() {
        let mut request = request();
        request.items[0].multiplier = Some("350".to_string());

        let normalized = validate_calculation(&request).expect("override accepted");
        assert_eq!(
            normalized.items[0].source,
            RateSource::Override { rate: 350.0 }
        );
    }

    #[test]
    fn missing_property_option_normalizes_to_unselected() {
        let mut request = request();
        request.items[0].property_option = None;

        let normalized = validate_calculation(&request).expect("valid");
        assert_eq!(normalized.items[0].source, RateSource::Unselected);
    }

    #[test]
    fn collects_every_rejected_field() {
        let request = CalculationRequest {
            floor_area: f64::NAN,
            veranda_floor_area: -3.0,
            dev_year: "next year".to_string(),
            items: vec![LineItemDraft {
                id: None,
                element: " ".to_string(),
                property_option: None,
                quality_of_finish: String::new(),
                multiplier: Some("lots".to_string()),
            }],
        };

        let err = validate_calculation(&request).expect_err("invalid request");
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "floor_area",
                "veranda_floor_area",
                "dev_year",
                "items[0].element",
                "items[0].multiplier",
            ]
        );
    }

    #[test]
    fn far_future_dev_year_is_rejected() {
        let mut request = request();
        request.dev_year = "3020".to_string();

        let err = validate_calculation(&request).expect_err("future year rejected");
        assert_eq!(err.fields[0].field, "dev_year");
    }
}
