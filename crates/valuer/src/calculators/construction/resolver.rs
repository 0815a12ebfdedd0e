use serde::{Deserialize, Serialize};

use super::domain::{LineItem, RateSource, YearBand};
use super::rates::RateSchedule;

/// How a resolved rate was obtained, kept on the outcome so valuers can audit
/// each contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum RateOrigin {
    Override,
    Schedule { identifier: String },
    Unselected,
}

/// One line item's numeric contribution to the aggregate rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub element: String,
    pub quality_of_finish: String,
    pub rate: f64,
    pub origin: RateOrigin,
}

/// Resolve every submitted line item to a rate contribution.
///
/// An explicit override is used verbatim; otherwise the selected option is
/// looked up in the schedule for the record's kind, and an item with no
/// selected option contributes zero. Every input item produces exactly one
/// resolved item, in input order.
pub fn resolve_items(items: &[LineItem], schedule: &RateSchedule, band: YearBand) -> Vec<ResolvedItem> {
    items
        .iter()
        .map(|item| {
            let (rate, origin) = match &item.source {
                RateSource::Override { rate } => (*rate, RateOrigin::Override),
                RateSource::Lookup { identifier } => (
                    schedule.rate_for(identifier, band),
                    RateOrigin::Schedule {
                        identifier: identifier.clone(),
                    },
                ),
                RateSource::Unselected => (0.0, RateOrigin::Unselected),
            };

            ResolvedItem {
                element: item.element.clone(),
                quality_of_finish: item.quality_of_finish.clone(),
                rate,
                origin,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::construction::domain::{CalculatorKind, YearRangeValue};

    fn schedule() -> RateSchedule {
        RateSchedule::for_kind(
            CalculatorKind::ResidentialSsUpTo100m2,
            vec![YearRangeValue {
                identifier: "Foundations - Yes".to_string(),
                first: 200.0,
                second: 200.0,
                third: 200.0,
                kind: Some(CalculatorKind::ResidentialSsUpTo100m2),
            }],
        )
    }

    fn item(source: RateSource) -> LineItem {
        LineItem {
            id: None,
            element: "Foundation".to_string(),
            quality_of_finish: "standard".to_string(),
            source,
        }
    }

    #[test]
    fn override_wins_over_schedule_row() {
        let items = vec![item(RateSource::Override { rate: 350.0 })];
        let resolved = resolve_items(&items, &schedule(), YearBand::First);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].rate, 350.0);
        assert_eq!(resolved[0].origin, RateOrigin::Override);
    }

    #[test]
    fn lookup_uses_the_schedule_rate() {
        let items = vec![item(RateSource::Lookup {
            identifier: "Foundations - Yes".to_string(),
        })];
        let resolved = resolve_items(&items, &schedule(), YearBand::First);

        assert_eq!(resolved[0].rate, 200.0);
        assert_eq!(
            resolved[0].origin,
            RateOrigin::Schedule {
                identifier: "Foundations - Yes".to_string()
            }
        );
    }

    #[test]
    fn unselected_item_contributes_zero_but_is_kept() {
        let items = vec![
            item(RateSource::Unselected),
            item(RateSource::Lookup {
                identifier: "Foundations - Yes".to_string(),
            }),
        ];
        let resolved = resolve_items(&items, &schedule(), YearBand::First);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].rate, 0.0);
        assert_eq!(resolved[1].rate, 200.0);
    }

    #[test]
    fn missing_schedule_row_degrades_to_zero() {
        let items = vec![item(RateSource::Lookup {
            identifier: "Foundations - No".to_string(),
        })];
        let resolved = resolve_items(&items, &schedule(), YearBand::First);

        assert_eq!(resolved[0].rate, 0.0);
    }

    #[test]
    fn resolving_twice_yields_identical_results() {
        let items = vec![
            item(RateSource::Lookup {
                identifier: "Foundations - Yes".to_string(),
            }),
            item(RateSource::Override { rate: 42.5 }),
        ];
        let schedule = schedule();

        let once = resolve_items(&items, &schedule, YearBand::Second);
        let twice = resolve_items(&items, &schedule, YearBand::Second);
        assert_eq!(once, twice);
    }
}
