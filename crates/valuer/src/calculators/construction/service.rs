use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    Assessment, CalculatorKind, ConstructionProp, ItemId, PropId, StoredLineItem, YearBand,
    YearRangeValue,
};
use super::engine::{cost_per_square_metre, CalculatorConfig};
use super::rates::RateSchedule;
use super::reconcile::ReconcilePlan;
use super::repository::{
    ConstructionRecord, ConstructionRecordView, ConstructionRepository, PropUpdate,
    RateScheduleRepository, RepositoryError,
};
use super::resolver::{resolve_items, ResolvedItem};
use super::validation::{
    validate_calculation, CalculationRequest, FieldError, NewConstructionRequest, ValidationError,
};

/// Service composing validation, rate resolution, the calculator engine, and
/// the atomic persistence step.
pub struct CalculationService<R, S> {
    records: Arc<R>,
    rates: Arc<S>,
    config: CalculatorConfig,
}

static PROP_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_prop_id() -> PropId {
    let id = PROP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PropId(format!("prop-{id:06}"))
}

fn next_item_id() -> ItemId {
    let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ItemId(format!("item-{id:06}"))
}

impl<R, S> CalculationService<R, S>
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    pub fn new(records: Arc<R>, rates: Arc<S>, config: CalculatorConfig) -> Self {
        Self {
            records,
            rates,
            config,
        }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Create a construction record. Item ids in the payload are ignored;
    /// every submitted item is stored fresh.
    pub fn create(
        &self,
        request: NewConstructionRequest,
    ) -> Result<ConstructionRecord, CalculationServiceError> {
        let normalized = validate_calculation(&CalculationRequest {
            floor_area: request.floor_area,
            veranda_floor_area: request.veranda_floor_area,
            dev_year: request.dev_year.clone(),
            items: request.items.clone(),
        })?;

        let items = normalized
            .items
            .into_iter()
            .map(|item| StoredLineItem {
                id: next_item_id(),
                element: item.element,
                quality_of_finish: item.quality_of_finish,
                source: item.source,
            })
            .collect();

        let record = ConstructionRecord {
            prop: ConstructionProp {
                id: next_prop_id(),
                kind: request.kind,
                floor_area: normalized.floor_area,
                veranda_floor_area: normalized.veranda_floor_area,
                dev_year: normalized.dev_year_raw,
            },
            assessment: Assessment::pending(request.basis),
            items,
        };

        let stored = self.records.insert(record)?;
        info!(id = %stored.prop.id.0, kind = stored.prop.kind.label(), "construction record created");
        Ok(stored)
    }

    /// Fetch a record for API responses. A missing record is fatal here,
    /// unlike a missing rate row inside a calculation.
    pub fn get(&self, id: &PropId) -> Result<ConstructionRecord, CalculationServiceError> {
        let record = self.records.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Run the calculator for one record and persist the result.
    ///
    /// Validates the submission, resolves every line item against the rate
    /// schedule for the record's kind, aggregates the cost per square metre,
    /// and applies the reconciled item set, updated metadata, and computed
    /// rate in one atomic repository call.
    pub fn calculate(
        &self,
        id: &PropId,
        request: CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationServiceError> {
        let normalized = validate_calculation(&request)?;

        let record = self.records.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let kind = record.prop.kind;

        let band = self.config.boundaries.band_for(normalized.dev_year);
        let schedule = RateSchedule::for_kind(kind, self.rates.rows_for(kind)?);
        let resolved = resolve_items(&normalized.items, &schedule, band);
        let rate = cost_per_square_metre(
            &resolved,
            normalized.floor_area,
            normalized.veranda_floor_area,
            &self.config.weights,
        );

        let plan = ReconcilePlan::between(&record.items, normalized.items, next_item_id)
            .map_err(|err| ValidationError::single("items", err.to_string()))?;
        debug!(
            deletes = plan.deletes.len(),
            updates = plan.updates.len(),
            creates = plan.creates.len(),
            "reconcile plan built"
        );

        let computed_at = Utc::now();
        let update = PropUpdate {
            floor_area: normalized.floor_area,
            veranda_floor_area: normalized.veranda_floor_area,
            dev_year: normalized.dev_year_raw,
        };
        let stored = self
            .records
            .apply_calculation(id, update, plan, rate, computed_at)?;

        info!(
            id = %stored.prop.id.0,
            kind = kind.label(),
            rate,
            "construction rate computed"
        );

        Ok(CalculationOutcome {
            prop_id: stored.prop.id.clone(),
            cost_per_sqm_quality: rate,
            band,
            computed_at,
            items: resolved,
            record: stored.view(),
        })
    }

    /// Rows currently applicable to a kind (its partition plus generic rows).
    pub fn schedule(
        &self,
        kind: CalculatorKind,
    ) -> Result<Vec<YearRangeValue>, CalculationServiceError> {
        Ok(self.rates.rows_for(kind)?)
    }

    /// Admin bulk replace of one kind's schedule partition. Row kinds must be
    /// absent or match the target kind; identifiers must be unique.
    pub fn replace_schedule(
        &self,
        kind: CalculatorKind,
        rows: Vec<YearRangeValue>,
    ) -> Result<usize, CalculationServiceError> {
        let mut fields = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            if row.identifier.trim().is_empty() {
                fields.push(FieldError {
                    field: format!("rows[{index}].identifier"),
                    message: "must not be empty".to_string(),
                });
            } else if !seen.insert(row.identifier.trim().to_string()) {
                fields.push(FieldError {
                    field: format!("rows[{index}].identifier"),
                    message: format!("duplicate identifier '{}'", row.identifier.trim()),
                });
            }

            if matches!(row.kind, Some(row_kind) if row_kind != kind) {
                fields.push(FieldError {
                    field: format!("rows[{index}].kind"),
                    message: format!("row kind must be '{}' or absent", kind.label()),
                });
            }

            for (column, value) in [
                ("first", row.first),
                ("second", row.second),
                ("third", row.third),
            ] {
                if !value.is_finite() {
                    fields.push(FieldError {
                        field: format!("rows[{index}].{column}"),
                        message: "must be a finite number".to_string(),
                    });
                }
            }
        }

        if !fields.is_empty() {
            return Err(ValidationError { fields }.into());
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.identifier = row.identifier.trim().to_string();
                row.kind = Some(kind);
                row
            })
            .collect();

        let count = self.rates.replace_schedule(kind, rows)?;
        info!(kind = kind.label(), rows = count, "rate schedule replaced");
        Ok(count)
    }
}

/// Result of one calculation: the aggregate figure, the per-item audit trail,
/// and the persisted record view.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationOutcome {
    pub prop_id: PropId,
    pub cost_per_sqm_quality: f64,
    pub band: YearBand,
    pub computed_at: DateTime<Utc>,
    pub items: Vec<ResolvedItem>,
    pub record: ConstructionRecordView,
}

/// Error raised by the calculation service.
#[derive(Debug, thiserror::Error)]
pub enum CalculationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
