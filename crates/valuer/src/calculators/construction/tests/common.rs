use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::calculators::construction::domain::{
    AssessmentBasis, CalculatorKind, LineItemDraft, PropId, YearRangeValue,
};
use crate::calculators::construction::engine::CalculatorConfig;
use crate::calculators::construction::reconcile::ReconcilePlan;
use crate::calculators::construction::repository::{
    ConstructionRecord, ConstructionRepository, PropUpdate, RateScheduleRepository,
    RepositoryError,
};
use crate::calculators::construction::service::CalculationService;
use crate::calculators::construction::validation::{CalculationRequest, NewConstructionRequest};

#[derive(Default, Clone)]
pub(super) struct InMemoryConstructionRepository {
    records: Arc<Mutex<HashMap<PropId, ConstructionRecord>>>,
}

impl ConstructionRepository for InMemoryConstructionRepository {
    fn insert(&self, record: ConstructionRecord) -> Result<ConstructionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.prop.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.prop.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &PropId) -> Result<Option<ConstructionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn apply_calculation(
        &self,
        id: &PropId,
        update: PropUpdate,
        plan: ReconcilePlan,
        rate: f64,
        computed_at: DateTime<Utc>,
    ) -> Result<ConstructionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get(id).ok_or(RepositoryError::NotFound)?;

        // Build the replacement in full before swapping it in.
        let mut next = record.clone();
        next.prop.floor_area = update.floor_area;
        next.prop.veranda_floor_area = update.veranda_floor_area;
        next.prop.dev_year = update.dev_year;
        next.items.retain(|item| !plan.deletes.contains(&item.id));
        for updated in plan.updates {
            if let Some(slot) = next.items.iter_mut().find(|item| item.id == updated.id) {
                *slot = updated;
            }
        }
        next.items.extend(plan.creates);
        next.assessment.rate = Some(rate);
        next.assessment.computed_at = Some(computed_at);

        guard.insert(id.clone(), next.clone());
        Ok(next)
    }
}

#[derive(Default, Clone)]
pub(super) struct InMemoryRateScheduleRepository {
    rows: Arc<Mutex<Vec<YearRangeValue>>>,
}

impl InMemoryRateScheduleRepository {
    pub(super) fn with_rows(rows: Vec<YearRangeValue>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }
}

impl RateScheduleRepository for InMemoryRateScheduleRepository {
    fn rows_for(&self, kind: CalculatorKind) -> Result<Vec<YearRangeValue>, RepositoryError> {
        let guard = self.rows.lock().expect("schedule mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| row.kind.is_none() || row.kind == Some(kind))
            .cloned()
            .collect())
    }

    fn replace_schedule(
        &self,
        kind: CalculatorKind,
        rows: Vec<YearRangeValue>,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.rows.lock().expect("schedule mutex poisoned");
        guard.retain(|row| row.kind != Some(kind));
        let count = rows.len();
        guard.extend(rows);
        Ok(count)
    }
}

/// Wrapper that serves reads but refuses the atomic apply, for asserting that
/// a failed unit of work leaves prior state untouched.
#[derive(Clone)]
pub(super) struct FailingApplyRepository {
    pub(super) inner: InMemoryConstructionRepository,
}

impl ConstructionRepository for FailingApplyRepository {
    fn insert(&self, record: ConstructionRecord) -> Result<ConstructionRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &PropId) -> Result<Option<ConstructionRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn apply_calculation(
        &self,
        _id: &PropId,
        _update: PropUpdate,
        _plan: ReconcilePlan,
        _rate: f64,
        _computed_at: DateTime<Utc>,
    ) -> Result<ConstructionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("write refused".to_string()))
    }
}

pub(super) fn foundations_row() -> YearRangeValue {
    YearRangeValue {
        identifier: "Foundations - Yes".to_string(),
        first: 200.0,
        second: 200.0,
        third: 200.0,
        kind: Some(CalculatorKind::ResidentialSsUpTo100m2),
    }
}

pub(super) fn draft_item(option: Option<&str>, multiplier: Option<&str>) -> LineItemDraft {
    LineItemDraft {
        id: None,
        element: "Foundation".to_string(),
        property_option: option.map(|value| value.to_string()),
        quality_of_finish: "standard".to_string(),
        multiplier: multiplier.map(|value| value.to_string()),
    }
}

pub(super) fn new_record_request(items: Vec<LineItemDraft>) -> NewConstructionRequest {
    NewConstructionRequest {
        kind: CalculatorKind::ResidentialSsUpTo100m2,
        basis: AssessmentBasis::Grc,
        floor_area: 100.0,
        veranda_floor_area: 0.0,
        dev_year: "1984".to_string(),
        items,
    }
}

pub(super) fn calculation_request(items: Vec<LineItemDraft>) -> CalculationRequest {
    CalculationRequest {
        floor_area: 100.0,
        veranda_floor_area: 0.0,
        dev_year: "1984".to_string(),
        items,
    }
}

pub(super) type TestService =
    CalculationService<InMemoryConstructionRepository, InMemoryRateScheduleRepository>;

pub(super) fn service_with_rows(rows: Vec<YearRangeValue>) -> Arc<TestService> {
    Arc::new(CalculationService::new(
        Arc::new(InMemoryConstructionRepository::default()),
        Arc::new(InMemoryRateScheduleRepository::with_rows(rows)),
        CalculatorConfig::default(),
    ))
}
