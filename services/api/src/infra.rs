use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use valuer::calculators::construction::{
    CalculatorConfig, CalculatorKind, ConstructionRecord, ConstructionRepository, PropId,
    PropUpdate, RateScheduleRepository, ReconcilePlan, RepositoryError, YearRangeValue,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryConstructionRepository {
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

        // Stage the whole replacement, then swap: the unit of work lands
        // together or not at all.
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
pub(crate) struct InMemoryRateScheduleRepository {
    rows: Arc<Mutex<Vec<YearRangeValue>>>,
}

impl InMemoryRateScheduleRepository {
    pub(crate) fn with_rows(rows: Vec<YearRangeValue>) -> Self {
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

pub(crate) fn default_calculator_config() -> CalculatorConfig {
    CalculatorConfig::default()
}
