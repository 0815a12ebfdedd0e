use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Assessment, CalculatorKind, ConstructionProp, PropId, StoredLineItem, YearRangeValue,
};
use super::reconcile::ReconcilePlan;

/// Repository record: the prop metadata, its owning assessment, and the
/// persisted line-item set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionRecord {
    pub prop: ConstructionProp,
    pub assessment: Assessment,
    pub items: Vec<StoredLineItem>,
}

impl ConstructionRecord {
    pub fn view(&self) -> ConstructionRecordView {
        ConstructionRecordView {
            id: self.prop.id.clone(),
            kind: self.prop.kind.label(),
            basis: self.assessment.basis.label(),
            floor_area: self.prop.floor_area,
            veranda_floor_area: self.prop.veranda_floor_area,
            dev_year: self.prop.dev_year.clone(),
            rate: self.assessment.rate,
            computed_at: self.assessment.computed_at,
            items: self.items.clone(),
        }
    }
}

/// Sanitized representation of a record for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ConstructionRecordView {
    pub id: PropId,
    pub kind: &'static str,
    pub basis: &'static str,
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<DateTime<Utc>>,
    pub items: Vec<StoredLineItem>,
}

/// Prop metadata carried by a calculation submission. The kind is immutable
/// after creation and so never part of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropUpdate {
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: String,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for construction records so the service module can be
/// exercised in isolation.
///
/// `apply_calculation` must be atomic: the metadata update, the reconcile
/// plan, and the rate write land together or not at all, leaving prior state
/// untouched on failure.
pub trait ConstructionRepository: Send + Sync {
    fn insert(&self, record: ConstructionRecord) -> Result<ConstructionRecord, RepositoryError>;
    fn fetch(&self, id: &PropId) -> Result<Option<ConstructionRecord>, RepositoryError>;
    fn apply_calculation(
        &self,
        id: &PropId,
        update: PropUpdate,
        plan: ReconcilePlan,
        rate: f64,
        computed_at: DateTime<Utc>,
    ) -> Result<ConstructionRecord, RepositoryError>;
}

/// Storage abstraction for the admin-maintained rate schedule.
pub trait RateScheduleRepository: Send + Sync {
    /// All rows applicable to a kind — its own partition plus generic rows —
    /// fetched in a single read per calculation.
    fn rows_for(&self, kind: CalculatorKind) -> Result<Vec<YearRangeValue>, RepositoryError>;

    /// Bulk replace of a kind's partition, keyed by identifier: rows for
    /// identifiers no longer present are deleted, the rest upserted, as one
    /// sweep. Returns the resulting partition size.
    fn replace_schedule(
        &self,
        kind: CalculatorKind,
        rows: Vec<YearRangeValue>,
    ) -> Result<usize, RepositoryError>;
}
