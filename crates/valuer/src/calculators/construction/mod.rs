//! Construction/insurance cost calculator.
//!
//! Resolves a record's selected line items against the admin-maintained rate
//! schedule, aggregates them into a cost-per-square-metre figure, and persists
//! the reconciled item set plus the computed rate in one atomic unit of work.

pub mod domain;
pub mod engine;
pub mod rates;
pub mod reconcile;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Assessment, AssessmentBasis, CalculatorKind, ConstructionProp, ItemId, LineItem,
    LineItemDraft, PropId, RateSource, StoredLineItem, UnknownCalculatorKind, YearBand,
    YearBandBoundaries, YearRangeValue,
};
pub use engine::{cost_per_square_metre, AreaWeights, CalculatorConfig};
pub use rates::{parse_schedule_csv, RateSchedule, ScheduleImportError};
pub use reconcile::ReconcilePlan;
pub use repository::{
    ConstructionRecord, ConstructionRecordView, ConstructionRepository, PropUpdate,
    RateScheduleRepository, RepositoryError,
};
pub use resolver::{resolve_items, RateOrigin, ResolvedItem};
pub use router::construction_router;
pub use service::{CalculationOutcome, CalculationService, CalculationServiceError};
pub use validation::{
    validate_calculation, CalculationRequest, FieldError, NewConstructionRequest, ValidationError,
};
