use crate::infra::{
    default_calculator_config, InMemoryConstructionRepository, InMemoryRateScheduleRepository,
};
use clap::Args;
use std::sync::Arc;
use valuer::calculators::construction::{
    AssessmentBasis, CalculationRequest, CalculationService, CalculatorKind, LineItemDraft,
    NewConstructionRequest, YearRangeValue,
};
use valuer::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Main floor area in square metres
    #[arg(long, default_value_t = 100.0)]
    floor_area: f64,
    /// Veranda floor area in square metres
    #[arg(long, default_value_t = 0.0)]
    veranda_floor_area: f64,
    /// Development year of the property
    #[arg(long, default_value = "1984")]
    dev_year: String,
    /// Optional explicit multiplier overriding the schedule rate
    #[arg(long)]
    multiplier: Option<String>,
}

fn demo_schedule() -> Vec<YearRangeValue> {
    let kind = Some(CalculatorKind::ResidentialSsUpTo100m2);
    vec![
        YearRangeValue {
            identifier: "Foundations - Yes".to_string(),
            first: 200.0,
            second: 200.0,
            third: 200.0,
            kind,
        },
        YearRangeValue {
            identifier: "Walling - Stone".to_string(),
            first: 110.0,
            second: 130.0,
            third: 155.0,
            kind,
        },
        YearRangeValue {
            identifier: "Roofing - Tiles".to_string(),
            first: 80.0,
            second: 95.0,
            third: 120.0,
            kind: None,
        },
    ]
}

fn demo_items(multiplier: Option<String>) -> Vec<LineItemDraft> {
    vec![
        LineItemDraft {
            id: None,
            element: "Foundation".to_string(),
            property_option: Some("Foundations - Yes".to_string()),
            quality_of_finish: "standard".to_string(),
            multiplier,
        },
        LineItemDraft {
            id: None,
            element: "Walling".to_string(),
            property_option: Some("Walling - Stone".to_string()),
            quality_of_finish: "high".to_string(),
            multiplier: None,
        },
        LineItemDraft {
            id: None,
            element: "Roofing".to_string(),
            property_option: Some("Roofing - Tiles".to_string()),
            quality_of_finish: "standard".to_string(),
            multiplier: None,
        },
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = CalculationService::new(
        Arc::new(InMemoryConstructionRepository::default()),
        Arc::new(InMemoryRateScheduleRepository::with_rows(demo_schedule())),
        default_calculator_config(),
    );

    let record = service
        .create(NewConstructionRequest {
            kind: CalculatorKind::ResidentialSsUpTo100m2,
            basis: AssessmentBasis::Grc,
            floor_area: args.floor_area,
            veranda_floor_area: args.veranda_floor_area,
            dev_year: args.dev_year.clone(),
            items: Vec::new(),
        })?;

    let outcome = service
        .calculate(
            &record.prop.id,
            CalculationRequest {
                floor_area: args.floor_area,
                veranda_floor_area: args.veranda_floor_area,
                dev_year: args.dev_year.clone(),
                items: demo_items(args.multiplier),
            },
        )?;

    println!("Construction cost calculator demo");
    println!("  record:       {}", outcome.prop_id.0);
    println!("  kind:         {}", record.prop.kind.label());
    println!("  dev year:     {} (band {:?})", args.dev_year, outcome.band);
    println!(
        "  areas:        {:.1} m2 floor, {:.1} m2 veranda",
        args.floor_area, args.veranda_floor_area
    );
    println!();
    for item in &outcome.items {
        println!("  {:<12} {:>10.2}  ({:?})", item.element, item.rate, item.origin);
    }
    println!();
    println!("  cost per m2:  {:.2}", outcome.cost_per_sqm_quality);

    Ok(())
}
