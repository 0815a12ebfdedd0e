use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for construction records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropId(pub String);

/// Identifier wrapper for persisted construction line items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

/// Building-type/size category selecting which rate-schedule partition applies.
///
/// The labels match the identifiers the admin tooling and seed data use, so the
/// enum serializes to exactly those strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculatorKind {
    #[serde(rename = "Residential_SS_up_to_100m2")]
    ResidentialSsUpTo100m2,
    #[serde(rename = "Residential_SS_101_to_200m2")]
    ResidentialSs101To200m2,
    #[serde(rename = "Residential_SS_201_to_300m2")]
    ResidentialSs201To300m2,
    #[serde(rename = "Residential_SS_301_to_400m2")]
    ResidentialSs301To400m2,
    #[serde(rename = "Residential_SS_above_400m2")]
    ResidentialSsAbove400m2,
    #[serde(rename = "Residential_DS_up_to_100m2")]
    ResidentialDsUpTo100m2,
    #[serde(rename = "Residential_DS_101_to_200m2")]
    ResidentialDs101To200m2,
    #[serde(rename = "Residential_DS_201_to_300m2")]
    ResidentialDs201To300m2,
    #[serde(rename = "Residential_DS_301_to_400m2")]
    ResidentialDs301To400m2,
    #[serde(rename = "Residential_DS_above_400m2")]
    ResidentialDsAbove400m2,
    #[serde(rename = "Apartments_low_rise")]
    ApartmentsLowRise,
    #[serde(rename = "Apartments_mid_rise")]
    ApartmentsMidRise,
    #[serde(rename = "Apartments_high_rise")]
    ApartmentsHighRise,
    #[serde(rename = "Office_low_rise")]
    OfficeLowRise,
    #[serde(rename = "Office_high_rise")]
    OfficeHighRise,
    #[serde(rename = "Retail_shop")]
    RetailShop,
    #[serde(rename = "Shopping_mall")]
    ShoppingMall,
    #[serde(rename = "Warehouse_light_industrial")]
    WarehouseLightIndustrial,
    #[serde(rename = "Warehouse_heavy_industrial")]
    WarehouseHeavyIndustrial,
    #[serde(rename = "School")]
    School,
    #[serde(rename = "Hospital")]
    Hospital,
    #[serde(rename = "Hotel")]
    Hotel,
    #[serde(rename = "Restaurant")]
    Restaurant,
    #[serde(rename = "Petrol_station")]
    PetrolStation,
    #[serde(rename = "Church")]
    Church,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 25] = [
        CalculatorKind::ResidentialSsUpTo100m2,
        CalculatorKind::ResidentialSs101To200m2,
        CalculatorKind::ResidentialSs201To300m2,
        CalculatorKind::ResidentialSs301To400m2,
        CalculatorKind::ResidentialSsAbove400m2,
        CalculatorKind::ResidentialDsUpTo100m2,
        CalculatorKind::ResidentialDs101To200m2,
        CalculatorKind::ResidentialDs201To300m2,
        CalculatorKind::ResidentialDs301To400m2,
        CalculatorKind::ResidentialDsAbove400m2,
        CalculatorKind::ApartmentsLowRise,
        CalculatorKind::ApartmentsMidRise,
        CalculatorKind::ApartmentsHighRise,
        CalculatorKind::OfficeLowRise,
        CalculatorKind::OfficeHighRise,
        CalculatorKind::RetailShop,
        CalculatorKind::ShoppingMall,
        CalculatorKind::WarehouseLightIndustrial,
        CalculatorKind::WarehouseHeavyIndustrial,
        CalculatorKind::School,
        CalculatorKind::Hospital,
        CalculatorKind::Hotel,
        CalculatorKind::Restaurant,
        CalculatorKind::PetrolStation,
        CalculatorKind::Church,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CalculatorKind::ResidentialSsUpTo100m2 => "Residential_SS_up_to_100m2",
            CalculatorKind::ResidentialSs101To200m2 => "Residential_SS_101_to_200m2",
            CalculatorKind::ResidentialSs201To300m2 => "Residential_SS_201_to_300m2",
            CalculatorKind::ResidentialSs301To400m2 => "Residential_SS_301_to_400m2",
            CalculatorKind::ResidentialSsAbove400m2 => "Residential_SS_above_400m2",
            CalculatorKind::ResidentialDsUpTo100m2 => "Residential_DS_up_to_100m2",
            CalculatorKind::ResidentialDs101To200m2 => "Residential_DS_101_to_200m2",
            CalculatorKind::ResidentialDs201To300m2 => "Residential_DS_201_to_300m2",
            CalculatorKind::ResidentialDs301To400m2 => "Residential_DS_301_to_400m2",
            CalculatorKind::ResidentialDsAbove400m2 => "Residential_DS_above_400m2",
            CalculatorKind::ApartmentsLowRise => "Apartments_low_rise",
            CalculatorKind::ApartmentsMidRise => "Apartments_mid_rise",
            CalculatorKind::ApartmentsHighRise => "Apartments_high_rise",
            CalculatorKind::OfficeLowRise => "Office_low_rise",
            CalculatorKind::OfficeHighRise => "Office_high_rise",
            CalculatorKind::RetailShop => "Retail_shop",
            CalculatorKind::ShoppingMall => "Shopping_mall",
            CalculatorKind::WarehouseLightIndustrial => "Warehouse_light_industrial",
            CalculatorKind::WarehouseHeavyIndustrial => "Warehouse_heavy_industrial",
            CalculatorKind::School => "School",
            CalculatorKind::Hospital => "Hospital",
            CalculatorKind::Hotel => "Hotel",
            CalculatorKind::Restaurant => "Restaurant",
            CalculatorKind::PetrolStation => "Petrol_station",
            CalculatorKind::Church => "Church",
        }
    }
}

/// Error returned when a kind label does not match the fixed enumeration.
#[derive(Debug, thiserror::Error)]
#[error("unknown calculator kind '{0}'")]
pub struct UnknownCalculatorKind(pub String);

impl FromStr for CalculatorKind {
    type Err = UnknownCalculatorKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CalculatorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == value)
            .ok_or_else(|| UnknownCalculatorKind(value.to_string()))
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three development-year periods a rate row prices separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBand {
    First,
    Second,
    Third,
}

/// Explicit partition of development years into the three rate bands.
///
/// Years strictly before `second_from` fall into the first band, years before
/// `third_from` into the second, everything later into the third. The defaults
/// mirror the platform's deployed configuration; deployments override them
/// through the composition root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBandBoundaries {
    pub second_from: i32,
    pub third_from: i32,
}

pub const DEFAULT_SECOND_BAND_FROM: i32 = 1990;
pub const DEFAULT_THIRD_BAND_FROM: i32 = 2010;

impl Default for YearBandBoundaries {
    fn default() -> Self {
        Self {
            second_from: DEFAULT_SECOND_BAND_FROM,
            third_from: DEFAULT_THIRD_BAND_FROM,
        }
    }
}

impl YearBandBoundaries {
    pub fn band_for(&self, dev_year: i32) -> YearBand {
        if dev_year < self.second_from {
            YearBand::First
        } else if dev_year < self.third_from {
            YearBand::Second
        } else {
            YearBand::Third
        }
    }
}

/// Rate contribution of one construction/property option across the three
/// development-year bands. Unique per `(identifier, kind)`; a row with no kind
/// applies to every kind but is shadowed by a kind-specific row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRangeValue {
    pub identifier: String,
    pub first: f64,
    pub second: f64,
    pub third: f64,
    #[serde(default)]
    pub kind: Option<CalculatorKind>,
}

impl YearRangeValue {
    pub fn value_for(&self, band: YearBand) -> f64 {
        match band {
            YearBand::First => self.first,
            YearBand::Second => self.second,
            YearBand::Third => self.third,
        }
    }
}

/// Where a line item's rate comes from once the form sentinels are normalized.
///
/// An explicit multiplier submitted by the valuer always wins over the
/// schedule; an item with no selected option contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RateSource {
    Override { rate: f64 },
    Lookup { identifier: String },
    Unselected,
}

/// Line item as submitted by the edit form, before normalization. The
/// `multiplier` field carries the raw string so the empty-string sentinel can
/// be handled in exactly one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDraft {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub element: String,
    #[serde(default)]
    pub property_option: Option<String>,
    #[serde(default)]
    pub quality_of_finish: String,
    #[serde(default)]
    pub multiplier: Option<String>,
}

/// Normalized line item: sentinels resolved into an explicit [`RateSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Option<ItemId>,
    pub element: String,
    pub quality_of_finish: String,
    pub source: RateSource,
}

/// Persisted line item belonging to a construction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLineItem {
    pub id: ItemId,
    pub element: String,
    pub quality_of_finish: String,
    pub source: RateSource,
}

/// Whether the owning record prices a gross replacement cost or an insurance
/// schedule. Both share the calculator; only the owning record differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentBasis {
    Grc,
    Insurance,
}

impl AssessmentBasis {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentBasis::Grc => "grc",
            AssessmentBasis::Insurance => "insurance",
        }
    }
}

/// The GRC/insurance record owning the computed rate, 1:1 with its prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub basis: AssessmentBasis,
    pub rate: Option<f64>,
    pub computed_at: Option<DateTime<Utc>>,
}

impl Assessment {
    pub fn pending(basis: AssessmentBasis) -> Self {
        Self {
            basis,
            rate: None,
            computed_at: None,
        }
    }
}

/// Construction record metadata: the calculator kind is fixed at creation,
/// the areas and development year track the latest submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionProp {
    pub id: PropId,
    pub kind: CalculatorKind,
    pub floor_area: f64,
    pub veranda_floor_area: f64,
    pub dev_year: String,
}
