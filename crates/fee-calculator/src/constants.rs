use rust_decimal::Decimal;

/// Percentages (success fee, tranche rates, pipeline weighting) are expressed
/// out of one hundred.
pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest meaningful pipeline weighting. Anything above is clamped.
pub const MAX_PIPELINE_WEIGHT: u8 = 100;

/// A freshly created mandate counts its full operation value.
pub const DEFAULT_PIPELINE_WEIGHT: u8 = MAX_PIPELINE_WEIGHT;

/// Number of bands the economics form lets a user define. The calculator
/// itself sums however many tranches it is given.
pub const MAX_TRANCHES: usize = 5;
