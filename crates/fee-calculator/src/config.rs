use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PIPELINE_WEIGHT;

/// Economic terms of a single mandate, as stored on the deal record.
///
/// Enabled fixed components are represented as `Some(amount)`; a toggle that
/// is switched off is `None`.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfiguration {
    /// Nominal transaction value.
    pub operation_value: Decimal,
    /// Deal-closing probability in percent, applied to `operation_value`
    /// before any success fee is computed.
    pub pipeline_weight: u8,
    /// Fee owed regardless of outcome.
    pub retainer: Option<Decimal>,
    /// Fixed fee distinct from the retainer, also outcome-independent.
    pub flat_fee: Option<Decimal>,
    pub success_fee: SuccessFee,
}

impl Default for FeeConfiguration {
    fn default() -> Self {
        Self {
            operation_value: Decimal::ZERO,
            pipeline_weight: DEFAULT_PIPELINE_WEIGHT,
            retainer: None,
            flat_fee: None,
            success_fee: SuccessFee::default(),
        }
    }
}

/// How the contingent part of the fee is derived from the weighted value.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SuccessFee {
    /// A single percentage of the weighted value.
    Simple {
        percentage: Decimal,
        base: SuccessFeeBase,
    },
    /// Marginal bands ("accelerator"): each tranche only charges the slice of
    /// the weighted value that falls inside its own range.
    Progressive { tranches: Vec<Tranche> },
}

impl Default for SuccessFee {
    fn default() -> Self {
        SuccessFee::Simple {
            percentage: Decimal::ZERO,
            base: SuccessFeeBase::default(),
        }
    }
}

/// The value a simple success fee is quoted against.
///
/// Only used for labelling: both bases apply the percentage to the same
/// weighted operation value.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SuccessFeeBase {
    #[default]
    #[serde(rename = "VE")]
    EnterpriseValue,
    #[serde(rename = "VT")]
    TransactionValue,
}

impl fmt::Display for SuccessFeeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuccessFeeBase::EnterpriseValue => write!(f, "enterprise value"),
            SuccessFeeBase::TransactionValue => write!(f, "transaction value"),
        }
    }
}

/// One band `[min, max)` of a progressive success fee.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    /// `None` means the band has no lower bound and starts at zero.
    pub min: Option<Decimal>,
    /// `None` means the band is unbounded above.
    pub max: Option<Decimal>,
    pub percent: Decimal,
}

impl Tranche {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>, percent: Decimal) -> Self {
        Self { min, max, percent }
    }

    pub fn effective_min(&self) -> Decimal {
        self.min.unwrap_or(Decimal::ZERO)
    }

    /// Human readable range, e.g. `10000000 – 25000000` or `above 25000000`.
    /// Locale and currency formatting is left to whoever renders it.
    pub fn range_label(&self) -> String {
        let min = self.effective_min().normalize();
        match self.max {
            Some(max) => format!("{min} – {}", max.normalize()),
            None => format!("above {min}"),
        }
    }

    /// Order in which tranches are evaluated: ascending lower bound, then
    /// bounded before unbounded (smaller upper bound first), then rate. The
    /// ordering is total so any permutation of the same tranches evaluates
    /// identically.
    pub fn cmp_evaluation_order(&self, other: &Self) -> Ordering {
        self.effective_min()
            .cmp(&other.effective_min())
            .then_with(|| match (self.max, other.max) {
                (Some(ours), Some(theirs)) => ours.cmp(&theirs),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.percent.cmp(&other.percent))
    }
}
