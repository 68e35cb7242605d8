use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SuccessFeeBase;
use crate::constants::ONE_HUNDRED;

/// Estimated fees for a mandate. Components that do not apply are omitted
/// rather than reported as zero.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retainer: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_fee: Option<SuccessFeeBreakdown>,
    /// Sum of every component present above.
    pub total: Decimal,
}

impl FeeBreakdown {
    /// Nothing to show yet: no deal value, no fees.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.retainer.is_none() && self.flat_fee.is_none() && self.success_fee.is_none()
    }

    /// Total fees as a percentage of the nominal operation value, or `None`
    /// when there is no value to relate them to.
    pub fn effective_rate(&self, operation_value: Decimal) -> Option<Decimal> {
        if operation_value <= Decimal::ZERO {
            return None;
        }
        self.total
            .saturating_mul(ONE_HUNDRED)
            .checked_div(operation_value)
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SuccessFeeBreakdown {
    Simple {
        percentage: Decimal,
        base: SuccessFeeBase,
        amount: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Progressive {
        total: Decimal,
        line_items: Vec<TrancheLineItem>,
    },
}

impl SuccessFeeBreakdown {
    pub fn total(&self) -> Decimal {
        match self {
            SuccessFeeBreakdown::Simple { amount, .. } => *amount,
            SuccessFeeBreakdown::Progressive { total, .. } => *total,
        }
    }
}

/// Contribution of a single progressive tranche.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrancheLineItem {
    pub range_label: String,
    pub percent: Decimal,
    /// Slice of the weighted value that falls inside this tranche.
    pub applicable_amount: Decimal,
    pub fee: Decimal,
}
