use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::breakdown::{FeeBreakdown, SuccessFeeBreakdown, TrancheLineItem};
use crate::config::{FeeConfiguration, SuccessFee, SuccessFeeBase, Tranche};
use crate::constants::{MAX_PIPELINE_WEIGHT, ONE_HUNDRED};

/// Computes the fees due under `config`.
///
/// Same input, same output: the function holds no state and never fails.
/// Without a positive operation value there is nothing to compute and the
/// breakdown is empty. Otherwise the enabled retainer and flat fee are added
/// as-is and the success fee is computed against the pipeline-weighted value.
pub fn compute_fees(config: &FeeConfiguration) -> FeeBreakdown {
    if config.operation_value <= Decimal::ZERO {
        return FeeBreakdown::empty();
    }
    if config.pipeline_weight > MAX_PIPELINE_WEIGHT {
        warn!(
            pipeline_weight = config.pipeline_weight,
            "pipeline weight above {MAX_PIPELINE_WEIGHT}, clamping"
        );
    }
    let weighted_value = weighted_value(config);

    let retainer = config.retainer.filter(|amount| *amount > Decimal::ZERO);
    let flat_fee = config.flat_fee.filter(|amount| *amount > Decimal::ZERO);
    let success_fee = match &config.success_fee {
        SuccessFee::Simple { percentage, base } => {
            simple_success_fee(weighted_value, *percentage, *base)
        }
        SuccessFee::Progressive { tranches } => {
            Some(progressive_success_fee(weighted_value, tranches))
        }
    };

    let total = [
        retainer,
        flat_fee,
        success_fee.as_ref().map(SuccessFeeBreakdown::total),
    ]
    .into_iter()
    .flatten()
    .fold(Decimal::ZERO, Decimal::saturating_add);

    FeeBreakdown {
        retainer,
        flat_fee,
        success_fee,
        total,
    }
}

/// Operation value discounted by the pipeline weighting. This, not the
/// nominal value, is what success fees are charged on.
pub fn weighted_value(config: &FeeConfiguration) -> Decimal {
    let weight = config.pipeline_weight.min(MAX_PIPELINE_WEIGHT);
    percent_of(config.operation_value, Decimal::from(weight))
}

/// `percent` percent of `amount`. Saturates instead of overflowing.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    match amount.checked_mul(percent) {
        Some(product) => product / ONE_HUNDRED,
        // scale down first so only a result beyond the range saturates
        None => (amount / ONE_HUNDRED).saturating_mul(percent),
    }
}

fn simple_success_fee(
    weighted_value: Decimal,
    percentage: Decimal,
    base: SuccessFeeBase,
) -> Option<SuccessFeeBreakdown> {
    if percentage <= Decimal::ZERO {
        return None;
    }
    Some(SuccessFeeBreakdown::Simple {
        percentage,
        base,
        amount: percent_of(weighted_value, percentage),
    })
}

fn progressive_success_fee(weighted_value: Decimal, tranches: &[Tranche]) -> SuccessFeeBreakdown {
    // the caller's tranches may come in any order; evaluate a sorted view
    let line_items = tranches
        .iter()
        .sorted_by(|a, b| a.cmp_evaluation_order(b))
        .filter_map(|tranche| tranche_line_item(weighted_value, tranche))
        .collect_vec();
    let total = line_items
        .iter()
        .map(|item| item.fee)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    SuccessFeeBreakdown::Progressive { total, line_items }
}

/// Fee charged by a single tranche, or `None` if the tranche contributes
/// nothing at this weighted value.
fn tranche_line_item(weighted_value: Decimal, tranche: &Tranche) -> Option<TrancheLineItem> {
    if tranche.percent < Decimal::ZERO {
        debug!(percent = %tranche.percent, "ignoring tranche with negative rate");
        return None;
    }
    // a band below zero only covers value from zero up
    let lower = tranche.effective_min().max(Decimal::ZERO);
    if tranche.percent.is_zero() || weighted_value <= lower {
        return None;
    }

    // an unbounded band only extends as far as the value itself
    let upper = tranche
        .max
        .map_or(weighted_value, |max| max.min(weighted_value));
    if upper <= lower {
        debug!(
            range = %tranche.range_label(),
            "ignoring tranche with empty range"
        );
        return None;
    }
    let applicable_amount = upper - lower;

    Some(TrancheLineItem {
        range_label: tranche.range_label(),
        percent: tranche.percent,
        applicable_amount,
        fee: percent_of(applicable_amount, tranche.percent),
    })
}
