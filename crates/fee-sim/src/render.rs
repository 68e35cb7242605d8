use std::io::Write;

use fee_calculator::constants::MAX_PIPELINE_WEIGHT;
use fee_calculator::{
    weighted_value, Decimal, FeeBreakdown, FeeConfiguration, SuccessFeeBreakdown,
};
use rpc_types::{RpcDecimal, RpcFeeBreakdown};
use serde::Serialize;

const LABEL_WIDTH: usize = 44;
const AMOUNT_WIDTH: usize = 20;

/// Formats amounts for the terminal. Currency and grouping are left to the
/// reader.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub decimal_places: u32,
}

impl TextStyle {
    fn amount(&self, value: Decimal) -> String {
        let places = self.decimal_places as usize;
        format!("{:.places$}", value.round_dp(self.decimal_places))
    }

    fn percent(&self, value: Decimal) -> String {
        format!("{}%", value.normalize())
    }
}

fn line(out: &mut impl Write, label: &str, value: &str) -> std::io::Result<()> {
    writeln!(out, "{label:<LABEL_WIDTH$}{value:>AMOUNT_WIDTH$}")
}

pub fn write_breakdown_text(
    out: &mut impl Write,
    style: TextStyle,
    config: &FeeConfiguration,
    breakdown: &FeeBreakdown,
) -> std::io::Result<()> {
    line(out, "Operation value", &style.amount(config.operation_value))?;
    if breakdown.is_empty() {
        line(out, "Total", &style.amount(breakdown.total))?;
        return Ok(());
    }
    line(
        out,
        &format!("Weighted value ({}%)", config.pipeline_weight.min(MAX_PIPELINE_WEIGHT)),
        &style.amount(weighted_value(config)),
    )?;
    if let Some(retainer) = breakdown.retainer {
        line(out, "Retainer", &style.amount(retainer))?;
    }
    if let Some(flat_fee) = breakdown.flat_fee {
        line(out, "Flat fee", &style.amount(flat_fee))?;
    }
    match &breakdown.success_fee {
        Some(SuccessFeeBreakdown::Simple {
            percentage,
            base,
            amount,
        }) => {
            line(
                out,
                &format!("Success fee ({} of {base})", style.percent(*percentage)),
                &style.amount(*amount),
            )?;
        }
        Some(SuccessFeeBreakdown::Progressive { total, line_items }) => {
            line(out, "Success fee (progressive)", &style.amount(*total))?;
            for item in line_items {
                line(
                    out,
                    &format!(
                        "  {} @ {} on {}",
                        item.range_label,
                        style.percent(item.percent),
                        style.amount(item.applicable_amount)
                    ),
                    &style.amount(item.fee),
                )?;
            }
        }
        None => {}
    }
    line(out, "Total", &style.amount(breakdown.total))?;
    if let Some(rate) = breakdown.effective_rate(config.operation_value) {
        line(out, "Effective rate", &format!("{}%", rate.round_dp(2)))?;
    }
    Ok(())
}

pub fn write_breakdown_json(
    out: &mut impl Write,
    config: &FeeConfiguration,
    breakdown: &FeeBreakdown,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(
        &mut *out,
        &RpcFeeBreakdown::new(breakdown, config.operation_value),
    )?;
    writeln!(out)?;
    Ok(())
}

/// Estimate for one alternative operation value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRow {
    pub operation_value: RpcDecimal,
    pub estimate: RpcFeeBreakdown,
}

pub fn write_simulation_text(
    out: &mut impl Write,
    style: TextStyle,
    rows: &[(FeeConfiguration, FeeBreakdown)],
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>20}{:>20}{:>20}{:>20}{:>10}",
        "operation value", "weighted value", "success fee", "total", "rate"
    )?;
    for (config, breakdown) in rows {
        let success_fee = breakdown
            .success_fee
            .as_ref()
            .map(SuccessFeeBreakdown::total)
            .unwrap_or_default();
        let rate = breakdown
            .effective_rate(config.operation_value)
            .map(|rate| format!("{}%", rate.round_dp(2)))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>20}{:>20}{:>20}{:>20}{:>10}",
            style.amount(config.operation_value),
            style.amount(weighted_value(config).max(Decimal::ZERO)),
            style.amount(success_fee),
            style.amount(breakdown.total),
            rate
        )?;
    }
    Ok(())
}

pub fn write_simulation_json(
    out: &mut impl Write,
    rows: &[(FeeConfiguration, FeeBreakdown)],
) -> anyhow::Result<()> {
    let rows = rows
        .iter()
        .map(|(config, breakdown)| SimulationRow {
            operation_value: RpcDecimal(config.operation_value),
            estimate: RpcFeeBreakdown::new(breakdown, config.operation_value),
        })
        .collect::<Vec<_>>();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}
