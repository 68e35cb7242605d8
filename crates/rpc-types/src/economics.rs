//! Fee economics as the mandate form submits and displays them.
//!
//! The form (and the deal record behind it) keeps every field nullable and
//! uses toggles plus amounts, so a single record can describe any mode. Before
//! anything is computed the record is validated into a
//! [`FeeConfiguration`], which only carries the fields relevant to the chosen
//! success-fee mode.

use anyhow::{anyhow, Context};
use fee_calculator::constants::{DEFAULT_PIPELINE_WEIGHT, MAX_PIPELINE_WEIGHT, MAX_TRANCHES};
use fee_calculator::{
    compute_fees, FeeBreakdown, FeeConfiguration, SuccessFee, SuccessFeeBase,
    SuccessFeeBreakdown, Tranche, TrancheLineItem,
};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use ts_rs::TS;

use crate::error::ErrorCode;
use crate::RpcDecimal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RpcFeeConfiguration {
    pub operation_value: Option<RpcDecimal>,
    /// Percentage, null counts the full operation value.
    pub pipeline_weight: Option<i32>,
    #[serde(default)]
    pub retainer_enabled: bool,
    pub retainer_amount: Option<RpcDecimal>,
    #[serde(default)]
    pub flat_fee_enabled: bool,
    pub flat_fee_amount: Option<RpcDecimal>,
    #[serde(default)]
    pub success_fee_mode: RpcSuccessFeeMode,
    /// Only read in simple mode.
    pub success_fee_percentage: Option<RpcDecimal>,
    pub success_fee_base: Option<RpcSuccessFeeBase>,
    /// Only read in progressive mode.
    #[serde(default)]
    pub tranches: Vec<RpcTranche>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum RpcSuccessFeeMode {
    #[default]
    Simple,
    Progressive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RpcSuccessFeeBase {
    #[default]
    #[serde(rename = "VE")]
    EnterpriseValue,
    #[serde(rename = "VT")]
    TransactionValue,
}

impl From<RpcSuccessFeeBase> for SuccessFeeBase {
    fn from(value: RpcSuccessFeeBase) -> Self {
        match value {
            RpcSuccessFeeBase::EnterpriseValue => Self::EnterpriseValue,
            RpcSuccessFeeBase::TransactionValue => Self::TransactionValue,
        }
    }
}

impl From<SuccessFeeBase> for RpcSuccessFeeBase {
    fn from(value: SuccessFeeBase) -> Self {
        match value {
            SuccessFeeBase::EnterpriseValue => Self::EnterpriseValue,
            SuccessFeeBase::TransactionValue => Self::TransactionValue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RpcTranche {
    pub min: Option<RpcDecimal>,
    pub max: Option<RpcDecimal>,
    pub percent: Option<RpcDecimal>,
}

impl From<&Tranche> for RpcTranche {
    fn from(value: &Tranche) -> Self {
        Self {
            min: value.min.map(RpcDecimal),
            max: value.max.map(RpcDecimal),
            percent: Some(RpcDecimal(value.percent)),
        }
    }
}

/// Reasons a submitted fee configuration is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeConfigurationError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentageOutOfRange { field: &'static str, value: Decimal },
    #[error("Pipeline weight must be between 0 and 100, got {0}")]
    PipelineWeightOutOfRange(i32),
    #[error("At most {max} tranches are allowed, got {count}")]
    TooManyTranches { count: usize, max: usize },
    #[error("Tranche {position}: {source}")]
    InvalidTranche {
        position: usize,
        source: Box<FeeConfigurationError>,
    },
    #[error("Tranche {position} must end above where it starts ({min} – {max})")]
    EmptyTrancheRange {
        position: usize,
        min: Decimal,
        max: Decimal,
    },
    #[error("Tranche {0} is unbounded but another tranche starts above it")]
    UnboundedTrancheNotLast(String),
    #[error("Tranches {lower} and {upper} overlap")]
    OverlappingTranches { lower: String, upper: String },
}

impl TryFrom<RpcFeeConfiguration> for FeeConfiguration {
    type Error = FeeConfigurationError;

    fn try_from(raw: RpcFeeConfiguration) -> Result<Self, Self::Error> {
        let operation_value =
            non_negative("Operation value", raw.operation_value)?.unwrap_or_default();
        let pipeline_weight = match raw.pipeline_weight {
            None => DEFAULT_PIPELINE_WEIGHT,
            Some(weight) => u8::try_from(weight)
                .ok()
                .filter(|weight| *weight <= MAX_PIPELINE_WEIGHT)
                .ok_or(FeeConfigurationError::PipelineWeightOutOfRange(weight))?,
        };
        let retainer =
            fixed_component("Retainer amount", raw.retainer_enabled, raw.retainer_amount)?;
        let flat_fee =
            fixed_component("Flat fee amount", raw.flat_fee_enabled, raw.flat_fee_amount)?;
        let success_fee = match raw.success_fee_mode {
            RpcSuccessFeeMode::Simple => SuccessFee::Simple {
                percentage: percentage("Success fee percentage", raw.success_fee_percentage)?
                    .unwrap_or_default(),
                base: raw.success_fee_base.unwrap_or_default().into(),
            },
            RpcSuccessFeeMode::Progressive => SuccessFee::Progressive {
                tranches: validate_tranches(&raw.tranches)?,
            },
        };

        Ok(FeeConfiguration {
            operation_value,
            pipeline_weight,
            retainer,
            flat_fee,
            success_fee,
        })
    }
}

impl From<&FeeConfiguration> for RpcFeeConfiguration {
    fn from(config: &FeeConfiguration) -> Self {
        let (success_fee_mode, success_fee_percentage, success_fee_base, tranches) =
            match &config.success_fee {
                SuccessFee::Simple { percentage, base } => (
                    RpcSuccessFeeMode::Simple,
                    Some(RpcDecimal(*percentage)),
                    Some((*base).into()),
                    vec![],
                ),
                SuccessFee::Progressive { tranches } => (
                    RpcSuccessFeeMode::Progressive,
                    None,
                    None,
                    tranches.iter().map(RpcTranche::from).collect(),
                ),
            };
        Self {
            operation_value: Some(RpcDecimal(config.operation_value)),
            pipeline_weight: Some(i32::from(config.pipeline_weight)),
            retainer_enabled: config.retainer.is_some(),
            retainer_amount: config.retainer.map(RpcDecimal),
            flat_fee_enabled: config.flat_fee.is_some(),
            flat_fee_amount: config.flat_fee.map(RpcDecimal),
            success_fee_mode,
            success_fee_percentage,
            success_fee_base,
            tranches,
        }
    }
}

fn non_negative(
    field: &'static str,
    value: Option<RpcDecimal>,
) -> Result<Option<Decimal>, FeeConfigurationError> {
    match value {
        Some(RpcDecimal(value)) if value < Decimal::ZERO => {
            Err(FeeConfigurationError::NegativeAmount { field, value })
        }
        value => Ok(value.map(|value| value.0)),
    }
}

fn percentage(
    field: &'static str,
    value: Option<RpcDecimal>,
) -> Result<Option<Decimal>, FeeConfigurationError> {
    match value {
        Some(RpcDecimal(value)) if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED => {
            Err(FeeConfigurationError::PercentageOutOfRange { field, value })
        }
        value => Ok(value.map(|value| value.0)),
    }
}

/// An enabled toggle without an amount counts as zero. A disabled toggle
/// ignores whatever amount is still sitting in the form.
fn fixed_component(
    field: &'static str,
    enabled: bool,
    amount: Option<RpcDecimal>,
) -> Result<Option<Decimal>, FeeConfigurationError> {
    if !enabled {
        return Ok(None);
    }
    Ok(Some(non_negative(field, amount)?.unwrap_or_default()))
}

fn validate_tranches(raw: &[RpcTranche]) -> Result<Vec<Tranche>, FeeConfigurationError> {
    if raw.len() > MAX_TRANCHES {
        return Err(FeeConfigurationError::TooManyTranches {
            count: raw.len(),
            max: MAX_TRANCHES,
        });
    }

    let tranches = raw
        .iter()
        .enumerate()
        .map(|(index, tranche)| validate_tranche(index + 1, tranche))
        .collect::<Result<Vec<_>, _>>()?;

    for (lower, upper) in tranches
        .iter()
        .sorted_by(|a, b| a.cmp_evaluation_order(b))
        .tuple_windows()
    {
        match lower.max {
            None => {
                return Err(FeeConfigurationError::UnboundedTrancheNotLast(
                    lower.range_label(),
                ))
            }
            Some(max) if max > upper.effective_min() => {
                return Err(FeeConfigurationError::OverlappingTranches {
                    lower: lower.range_label(),
                    upper: upper.range_label(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(tranches)
}

fn validate_tranche(position: usize, raw: &RpcTranche) -> Result<Tranche, FeeConfigurationError> {
    let invalid = |source| FeeConfigurationError::InvalidTranche {
        position,
        source: Box::new(source),
    };
    let min = non_negative("Lower bound", raw.min).map_err(invalid)?;
    let max = non_negative("Upper bound", raw.max).map_err(invalid)?;
    let percent = percentage("Rate", raw.percent)
        .map_err(invalid)?
        .unwrap_or_default();

    if let Some(max) = max {
        let min = min.unwrap_or_default();
        if max <= min {
            return Err(FeeConfigurationError::EmptyTrancheRange { position, min, max });
        }
    }

    Ok(Tranche::new(min, max, percent))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RpcFeeBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub retainer: Option<RpcDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub flat_fee: Option<RpcDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub success_fee: Option<RpcSuccessFeeBreakdown>,
    pub total: RpcDecimal,
    /// Total as a percentage of the nominal operation value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub effective_rate: Option<RpcDecimal>,
}

impl RpcFeeBreakdown {
    pub fn new(breakdown: &FeeBreakdown, operation_value: Decimal) -> Self {
        Self {
            retainer: breakdown.retainer.map(RpcDecimal),
            flat_fee: breakdown.flat_fee.map(RpcDecimal),
            success_fee: breakdown.success_fee.as_ref().map(Into::into),
            total: RpcDecimal(breakdown.total),
            effective_rate: breakdown.effective_rate(operation_value).map(RpcDecimal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "camelCase")]
#[ts(export)]
pub enum RpcSuccessFeeBreakdown {
    Simple {
        percentage: RpcDecimal,
        base: RpcSuccessFeeBase,
        amount: RpcDecimal,
    },
    #[serde(rename_all = "camelCase")]
    Progressive {
        total: RpcDecimal,
        line_items: Vec<RpcTrancheLineItem>,
    },
}

impl From<&SuccessFeeBreakdown> for RpcSuccessFeeBreakdown {
    fn from(value: &SuccessFeeBreakdown) -> Self {
        match value {
            SuccessFeeBreakdown::Simple {
                percentage,
                base,
                amount,
            } => Self::Simple {
                percentage: RpcDecimal(*percentage),
                base: (*base).into(),
                amount: RpcDecimal(*amount),
            },
            SuccessFeeBreakdown::Progressive { total, line_items } => Self::Progressive {
                total: RpcDecimal(*total),
                line_items: line_items.iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RpcTrancheLineItem {
    pub range_label: String,
    pub percent: RpcDecimal,
    pub applicable_amount: RpcDecimal,
    pub fee: RpcDecimal,
}

impl From<&TrancheLineItem> for RpcTrancheLineItem {
    fn from(value: &TrancheLineItem) -> Self {
        Self {
            range_label: value.range_label.clone(),
            percent: RpcDecimal(value.percent),
            applicable_amount: RpcDecimal(value.applicable_amount),
            fee: RpcDecimal(value.fee),
        }
    }
}

/// Parses a fee configuration as stored on the deal record or posted by the
/// form.
pub fn parse_fee_configuration(json: &str) -> anyhow::Result<RpcFeeConfiguration> {
    serde_json::from_str(json).map_err(|err| anyhow!(ErrorCode::InvalidJson(err.to_string())))
}

/// Validates a submitted configuration and computes its fee estimate.
#[instrument(skip_all, fields(mode = ?config.success_fee_mode), err)]
pub fn compute_fees_rpc(config: RpcFeeConfiguration) -> anyhow::Result<RpcFeeBreakdown> {
    let config =
        FeeConfiguration::try_from(config).context(ErrorCode::InvalidFeeConfiguration)?;
    let breakdown = compute_fees(&config);
    debug!(total = %breakdown.total, "computed fee estimate");
    Ok(RpcFeeBreakdown::new(&breakdown, config.operation_value))
}
