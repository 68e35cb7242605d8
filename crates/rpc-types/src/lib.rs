use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod economics;
pub mod error;

pub use economics::{
    compute_fees_rpc, parse_fee_configuration, FeeConfigurationError, RpcFeeBreakdown,
    RpcFeeConfiguration, RpcSuccessFeeBase, RpcSuccessFeeBreakdown, RpcSuccessFeeMode,
    RpcTranche, RpcTrancheLineItem,
};

/// Monetary amount or percentage as it crosses the RPC boundary. Decimals are
/// sent as strings so no precision is lost in JavaScript numbers; numbers are
/// still accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct RpcDecimal(#[ts(type = "string")] pub Decimal);

impl fmt::Display for RpcDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for RpcDecimal {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}
