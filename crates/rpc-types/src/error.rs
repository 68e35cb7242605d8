use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Bad request")]
    BadRequest,
    #[error("Deserializing JSON failed: {0}")]
    InvalidJson(String),
    #[error("Invalid fee configuration")]
    InvalidFeeConfiguration,
}

#[derive(Debug, Serialize, Deserialize, TS, Clone)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RpcError {
    pub error: String,
    pub detail: String,
    pub error_code: Option<ErrorCode>,
}

impl RpcError {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self {
            error: err.to_string(),
            detail: format!("{err:?}"),
            error_code: get_error_code(err),
        }
    }
}

fn get_error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.downcast_ref().cloned()
}
