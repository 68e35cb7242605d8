//! Advisory fee economics for M&A mandates.
//!
//! A mandate's [`FeeConfiguration`] (retainer, flat fee, success fee and the
//! deal value it applies to) is turned into a [`FeeBreakdown`] by
//! [`compute_fees`]. The calculator is a pure function: it owns no state,
//! performs no I/O and never fails. Validating what users type into the
//! economics form happens before a configuration reaches this crate.

pub mod breakdown;
pub mod calculator;
pub mod config;
pub mod constants;

pub use breakdown::{FeeBreakdown, SuccessFeeBreakdown, TrancheLineItem};
pub use calculator::{compute_fees, percent_of, weighted_value};
pub use config::{FeeConfiguration, SuccessFee, SuccessFeeBase, Tranche};
pub use rust_decimal::Decimal;
