//! Consumer loan origination platform.
//!
//! Two domains cooperate over typed HTTP contracts: [`origination`] drives a
//! loan application from intake through scoring to activation or cancellation,
//! and [`agreements`] owns the agreement ledger together with the annuity
//! amortization schedule it computes on activation. [`contracts`] holds the
//! wire-level types both sides (and the external collaborators) exchange.

pub mod agreements;
pub mod config;
pub mod contracts;
pub mod error;
pub mod origination;
pub mod telemetry;
