//! Error types for haematocrit resolution.
//!
//! Modelling inconsistencies are fatal by design: they indicate invalid
//! physical input, not a recoverable condition. They propagate as typed
//! errors to the top-level driver instead of aborting in library code.

use thiserror::Error;

/// Errors raised while updating the discharge haematocrit field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HaematocritError {
    #[error(
        "Oversaturated split: hd_a={hd_a}, hd_b={hd_b} (haematocrit >= 1 after redistribution)"
    )]
    Oversaturated { hd_a: f64, hd_b: f64 },

    #[error("RBC mass balance failed at {count} junction(s) in this pass")]
    RbcImbalance { count: u32 },
}

pub type HaematocritResult<T> = Result<T, HaematocritError>;
