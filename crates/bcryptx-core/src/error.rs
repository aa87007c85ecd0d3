//! Error types

use std::time::Duration;

use thiserror::Error;

use crate::Tier;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Hashing primitive failed: {0}")]
    Primitive(String),

    #[error("Malformed hash: {0}")]
    MalformedHash(String),

    #[error("Hash and password do not match")]
    Mismatch,

    #[error("Hash cost {cost} is lower than the configured {tier} cost {threshold}")]
    CostBelowThreshold { tier: Tier, cost: u32, threshold: u32 },

    #[error(
        "Cannot tune {tier} cost: no cost in {min_cost}..={max_cost} yields a hash slower than {budget:?}"
    )]
    TuningInfeasible {
        tier: Tier,
        budget: Duration,
        min_cost: u32,
        max_cost: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code for structured output
    pub fn code(&self) -> &'static str {
        match self {
            Error::Primitive(_) => "PRIMITIVE_FAILURE",
            Error::MalformedHash(_) => "MALFORMED_HASH",
            Error::Mismatch => "MISMATCH",
            Error::CostBelowThreshold { .. } => "COST_BELOW_THRESHOLD",
            Error::TuningInfeasible { .. } => "TUNING_INFEASIBLE",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is an expected inspection outcome rather than a malfunction
    pub fn is_low_cost(&self) -> bool {
        matches!(self, Error::CostBelowThreshold { .. })
    }

    /// Copy of this error for handing to more than one caller
    ///
    /// I/O errors keep their kind and message; JSON errors cannot be rebuilt
    /// and become [`Error::Internal`].
    pub(crate) fn replay(&self) -> Error {
        match self {
            Error::Primitive(msg) => Error::Primitive(msg.clone()),
            Error::MalformedHash(hash) => Error::MalformedHash(hash.clone()),
            Error::Mismatch => Error::Mismatch,
            Error::CostBelowThreshold {
                tier,
                cost,
                threshold,
            } => Error::CostBelowThreshold {
                tier: *tier,
                cost: *cost,
                threshold: *threshold,
            },
            Error::TuningInfeasible {
                tier,
                budget,
                min_cost,
                max_cost,
            } => Error::TuningInfeasible {
                tier: *tier,
                budget: *budget,
                min_cost: *min_cost,
                max_cost: *max_cost,
            },
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
            Error::Json(e) => Error::Internal(format!("JSON error: {e}")),
            Error::Internal(msg) => Error::Internal(msg.clone()),
        }
    }
}
