use thiserror::Error;

/// Failures raised by the frontier computation stages.
///
/// All variants are deterministic functions of the inputs, so none of them is
/// worth retrying.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrontierError {
    #[error("non-positive price {price} for asset '{asset}' at row {row}")]
    NonPositivePrice { asset: String, row: usize, price: f64 },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid asset count {assets}: {reason}")]
    InvalidAssetCount { assets: usize, reason: String },

    #[error("risk is zero, sharpe ratio is undefined")]
    DegenerateRisk,

    #[error("dimension mismatch: expected {expected} values, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("observation at row {row} is not later than the previous one")]
    UnorderedObservations { row: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FrontierError>;
