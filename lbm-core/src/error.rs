//! Error types for lbm-core.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LbmError {
    #[error("nx must be >= 2 (got {0})")]
    GridTooSmall(usize),

    #[error("relaxation time tau = {0} must be > 0.5 for a stable scheme")]
    UnstableRelaxation(f64),

    #[error("{name} is fixed at 1.0 in lattice units (got {value})")]
    NonUnitLattice { name: &'static str, value: f64 },

    #[error("{name} must be positive and finite (got {value})")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{name} must be finite (got {value})")]
    NonFiniteBoundary { name: &'static str, value: f64 },

    #[error("temperature field has {actual} points, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, LbmError>;
