//! API response types.

use serde::Serialize;

use crate::error::DispatchError;
use crate::solver::StrategyKind;

/// One entry of `GET /strategies`.
#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    /// Whether results depend on the seed.
    pub stochastic: bool,
}

impl From<StrategyKind> for StrategyInfo {
    fn from(kind: StrategyKind) -> Self {
        Self {
            name: kind.as_str(),
            stochastic: kind.is_stochastic(),
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable kind, e.g. `"invalid_input"`.
    pub kind: &'static str,
}

impl From<&DispatchError> for ErrorResponse {
    fn from(e: &DispatchError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind(),
        }
    }
}
