use thiserror::Error;

/// Error type for the simulation core
#[derive(Error, Debug)]
pub enum GymError {
    /// Fatal setup problem: bad shapes, missing columns, empty symbol list,
    /// unusable balance or series. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller drove the state machine out of order (e.g. `step` after done).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A symbol has no feature row at the requested step.
    ///
    /// The environment absorbs this by zero-filling the observation slot.
    #[error("Data gap: {symbol} has no row at step {step}")]
    DataGap { symbol: String, step: usize },

    #[error("Invalid action index: {0} (expected 0=Hold, 1=Buy, 2=Sell)")]
    InvalidAction(u8),

    #[error("Indicator error: {0}")]
    Indicator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GymError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Whether the error is a policy-driven degradation rather than a failure
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataGap { .. })
    }
}

impl From<ta::errors::TaError> for GymError {
    fn from(e: ta::errors::TaError) -> Self {
        Self::Indicator(format!("{:?}", e))
    }
}
