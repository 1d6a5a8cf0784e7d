/// Errors raised by predictor construction and match prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    #[error("invalid predictor configuration: {reason}")]
    Configuration { reason: String },

    #[error("team not found in the team list: {name}")]
    UnknownTeam { name: String },

    #[error(
        "num_simulations ({requested}) must be positive and cannot be greater than the number of available samples ({available})"
    )]
    InvalidSimulationCount { requested: usize, available: usize },
}

impl PredictError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

pub type PredictResult<T> = Result<T, PredictError>;
