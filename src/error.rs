use thiserror::Error;

/// Error taxonomy for the core (see design doc §7: kinds, not types).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown mode, unknown craft id, or missing vessel parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A* could not reach the goal, or an endpoint sits on a wall.
    #[error("routing failure: {0}")]
    Routing(String),

    /// A displacement or position became non-finite; should not happen on
    /// well-formed inputs.
    #[error("invalid runtime value: {0}")]
    InvalidValue(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
