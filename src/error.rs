use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the fission simulation and its persistence helpers.
///
/// Configuration problems are detected once, when a [`crate::Simulation`] is
/// built; a running simulation never fails mid-step.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A configuration document could not be parsed into a `SimulationConfig`.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Propagated I/O errors from the run cache.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization failures while writing cached runs.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("bounding_parameter must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("bounding_parameter"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing run dir");
        let e: Error = io.into();
        assert!(e.to_string().contains("missing run dir"));
    }
}
