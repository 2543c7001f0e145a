//! Domain error types.

/// Top-level error type for signaltrader.
#[derive(Debug, thiserror::Error)]
pub enum SignaltraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignaltraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SignaltraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        SignaltraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&SignaltraderError> for std::process::ExitCode {
    fn from(err: &SignaltraderError) -> Self {
        let code: u8 = match err {
            SignaltraderError::Io(_) => 1,
            SignaltraderError::ConfigParse { .. }
            | SignaltraderError::ConfigMissing { .. }
            | SignaltraderError::ConfigInvalid { .. } => 2,
            SignaltraderError::DataUnavailable { .. } => 3,
            SignaltraderError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
