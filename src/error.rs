//! Error types for loading and validating car tuning.

use std::fmt;

/// Errors surfaced while loading the tuning file or validating it at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The tuning file could not be read.
    Io { path: String, source: std::io::Error },
    /// The tuning file is not valid JSON for `CarTuning`.
    Parse { path: String, source: serde_json::Error },
    /// A curve has no keys.
    EmptyCurve { curve: &'static str },
    /// Curve key times are not strictly increasing.
    NonMonotonicCurve { curve: &'static str, key: usize },
    /// No drift particle asset was configured.
    MissingEffectAsset,
    /// A scalar tunable is out of range.
    InvalidValue { field: &'static str, detail: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read tuning file {path}: {source}"),
            Self::Parse { path, source } => {
                write!(f, "failed to parse tuning file {path}: {source}")
            }
            Self::EmptyCurve { curve } => write!(f, "curve {curve} has no keys"),
            Self::NonMonotonicCurve { curve, key } => {
                write!(f, "curve {curve}: key {key} does not increase in time")
            }
            Self::MissingEffectAsset => write!(f, "drift effect asset is not configured"),
            Self::InvalidValue { field, detail } => write!(f, "invalid value for {field}: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
