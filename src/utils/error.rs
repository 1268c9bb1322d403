use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Catalog,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LensError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LensError::IoError(_) => ErrorCategory::Io,
            LensError::SerializationError(_) | LensError::CsvError(_) => ErrorCategory::Data,
            LensError::ConfigError { .. }
            | LensError::ConfigValidationError { .. }
            | LensError::InvalidConfigValueError { .. }
            | LensError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LensError::CatalogError { .. } => ErrorCategory::Catalog,
            LensError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LensError::CsvError(_) | LensError::SerializationError(_) => ErrorSeverity::Medium,
            LensError::ConfigError { .. }
            | LensError::ConfigValidationError { .. }
            | LensError::InvalidConfigValueError { .. }
            | LensError::MissingConfigError { .. }
            | LensError::CatalogError { .. }
            | LensError::ProcessingError { .. } => ErrorSeverity::High,
            LensError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LensError::IoError(e) => format!("Could not read or write a file: {}", e),
            LensError::SerializationError(e) => format!("Invalid JSON data: {}", e),
            LensError::CsvError(e) => format!("Could not write CSV output: {}", e),
            LensError::ConfigError { message } => format!("Configuration problem: {}", message),
            LensError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            LensError::InvalidConfigValueError { field, value, reason } => {
                format!("Setting '{}' has an invalid value '{}': {}", field, value, reason)
            }
            LensError::MissingConfigError { field } => {
                format!("Setting '{}' is required but was not provided", field)
            }
            LensError::CatalogError { message } => format!("Course catalog problem: {}", message),
            LensError::ProcessingError { message } => format!("Scan failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the input files exist and the output directory is writable",
            ErrorCategory::Data => "Check that the catalog file is valid JSON produced by build_catalog",
            ErrorCategory::Configuration => "Review the command line flags or TOML configuration file",
            ErrorCategory::Catalog => "Regenerate the catalog with build_catalog and try again",
            ErrorCategory::Processing => "Re-run with --verbose to see which document failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, LensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = LensError::MissingConfigError {
            field: "catalog".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("catalog"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: LensError = io.into();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("missing.json"));
    }
}
