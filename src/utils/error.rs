use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("cannot decode column {column} of row {ub_id}: {message}")]
    RowDecodeError {
        ub_id: i32,
        column: String,
        message: String,
    },

    #[error("required column {field} is null")]
    MissingFieldError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::RowDecodeError { .. }
            | EtlError::MissingFieldError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定的程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 行解碼失敗時盡量保留該行的 UB_ID
    pub fn row_id(&self) -> Option<i32> {
        match self {
            EtlError::RowDecodeError { ub_id, .. } => Some(*ub_id),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::CsvError(_) | EtlError::RowDecodeError { .. } => {
                "Check the input file: header names and cell formats must match the objection table export"
            }
            EtlError::IoError(_) => "Check that the input file exists and the output directory is writable",
            EtlError::SerializationError(_) => "Inspect the record that failed to serialize",
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Provide a valid http(s) API endpoint, a username and a password"
            }
            EtlError::MissingFieldError { .. } => "Make sure UB_ID is populated in the source table",
            EtlError::ProcessingError { .. } => "Inspect the error output for the affected records",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("The forwarder is not configured correctly: {}", self),
            ErrorCategory::Data => format!("The input data could not be processed: {}", self),
            ErrorCategory::System => format!("A system error occurred: {}", self),
        }
    }
}
