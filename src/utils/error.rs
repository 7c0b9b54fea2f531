use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Schema error at row {row}: {message}")]
    SchemaError { row: usize, message: String },

    #[error("Duplicate transaction_id '{transaction_id}' at row {row}")]
    DuplicateKeyError { transaction_id: String, row: usize },

    #[error("Type error at row {row}, field '{field}': {value:?} {reason}")]
    TypeError {
        row: usize,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Aggregation '{query}' produced no rows")]
    EmptyResultError { query: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 輸入檔案本身有問題 (欄位缺漏、型別錯誤、重複主鍵)
    Input,
    /// 資料可讀但聚合結果不可用
    Data,
    Config,
    System,
}

impl WalletError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WalletError::SchemaError { .. }
            | WalletError::DuplicateKeyError { .. }
            | WalletError::TypeError { .. }
            | WalletError::CsvError(_) => ErrorCategory::Input,
            WalletError::EmptyResultError { .. } => ErrorCategory::Data,
            WalletError::ConfigError { .. }
            | WalletError::ConfigValidationError { .. }
            | WalletError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            WalletError::IoError(_)
            | WalletError::SerializationError(_)
            | WalletError::TaskError { .. } => ErrorCategory::System,
        }
    }

    /// CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Data => 2,
            ErrorCategory::Config => 3,
            ErrorCategory::System => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            WalletError::SchemaError { .. } => {
                "Check that every row has all 15 transaction columns filled in"
            }
            WalletError::DuplicateKeyError { .. } => {
                "Remove the repeated transaction rows from the input file"
            }
            WalletError::TypeError { .. } => {
                "Fix the numeric or date value reported above in the input file"
            }
            WalletError::EmptyResultError { .. } => {
                "The input file contains no transactions; supply a non-empty dataset"
            }
            WalletError::CsvError(_) => "Make sure the input is a comma-separated file with a header row",
            WalletError::ConfigError { .. }
            | WalletError::ConfigValidationError { .. }
            | WalletError::InvalidConfigValueError { .. } => "Review the CLI flags or the TOML configuration",
            WalletError::IoError(_) => "Check that the input exists and the output directory is writable",
            WalletError::SerializationError(_) | WalletError::TaskError { .. } => {
                "Re-run with --verbose and report the log output"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_input_and_data_categories() {
        let schema = WalletError::SchemaError {
            row: 3,
            message: "missing field 'location'".to_string(),
        };
        let duplicate = WalletError::DuplicateKeyError {
            transaction_id: "T1".to_string(),
            row: 2,
        };
        let empty = WalletError::EmptyResultError {
            query: "avg_by_location".to_string(),
        };

        assert_eq!(schema.category(), ErrorCategory::Input);
        assert_eq!(duplicate.category(), ErrorCategory::Input);
        assert_eq!(empty.category(), ErrorCategory::Data);
        assert_eq!(empty.exit_code(), 2);
    }

    #[test]
    fn test_type_error_message_names_field_and_value() {
        let err = WalletError::TypeError {
            row: 7,
            field: "product_amount".to_string(),
            value: "abc".to_string(),
            reason: "is not a number".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("row 7"));
        assert!(message.contains("product_amount"));
        assert!(message.contains("\"abc\""));
    }
}
