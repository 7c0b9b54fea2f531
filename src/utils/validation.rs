use crate::utils::error::{Result, WalletError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_extensions.contains(&extension.to_ascii_lowercase().as_str()) => {
            Ok(())
        }
        Some(extension) => Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WalletError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 調色盤至少要有一個顏色，且每個顏色都不能是空字串
pub fn validate_palette(field_name: &str, colors: &[String]) -> Result<()> {
    if colors.is_empty() {
        return Err(WalletError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Palette must contain at least one color".to_string(),
        });
    }
    for color in colors {
        validate_non_empty_string(field_name, color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./output").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("queries.top_merchants.limit", 10, 1).is_ok());
        assert!(validate_positive_number("queries.top_merchants.limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("input", "transactions.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("input", "TRANSACTIONS.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("input", "transactions.xlsx", &["csv"]).is_err());
        assert!(validate_file_extension("input", "transactions", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_palette() {
        assert!(validate_palette("palette.device", &["orange".to_string()]).is_ok());
        assert!(validate_palette("palette.device", &[]).is_err());
        assert!(validate_palette("palette.device", &["  ".to_string()]).is_err());
    }
}
