use crate::core::aggregation::QUERY_NAMES;
use crate::core::ingest::default_drop_columns;
use crate::core::panel::DASHBOARD_HEADING;
use crate::core::ConfigProvider;
use crate::domain::model::{LimitProfile, QueryOverride};
use crate::utils::error::{Result, WalletError};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_palette, validate_path,
    validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: Option<DashboardSection>,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub execution: Option<ExecutionConfig>,
    pub queries: Option<HashMap<String, QueryOverride>>,
    pub palette: Option<PaletteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSection {
    pub heading: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_output_file")]
    pub file: String,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub profile: Option<LimitProfile>,
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub categorical: Option<Vec<String>>,
    pub device: Option<Vec<String>>,
}

fn default_output_file() -> String {
    "dashboard.json".to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WalletError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WalletError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WALLET_DATA})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WalletError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("input.path", &self.input.path)?;
        validate_file_extension("input.path", &self.input.path, &["csv"])?;
        validate_path("output.path", &self.output.path)?;
        validate_non_empty_string("output.file", &self.output.file)?;

        if let Some(queries) = &self.queries {
            for (name, query_override) in queries {
                if !QUERY_NAMES.contains(&name.as_str()) {
                    return Err(WalletError::InvalidConfigValueError {
                        field: "queries".to_string(),
                        value: name.clone(),
                        reason: format!("Unknown query. Valid queries: {}", QUERY_NAMES.join(", ")),
                    });
                }
                if let Some(limit) = query_override.limit {
                    validate_positive_number(&format!("queries.{}.limit", name), limit, 1)?;
                }
            }
        }

        if let Some(palette) = &self.palette {
            if let Some(colors) = &palette.categorical {
                validate_palette("palette.categorical", colors)?;
            }
            if let Some(colors) = &palette.device {
                validate_palette("palette.device", colors)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_file(&self) -> &str {
        &self.output.file
    }

    fn pretty_output(&self) -> bool {
        self.output.pretty
    }

    fn drop_columns(&self) -> &[String] {
        &self.input.drop_columns
    }

    fn heading(&self) -> &str {
        self.dashboard
            .as_ref()
            .and_then(|d| d.heading.as_deref())
            .unwrap_or(DASHBOARD_HEADING)
    }

    fn limit_profile(&self) -> LimitProfile {
        self.execution
            .as_ref()
            .and_then(|e| e.profile)
            .unwrap_or_default()
    }

    fn query_override(&self, query: &str) -> Option<QueryOverride> {
        self.queries.as_ref()?.get(query).copied()
    }

    fn parallel(&self) -> bool {
        self.execution
            .as_ref()
            .and_then(|e| e.parallel)
            .unwrap_or(false)
    }

    fn categorical_palette(&self) -> Option<&[String]> {
        self.palette.as_ref()?.categorical.as_deref()
    }

    fn device_palette(&self) -> Option<&[String]> {
        self.palette.as_ref()?.device.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
