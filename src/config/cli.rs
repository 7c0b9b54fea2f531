use crate::core::aggregation::{DEVICE_COUNT_BY_LOCATION, PAYMENT_METHOD_BY_LOCATION};
use crate::core::panel::DASHBOARD_HEADING;
use crate::core::ConfigProvider;
use crate::domain::model::{LimitProfile, LimitScope, QueryOverride};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path,
    validate_positive_number, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "wallet-dash")]
#[command(about = "Build a digital wallet transactions dashboard from a CSV export")]
pub struct CliConfig {
    #[arg(long, default_value = "digital_wallet_transactions.csv")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "dashboard.json")]
    pub output_file: String,

    #[arg(long, value_enum, default_value_t = LimitProfile::Unlimited)]
    pub profile: LimitProfile,

    #[arg(
        long,
        help = "Row limit for the location/device and location/payment queries"
    )]
    pub combined_limit: Option<usize>,

    #[arg(long, value_enum, help = "How --combined-limit truncates: rows or per-group")]
    pub limit_scope: Option<LimitScope>,

    #[arg(long, value_delimiter = ',', default_value = "idx")]
    pub drop_columns: Vec<String>,

    #[arg(long, help = "Run the aggregations on worker threads")]
    pub parallel: bool,

    #[arg(long, help = "Pretty-print the dashboard JSON")]
    pub pretty: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn pretty_output(&self) -> bool {
        self.pretty
    }

    fn drop_columns(&self) -> &[String] {
        &self.drop_columns
    }

    fn heading(&self) -> &str {
        DASHBOARD_HEADING
    }

    fn limit_profile(&self) -> LimitProfile {
        self.profile
    }

    fn query_override(&self, query: &str) -> Option<QueryOverride> {
        if query != DEVICE_COUNT_BY_LOCATION && query != PAYMENT_METHOD_BY_LOCATION {
            return None;
        }
        if self.combined_limit.is_none() && self.limit_scope.is_none() {
            return None;
        }
        Some(QueryOverride {
            limit: self.combined_limit,
            unlimited: None,
            scope: self.limit_scope,
        })
    }

    fn parallel(&self) -> bool {
        self.parallel
    }

    fn categorical_palette(&self) -> Option<&[String]> {
        None
    }

    fn device_palette(&self) -> Option<&[String]> {
        None
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &["csv"])?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("output_file", &self.output_file)?;
        if let Some(limit) = self.combined_limit {
            validate_positive_number("combined_limit", limit, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["wallet-dash"]);
        assert_eq!(config.input, "digital_wallet_transactions.csv");
        assert_eq!(config.drop_columns, vec!["idx"]);
        assert_eq!(config.profile, LimitProfile::Unlimited);
        assert!(config.validate().is_ok());
        assert_eq!(config.query_override(DEVICE_COUNT_BY_LOCATION), None);
    }

    #[test]
    fn test_combined_limit_applies_to_two_queries() {
        let config = CliConfig::parse_from([
            "wallet-dash",
            "--profile",
            "top-ten",
            "--combined-limit",
            "3",
            "--limit-scope",
            "per-group",
        ]);

        assert_eq!(config.profile, LimitProfile::TopTen);
        let expected = Some(QueryOverride {
            limit: Some(3),
            unlimited: None,
            scope: Some(LimitScope::PerGroup),
        });
        assert_eq!(config.query_override(DEVICE_COUNT_BY_LOCATION), expected);
        assert_eq!(config.query_override(PAYMENT_METHOD_BY_LOCATION), expected);
        assert_eq!(config.query_override("top_merchants"), None);
    }

    #[test]
    fn test_validation_rejects_non_csv_input() {
        let config = CliConfig::parse_from(["wallet-dash", "--input", "data.xlsx"]);
        assert!(config.validate().is_err());

        let zero = CliConfig::parse_from(["wallet-dash", "--combined-limit", "0"]);
        assert!(zero.validate().is_err());
    }
}
