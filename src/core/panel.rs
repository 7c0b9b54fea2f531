use crate::core::aggregation::{
    AVG_BY_LOCATION, DEVICE_COUNT_BY_LOCATION, LOYALTY_BY_LOCATION, PAYMENT_METHOD_BY_LOCATION,
    SUM_BY_CATEGORY, TOP_MERCHANTS,
};
use crate::core::series::{self, Palette, SeriesPlan};
use crate::domain::model::{
    AggregationResult, Axis, AxisRole, BarMode, ChartKind, Dashboard, PanelSpec,
};
use crate::utils::error::{Result, WalletError};

pub const DASHBOARD_HEADING: &str = "Digital Wallet Transactions Dashboard";

/// 一個分頁的靜態設定
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDefinition {
    pub query: String,
    pub tab_label: String,
    pub title: String,
    pub plan: SeriesPlan,
}

impl PanelDefinition {
    fn new(query: &str, tab_label: &str, title: &str, plan: SeriesPlan) -> Self {
        Self {
            query: query.to_string(),
            tab_label: tab_label.to_string(),
            title: title.to_string(),
            plan,
        }
    }
}

pub fn standard_panels(categorical: Palette, device: Palette) -> Vec<PanelDefinition> {
    vec![
        PanelDefinition::new(
            AVG_BY_LOCATION,
            "Top Locations",
            "Locations Sorted by the Average Product Amount",
            SeriesPlan::single(
                "Average Product Amount",
                "avg_product_amount_by_location",
                "blue",
            ),
        ),
        PanelDefinition::new(
            SUM_BY_CATEGORY,
            "Product Categories",
            "Sum of Product Amount by Product Category",
            SeriesPlan::single(
                "Sum of Product Amount",
                "sum_product_amount_by_category",
                "green",
            ),
        ),
        PanelDefinition::new(
            DEVICE_COUNT_BY_LOCATION,
            "Device Usage",
            "Count of Different Device Usages in the Regions sorted by Average Sales",
            SeriesPlan::partitioned("count_device_type_by_location", "device_type", device),
        ),
        PanelDefinition::new(
            TOP_MERCHANTS,
            "Merchant Popularity",
            "Top Ten Most Popular Merchant Names",
            SeriesPlan::single("Count of Merchant Name", "count_merchant_name", "purple"),
        ),
        PanelDefinition::new(
            PAYMENT_METHOD_BY_LOCATION,
            "Payment Methods",
            "Payment Methods in Regions",
            SeriesPlan::partitioned(
                "count_payment_method_by_location",
                "payment_method",
                categorical,
            ),
        ),
        PanelDefinition::new(
            LOYALTY_BY_LOCATION,
            "Loyalty Points",
            "Regions sorted by the Most Loyalty Points",
            SeriesPlan::single(
                "Sum of Loyalty Points",
                "sum_loyalty_points_by_location",
                "brown",
            ),
        ),
    ]
}

pub fn assemble(result: &AggregationResult, definition: &PanelDefinition) -> Result<PanelSpec> {
    let series = series::build(result, &definition.plan)?;
    let x_column = definition.plan.x_column(result)?;

    Ok(PanelSpec {
        tab_label: definition.tab_label.clone(),
        title: definition.title.clone(),
        kind: ChartKind::Bar,
        x_axis: Axis {
            column: x_column.to_string(),
            role: AxisRole::Categorical,
        },
        y_axis: Axis {
            column: definition.plan.measure.clone(),
            role: AxisRole::Measure,
        },
        bar_mode: BarMode::Group,
        series,
    })
}

/// 依分頁順序把每個結果配上對應的分頁設定
pub fn assemble_dashboard(
    heading: &str,
    results: &[AggregationResult],
    definitions: &[PanelDefinition],
) -> Result<Dashboard> {
    let panels = definitions
        .iter()
        .map(|definition| {
            let result = results
                .iter()
                .find(|r| r.query == definition.query)
                .ok_or_else(|| WalletError::ConfigError {
                    message: format!("no aggregation result for panel '{}'", definition.tab_label),
                })?;
            let panel = assemble(result, definition)?;
            tracing::debug!(
                "Assembled panel '{}' with {} series",
                panel.tab_label,
                panel.series.len()
            );
            Ok(panel)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dashboard {
        heading: heading.to_string(),
        panels,
    })
}
