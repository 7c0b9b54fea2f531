use crate::domain::model::{AggregationResult, ResultRow, Series};
use crate::utils::error::{Result, WalletError};
use crate::utils::validation::validate_palette;
use std::collections::HashMap;

pub const CATEGORICAL_PALETTE: [&str; 9] = [
    "orange", "blue", "green", "red", "purple", "brown", "pink", "yellow", "grey",
];

pub const DEVICE_PALETTE: [&str; 3] = ["orange", "blue", "purple"];

const PARTITION_HOVER_INFO: &str = "text+y";

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Result<Self> {
        validate_palette("palette", &colors)?;
        Ok(Self { colors })
    }

    pub fn categorical() -> Self {
        Self::from_static(&CATEGORICAL_PALETTE)
    }

    pub fn device() -> Self {
        Self::from_static(&DEVICE_PALETTE)
    }

    fn from_static(colors: &[&str]) -> Self {
        Self {
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// `palette[index mod len]`，任何 index 都有定義
    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorScheme {
    Fixed(String),
    Palette(Palette),
}

impl ColorScheme {
    fn color(&self, index: usize) -> String {
        match self {
            ColorScheme::Fixed(color) => color.clone(),
            ColorScheme::Palette(palette) => palette.color(index).to_string(),
        }
    }
}

/// 如何把一個聚合結果畫成數條 series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlan {
    /// 未分割時唯一那條 series 的名稱
    pub name: String,
    pub measure: String,
    pub partition: Option<String>,
    pub colors: ColorScheme,
}

impl SeriesPlan {
    pub fn single(name: &str, measure: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            measure: measure.to_string(),
            partition: None,
            colors: ColorScheme::Fixed(color.to_string()),
        }
    }

    pub fn partitioned(measure: &str, partition: &str, palette: Palette) -> Self {
        Self {
            name: partition.to_string(),
            measure: measure.to_string(),
            partition: Some(partition.to_string()),
            colors: ColorScheme::Palette(palette),
        }
    }

    /// x 軸欄位：第一個不是分割欄位的分組鍵
    pub fn x_column<'a>(&self, result: &'a AggregationResult) -> Result<&'a str> {
        result
            .group_columns
            .iter()
            .map(String::as_str)
            .find(|c| Some(*c) != self.partition.as_deref())
            .ok_or_else(|| WalletError::ConfigValidationError {
                field: format!("panels.{}", result.query),
                message: "no grouping column left for the x axis".to_string(),
            })
    }
}

pub fn build(result: &AggregationResult, plan: &SeriesPlan) -> Result<Vec<Series>> {
    if result.is_empty() {
        return Err(WalletError::EmptyResultError {
            query: result.query.clone(),
        });
    }

    ensure_column(result, &plan.measure)?;
    let x_column = plan.x_column(result)?;

    let Some(partition) = plan.partition.as_deref() else {
        let rows: Vec<&ResultRow> = result.rows.iter().collect();
        let (x, y) = coordinates(result, &rows, x_column, &plan.measure)?;
        return Ok(vec![Series {
            name: plan.name.clone(),
            color: plan.colors.color(0),
            x,
            y,
            text: None,
            hover_info: None,
        }]);
    };

    ensure_column(result, partition)?;

    // 依第一次出現的順序分割，不依賴 HashMap 的迭代順序
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut partitions: Vec<(String, Vec<&ResultRow>)> = Vec::new();
    for row in &result.rows {
        let value = row.get(partition).map(|v| v.label()).unwrap_or_default();
        let slot = *index.entry(value.clone()).or_insert_with(|| {
            partitions.push((value, Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(row);
    }

    partitions
        .into_iter()
        .enumerate()
        .map(|(i, (value, rows))| {
            let (x, y) = coordinates(result, &rows, x_column, &plan.measure)?;
            Ok(Series {
                color: plan.colors.color(i),
                text: Some(vec![value.clone(); x.len()]),
                hover_info: Some(PARTITION_HOVER_INFO.to_string()),
                name: value,
                x,
                y,
            })
        })
        .collect()
}

fn ensure_column(result: &AggregationResult, column: &str) -> Result<()> {
    if result.columns().any(|c| c == column) {
        Ok(())
    } else {
        Err(WalletError::ConfigValidationError {
            field: format!("panels.{}", result.query),
            message: format!("result has no column '{}'", column),
        })
    }
}

fn coordinates(
    result: &AggregationResult,
    rows: &[&ResultRow],
    x_column: &str,
    measure: &str,
) -> Result<(Vec<String>, Vec<f64>)> {
    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        x.push(row.get(x_column).map(|v| v.label()).unwrap_or_default());
        let value = row.get(measure);
        // JSON 無法表示 inf/NaN，輸出後會讀不回來
        let reason = match value.and_then(|v| v.as_f64()) {
            Some(v) if v.is_finite() => {
                y.push(v);
                continue;
            }
            Some(_) => "is not a finite number",
            None => "is not numeric",
        };
        return Err(WalletError::TypeError {
            row: i + 1,
            field: format!("{}.{}", result.query, measure),
            value: value.map(|v| v.label()).unwrap_or_default(),
            reason: reason.to_string(),
        });
    }
    Ok((x, y))
}
