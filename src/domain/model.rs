use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 從 CSV 讀進來、尚未驗證的一列資料。所有欄位都是可選文字，
/// 由 `RecordStore::load` 負責檢查與轉型。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: Option<String>,
    pub user_id: Option<String>,
    pub transaction_date: Option<String>,
    pub product_category: Option<String>,
    pub product_name: Option<String>,
    pub merchant_name: Option<String>,
    pub product_amount: Option<String>,
    pub transaction_fee: Option<String>,
    pub cashback: Option<String>,
    pub loyalty_points: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_status: Option<String>,
    pub merchant_id: Option<String>,
    pub device_type: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub user_id: String,
    pub transaction_date: NaiveDateTime,
    pub product_category: String,
    pub product_name: String,
    pub merchant_name: String,
    pub merchant_id: String,
    pub product_amount: f64,
    pub transaction_fee: f64,
    pub cashback: f64,
    pub loyalty_points: i64,
    pub payment_method: String,
    pub transaction_status: String,
    pub device_type: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Real,
    Integer,
    Timestamp,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Real | ColumnKind::Integer)
    }
}

/// 交易表的 15 個欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TransactionId,
    UserId,
    TransactionDate,
    ProductCategory,
    ProductName,
    MerchantName,
    MerchantId,
    ProductAmount,
    TransactionFee,
    Cashback,
    LoyaltyPoints,
    PaymentMethod,
    TransactionStatus,
    DeviceType,
    Location,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::TransactionId,
        Column::UserId,
        Column::TransactionDate,
        Column::ProductCategory,
        Column::ProductName,
        Column::MerchantName,
        Column::MerchantId,
        Column::ProductAmount,
        Column::TransactionFee,
        Column::Cashback,
        Column::LoyaltyPoints,
        Column::PaymentMethod,
        Column::TransactionStatus,
        Column::DeviceType,
        Column::Location,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::TransactionId => "transaction_id",
            Column::UserId => "user_id",
            Column::TransactionDate => "transaction_date",
            Column::ProductCategory => "product_category",
            Column::ProductName => "product_name",
            Column::MerchantName => "merchant_name",
            Column::MerchantId => "merchant_id",
            Column::ProductAmount => "product_amount",
            Column::TransactionFee => "transaction_fee",
            Column::Cashback => "cashback",
            Column::LoyaltyPoints => "loyalty_points",
            Column::PaymentMethod => "payment_method",
            Column::TransactionStatus => "transaction_status",
            Column::DeviceType => "device_type",
            Column::Location => "location",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::ProductAmount | Column::TransactionFee | Column::Cashback => ColumnKind::Real,
            Column::LoyaltyPoints => ColumnKind::Integer,
            Column::TransactionDate => ColumnKind::Timestamp,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|column| column.name() == s)
            .ok_or_else(|| format!("unknown column '{}'", s))
    }
}

impl TransactionRecord {
    /// 取出欄位值作為分組鍵
    pub fn key(&self, column: Column) -> Scalar {
        match column {
            Column::TransactionId => Scalar::Text(self.transaction_id.clone()),
            Column::UserId => Scalar::Text(self.user_id.clone()),
            Column::TransactionDate => {
                Scalar::Text(self.transaction_date.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Column::ProductCategory => Scalar::Text(self.product_category.clone()),
            Column::ProductName => Scalar::Text(self.product_name.clone()),
            Column::MerchantName => Scalar::Text(self.merchant_name.clone()),
            Column::MerchantId => Scalar::Text(self.merchant_id.clone()),
            Column::ProductAmount => Scalar::Float(self.product_amount),
            Column::TransactionFee => Scalar::Float(self.transaction_fee),
            Column::Cashback => Scalar::Float(self.cashback),
            Column::LoyaltyPoints => Scalar::Int(self.loyalty_points),
            Column::PaymentMethod => Scalar::Text(self.payment_method.clone()),
            Column::TransactionStatus => Scalar::Text(self.transaction_status.clone()),
            Column::DeviceType => Scalar::Text(self.device_type.clone()),
            Column::Location => Scalar::Text(self.location.clone()),
        }
    }

    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::ProductAmount => Some(self.product_amount),
            Column::TransactionFee => Some(self.transaction_fee),
            Column::Cashback => Some(self.cashback),
            Column::LoyaltyPoints => Some(self.loyalty_points as f64),
            _ => None,
        }
    }
}

/// 聚合結果中的單一值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 全序比較：數值在文字之前，浮點數用 total_cmp
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.label().cmp(&other.label()),
        }
    }

    /// 作為座標軸標籤的文字形式
    pub fn label(&self) -> String {
        match self {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

pub type ResultRow = BTreeMap<String, Scalar>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub query: String,
    pub group_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.group_columns
            .iter()
            .chain(self.value_columns.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_info: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRole {
    Categorical,
    Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub column: String,
    pub role: AxisRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub tab_label: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bar_mode: BarMode,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub heading: String,
    pub panels: Vec<PanelSpec>,
}

/// 截斷的範圍：整個結果取前 N 列，或是每個主分組各取前 N 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LimitScope {
    /// 結果總列數不超過 N
    #[default]
    Rows,
    /// 每個主分組鍵 (第一個分組欄位) 最多 N 列，總列數可以超過 N
    PerGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub rows: usize,
    #[serde(default)]
    pub scope: LimitScope,
}

impl Limit {
    pub fn rows(rows: usize) -> Self {
        Self {
            rows,
            scope: LimitScope::Rows,
        }
    }
}

/// 兩種既有的限制策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LimitProfile {
    /// 只有 top_merchants 取前 10 名
    #[default]
    Unlimited,
    /// 每個查詢都取前 10 列
    TopTen,
}

impl fmt::Display for LimitProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitProfile::Unlimited => f.write_str("unlimited"),
            LimitProfile::TopTen => f.write_str("top-ten"),
        }
    }
}

/// 單一查詢的限制覆寫設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryOverride {
    pub limit: Option<usize>,
    pub unlimited: Option<bool>,
    pub scope: Option<LimitScope>,
}
