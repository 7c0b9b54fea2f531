use crate::core::store::RecordStore;
use crate::domain::model::{
    AggregationResult, Column, ColumnKind, Limit, LimitProfile, LimitScope, QueryOverride,
    ResultRow, Scalar, TransactionRecord,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WalletError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

pub const AVG_BY_LOCATION: &str = "avg_by_location";
pub const SUM_BY_CATEGORY: &str = "sum_by_category";
pub const DEVICE_COUNT_BY_LOCATION: &str = "device_count_by_location";
pub const TOP_MERCHANTS: &str = "top_merchants";
pub const PAYMENT_METHOD_BY_LOCATION: &str = "payment_method_by_location";
pub const LOYALTY_BY_LOCATION: &str = "loyalty_by_location";

/// 固定的六個查詢，順序即儀表板分頁順序
pub const QUERY_NAMES: [&str; 6] = [
    AVG_BY_LOCATION,
    SUM_BY_CATEGORY,
    DEVICE_COUNT_BY_LOCATION,
    TOP_MERCHANTS,
    PAYMENT_METHOD_BY_LOCATION,
    LOYALTY_BY_LOCATION,
];

const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Avg,
    Sum,
    Count,
}

impl AggregateFn {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFn::Avg => "avg",
            AggregateFn::Sum => "sum",
            AggregateFn::Count => "count",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub column: Column,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// 一個宣告式的 group / aggregate / order / limit 查詢
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub name: String,
    pub group_by: Vec<Column>,
    pub aggregates: Vec<Aggregate>,
    pub order: Option<OrderBy>,
    pub limit: Option<Limit>,
}

impl AggregationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_by: Vec::new(),
            aggregates: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn group_by(mut self, columns: &[Column]) -> Self {
        self.group_by.extend_from_slice(columns);
        self
    }

    pub fn aggregate(mut self, func: AggregateFn, column: Column, alias: &str) -> Self {
        self.aggregates.push(Aggregate {
            func,
            column,
            alias: alias.to_string(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: Option<Limit>) -> Self {
        self.limit = limit;
        self
    }

    pub fn group_columns(&self) -> Vec<String> {
        self.group_by.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn value_columns(&self) -> Vec<String> {
        self.aggregates.iter().map(|a| a.alias.clone()).collect()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| WalletError::ConfigValidationError {
            field: format!("queries.{}", self.name),
            message,
        };

        if self.group_by.is_empty() {
            return Err(invalid("at least one grouping column is required".to_string()));
        }
        if self.aggregates.is_empty() {
            return Err(invalid("at least one aggregate is required".to_string()));
        }

        let mut outputs = self.group_columns();
        for aggregate in &self.aggregates {
            if aggregate.func != AggregateFn::Count && !aggregate.column.kind().is_numeric() {
                return Err(invalid(format!(
                    "{}({}) requires a numeric column",
                    aggregate.func.name(),
                    aggregate.column
                )));
            }
            if outputs.contains(&aggregate.alias) {
                return Err(invalid(format!(
                    "output column '{}' is defined twice",
                    aggregate.alias
                )));
            }
            outputs.push(aggregate.alias.clone());
        }

        if let Some(order) = &self.order {
            if !outputs.contains(&order.column) {
                return Err(invalid(format!(
                    "cannot order by unknown column '{}'",
                    order.column
                )));
            }
        }

        if let Some(limit) = &self.limit {
            if limit.rows == 0 {
                return Err(invalid("limit must be at least 1".to_string()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Accumulator {
    Count(i64),
    SumInt(i64),
    SumFloat(f64),
    Avg { sum: f64, count: u64 },
}

impl Accumulator {
    fn for_aggregate(aggregate: &Aggregate) -> Self {
        match (aggregate.func, aggregate.column.kind()) {
            (AggregateFn::Count, _) => Accumulator::Count(0),
            (AggregateFn::Sum, ColumnKind::Integer) => Accumulator::SumInt(0),
            (AggregateFn::Sum, _) => Accumulator::SumFloat(0.0),
            (AggregateFn::Avg, _) => Accumulator::Avg { sum: 0.0, count: 0 },
        }
    }

    /// 整數加總溢位時回傳 `None`
    fn update(&mut self, record: &TransactionRecord, column: Column) -> Option<()> {
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::SumInt(total) => {
                if let Scalar::Int(v) = record.key(column) {
                    *total = total.checked_add(v)?;
                }
            }
            Accumulator::SumFloat(total) => {
                if let Some(v) = record.numeric(column) {
                    *total += v;
                }
            }
            Accumulator::Avg { sum, count } => {
                if let Some(v) = record.numeric(column) {
                    *sum += v;
                    *count += 1;
                }
            }
        }
        Some(())
    }

    fn finish(&self) -> Scalar {
        match self {
            Accumulator::Count(n) | Accumulator::SumInt(n) => Scalar::Int(*n),
            Accumulator::SumFloat(total) => Scalar::Float(*total),
            // 分組只由既有資料列產生，count 至少為 1
            Accumulator::Avg { sum, count } => Scalar::Float(*sum / (*count).max(1) as f64),
        }
    }
}

struct Group {
    keys: Vec<Scalar>,
    accumulators: Vec<Accumulator>,
}

/// 單次掃描：分組、聚合、排序、截斷
pub fn execute(spec: &AggregationSpec, records: &[TransactionRecord]) -> Result<AggregationResult> {
    spec.validate()?;

    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (position, record) in records.iter().enumerate() {
        let keys: Vec<Scalar> = spec.group_by.iter().map(|c| record.key(*c)).collect();
        let labels: Vec<String> = keys.iter().map(Scalar::label).collect();
        let slot = *index.entry(labels).or_insert_with(|| {
            groups.push(Group {
                keys,
                accumulators: spec.aggregates.iter().map(Accumulator::for_aggregate).collect(),
            });
            groups.len() - 1
        });

        for (accumulator, aggregate) in groups[slot]
            .accumulators
            .iter_mut()
            .zip(&spec.aggregates)
        {
            if accumulator.update(record, aggregate.column).is_none() {
                return Err(WalletError::TypeError {
                    row: position + 1,
                    field: aggregate.column.name().to_string(),
                    value: record.key(aggregate.column).label(),
                    reason: format!("overflows the {} total in '{}'", aggregate.alias, spec.name),
                });
            }
        }
    }

    if groups.is_empty() {
        return Err(WalletError::EmptyResultError {
            query: spec.name.clone(),
        });
    }

    let mut rows: Vec<ResultRow> = groups
        .into_iter()
        .map(|group| {
            let mut row = ResultRow::new();
            for (column, key) in spec.group_by.iter().zip(group.keys) {
                row.insert(column.name().to_string(), key);
            }
            for (aggregate, accumulator) in spec.aggregates.iter().zip(&group.accumulators) {
                row.insert(aggregate.alias.clone(), accumulator.finish());
            }
            row
        })
        .collect();

    sort_rows(&mut rows, spec);

    if let Some(limit) = spec.limit {
        rows = apply_limit(rows, limit, spec.group_by[0].name());
    }

    Ok(AggregationResult {
        query: spec.name.clone(),
        group_columns: spec.group_columns(),
        value_columns: spec.value_columns(),
        rows,
    })
}

fn compare_cells(a: Option<&Scalar>, b: Option<&Scalar>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

/// 主排序鍵之後一律以分組鍵遞增排序，確保同分時結果固定
fn sort_rows(rows: &mut [ResultRow], spec: &AggregationSpec) {
    rows.sort_by(|a, b| {
        let primary = match &spec.order {
            Some(order) => {
                let ordering = compare_cells(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };

        primary.then_with(|| {
            spec.group_by
                .iter()
                .map(|c| compare_cells(a.get(c.name()), b.get(c.name())))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    });
}

fn apply_limit(mut rows: Vec<ResultRow>, limit: Limit, leading_column: &str) -> Vec<ResultRow> {
    match limit.scope {
        LimitScope::Rows => {
            rows.truncate(limit.rows);
            rows
        }
        LimitScope::PerGroup => {
            let mut seen: HashMap<String, usize> = HashMap::new();
            rows.into_iter()
                .filter(|row| {
                    let key = row
                        .get(leading_column)
                        .map(Scalar::label)
                        .unwrap_or_default();
                    let taken = seen.entry(key).or_insert(0);
                    *taken += 1;
                    *taken <= limit.rows
                })
                .collect()
        }
    }
}

pub fn standard_catalog(profile: LimitProfile) -> Vec<AggregationSpec> {
    let top_ten = Some(Limit::rows(TOP_N));
    let optional = match profile {
        LimitProfile::Unlimited => None,
        LimitProfile::TopTen => top_ten,
    };

    vec![
        AggregationSpec::new(AVG_BY_LOCATION)
            .group_by(&[Column::Location])
            .aggregate(
                AggregateFn::Avg,
                Column::ProductAmount,
                "avg_product_amount_by_location",
            )
            .order_by("avg_product_amount_by_location", SortDirection::Descending)
            .limit(optional),
        AggregationSpec::new(SUM_BY_CATEGORY)
            .group_by(&[Column::ProductCategory])
            .aggregate(
                AggregateFn::Sum,
                Column::ProductAmount,
                "sum_product_amount_by_category",
            )
            .limit(optional),
        AggregationSpec::new(DEVICE_COUNT_BY_LOCATION)
            .group_by(&[Column::Location, Column::DeviceType])
            .aggregate(
                AggregateFn::Count,
                Column::DeviceType,
                "count_device_type_by_location",
            )
            .order_by("count_device_type_by_location", SortDirection::Descending)
            .limit(optional),
        AggregationSpec::new(TOP_MERCHANTS)
            .group_by(&[Column::MerchantName])
            .aggregate(AggregateFn::Count, Column::MerchantName, "count_merchant_name")
            .order_by("count_merchant_name", SortDirection::Descending)
            .limit(top_ten),
        AggregationSpec::new(PAYMENT_METHOD_BY_LOCATION)
            .group_by(&[Column::Location, Column::PaymentMethod])
            .aggregate(
                AggregateFn::Count,
                Column::PaymentMethod,
                "count_payment_method_by_location",
            )
            .aggregate(
                AggregateFn::Avg,
                Column::ProductAmount,
                "avg_product_amount_by_location",
            )
            .order_by("avg_product_amount_by_location", SortDirection::Ascending)
            .limit(optional),
        AggregationSpec::new(LOYALTY_BY_LOCATION)
            .group_by(&[Column::Location])
            .aggregate(
                AggregateFn::Sum,
                Column::LoyaltyPoints,
                "sum_loyalty_points_by_location",
            )
            .order_by("sum_loyalty_points_by_location", SortDirection::Descending)
            .limit(optional),
    ]
}

pub fn apply_override(spec: &mut AggregationSpec, query_override: &QueryOverride) {
    if query_override.unlimited == Some(true) {
        spec.limit = None;
    } else if let Some(rows) = query_override.limit {
        spec.limit = Some(Limit {
            rows,
            scope: query_override.scope.unwrap_or_default(),
        });
    } else if let (Some(scope), Some(limit)) = (query_override.scope, spec.limit.as_mut()) {
        limit.scope = scope;
    }
}

/// 依設定的 profile 與個別覆寫產生最終查詢清單
pub fn resolve_catalog<C: ConfigProvider>(config: &C) -> Result<Vec<AggregationSpec>> {
    let mut specs = standard_catalog(config.limit_profile());
    for spec in &mut specs {
        if let Some(query_override) = config.query_override(&spec.name) {
            tracing::debug!("Applying override to {}: {:?}", spec.name, query_override);
            apply_override(spec, &query_override);
        }
        spec.validate()?;
    }
    Ok(specs)
}

fn run_one(store: &RecordStore, spec: &AggregationSpec) -> Result<AggregationResult> {
    let result = store.query(spec)?;
    tracing::debug!("Query {} returned {} rows", spec.name, result.len());
    Ok(result)
}

/// 執行所有查詢。平行模式下結果仍依查詢清單的順序回傳。
pub async fn run_catalog(
    store: Arc<RecordStore>,
    specs: &[AggregationSpec],
    parallel: bool,
) -> Result<Vec<AggregationResult>> {
    if !parallel {
        return specs.iter().map(|spec| run_one(&store, spec)).collect();
    }

    let handles: Vec<_> = specs
        .iter()
        .cloned()
        .map(|spec| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || run_one(&store, &spec))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await.map_err(|e| WalletError::TaskError {
            message: e.to_string(),
        })??;
        results.push(result);
    }
    Ok(results)
}
