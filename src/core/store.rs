use crate::core::aggregation::{self, AggregationSpec};
use crate::domain::model::{AggregationResult, Column, RawTransaction, TransactionRecord};
use crate::utils::error::{Result, WalletError};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// 唯讀的交易資料表。建立後不再變動。
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<TransactionRecord>,
    index: HashMap<String, usize>,
}

impl RecordStore {
    /// 驗證並載入原始資料列。列號從 1 開始 (不含標題列)。
    pub fn load<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawTransaction>,
    {
        let mut store = Self::default();
        for (i, raw) in rows.into_iter().enumerate() {
            let row = i + 1;
            let record = parse_row(row, raw)?;
            store.insert(row, record)?;
        }
        tracing::debug!("Loaded {} transactions into the record store", store.len());
        Ok(store)
    }

    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = TransactionRecord>,
    {
        let mut store = Self::default();
        for (i, record) in records.into_iter().enumerate() {
            store.insert(i + 1, record)?;
        }
        Ok(store)
    }

    fn insert(&mut self, row: usize, record: TransactionRecord) -> Result<()> {
        if self.index.contains_key(&record.transaction_id) {
            return Err(WalletError::DuplicateKeyError {
                transaction_id: record.transaction_id,
                row,
            });
        }
        self.index
            .insert(record.transaction_id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn query(&self, spec: &AggregationSpec) -> Result<AggregationResult> {
        aggregation::execute(spec, &self.records)
    }

    pub fn get(&self, transaction_id: &str) -> Option<&TransactionRecord> {
        self.index.get(transaction_id).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_row(row: usize, raw: RawTransaction) -> Result<TransactionRecord> {
    let date_text = required(row, Column::TransactionDate, raw.transaction_date)?;
    let amount_text = required(row, Column::ProductAmount, raw.product_amount)?;
    let fee_text = required(row, Column::TransactionFee, raw.transaction_fee)?;
    let cashback_text = required(row, Column::Cashback, raw.cashback)?;
    let points_text = required(row, Column::LoyaltyPoints, raw.loyalty_points)?;

    Ok(TransactionRecord {
        transaction_id: required(row, Column::TransactionId, raw.transaction_id)?,
        user_id: required(row, Column::UserId, raw.user_id)?,
        transaction_date: parse_date(row, &date_text)?,
        product_category: required(row, Column::ProductCategory, raw.product_category)?,
        product_name: required(row, Column::ProductName, raw.product_name)?,
        merchant_name: required(row, Column::MerchantName, raw.merchant_name)?,
        merchant_id: required(row, Column::MerchantId, raw.merchant_id)?,
        product_amount: parse_amount(row, Column::ProductAmount, &amount_text)?,
        transaction_fee: parse_amount(row, Column::TransactionFee, &fee_text)?,
        cashback: parse_amount(row, Column::Cashback, &cashback_text)?,
        loyalty_points: parse_points(row, &points_text)?,
        payment_method: required(row, Column::PaymentMethod, raw.payment_method)?,
        transaction_status: required(row, Column::TransactionStatus, raw.transaction_status)?,
        device_type: required(row, Column::DeviceType, raw.device_type)?,
        location: required(row, Column::Location, raw.location)?,
    })
}

fn required(row: usize, column: Column, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(WalletError::SchemaError {
            row,
            message: format!("missing required field '{}'", column),
        }),
    }
}

fn type_error(row: usize, column: Column, value: &str, reason: &str) -> WalletError {
    WalletError::TypeError {
        row,
        field: column.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_amount(row: usize, column: Column, text: &str) -> Result<f64> {
    let value: f64 = text
        .parse()
        .map_err(|_| type_error(row, column, text, "is not a number"))?;
    if !value.is_finite() {
        return Err(type_error(row, column, text, "is not a finite number"));
    }
    if value < 0.0 {
        return Err(type_error(row, column, text, "must be non-negative"));
    }
    Ok(value)
}

fn parse_points(row: usize, text: &str) -> Result<i64> {
    // pandas 匯出的整數欄位有時帶 ".0"
    let value = match text.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match text.parse::<f64>() {
            // i64::MAX as f64 會進位成 2^63，等於時也已超出範圍
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= i64::MAX as f64 => {
                return Err(type_error(
                    row,
                    Column::LoyaltyPoints,
                    text,
                    "is out of range",
                ))
            }
            Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
            _ => {
                return Err(type_error(
                    row,
                    Column::LoyaltyPoints,
                    text,
                    "is not an integer",
                ))
            }
        },
    };
    if value < 0 {
        return Err(type_error(
            row,
            Column::LoyaltyPoints,
            text,
            "must be non-negative",
        ));
    }
    Ok(value)
}

fn parse_date(row: usize, text: &str) -> Result<NaiveDateTime> {
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            type_error(
                row,
                Column::TransactionDate,
                text,
                "is not a recognised date/time",
            )
        })
}
