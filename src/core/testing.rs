//! Test fixtures shared by the core unit tests.

use crate::core::store::RecordStore;
use crate::domain::model::TransactionRecord;
use chrono::NaiveDate;

pub(crate) struct RecordBuilder {
    record: TransactionRecord,
}

impl RecordBuilder {
    pub(crate) fn new(transaction_id: &str) -> Self {
        let date = NaiveDate::from_ymd_opt(2023, 8, 19)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self {
            record: TransactionRecord {
                transaction_id: transaction_id.to_string(),
                user_id: "USER_01".to_string(),
                transaction_date: date,
                product_category: "Groceries".to_string(),
                product_name: "Basket".to_string(),
                merchant_name: "FreshMart".to_string(),
                merchant_id: "MERCH_01".to_string(),
                product_amount: 1.0,
                transaction_fee: 0.0,
                cashback: 0.0,
                loyalty_points: 0,
                payment_method: "UPI".to_string(),
                transaction_status: "Successful".to_string(),
                device_type: "Android".to_string(),
                location: "Urban".to_string(),
            },
        }
    }

    pub(crate) fn location(mut self, location: &str) -> Self {
        self.record.location = location.to_string();
        self
    }

    pub(crate) fn device(mut self, device_type: &str) -> Self {
        self.record.device_type = device_type.to_string();
        self
    }

    pub(crate) fn payment(mut self, payment_method: &str) -> Self {
        self.record.payment_method = payment_method.to_string();
        self
    }

    pub(crate) fn merchant(mut self, merchant_name: &str) -> Self {
        self.record.merchant_name = merchant_name.to_string();
        self
    }

    pub(crate) fn category(mut self, product_category: &str) -> Self {
        self.record.product_category = product_category.to_string();
        self
    }

    pub(crate) fn amount(mut self, product_amount: f64) -> Self {
        self.record.product_amount = product_amount;
        self
    }

    pub(crate) fn points(mut self, loyalty_points: i64) -> Self {
        self.record.loyalty_points = loyalty_points;
        self
    }

    pub(crate) fn build(self) -> TransactionRecord {
        self.record
    }
}

pub(crate) fn store_of(builders: Vec<RecordBuilder>) -> RecordStore {
    RecordStore::from_records(builders.into_iter().map(RecordBuilder::build))
        .expect("fixture ids are unique")
}

/// 交易編號為 `T{n}` 的預設資料
pub(crate) fn txn(n: usize) -> RecordBuilder {
    RecordBuilder::new(&format!("T{}", n))
}
