use crate::domain::model::{Column, RawTransaction};
use crate::utils::error::Result;
use csv::{ReaderBuilder, StringRecord, Trim};

pub const DEFAULT_DROP_COLUMNS: [&str; 1] = ["idx"];

/// 解析 CSV 內容，略過 `drop_columns` 指定的欄位 (例如資料集自帶的 idx 列號)
pub fn read_transactions(data: &[u8], drop_columns: &[String]) -> Result<Vec<RawTransaction>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(false)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut renamed = StringRecord::new();
    for (i, header) in headers.iter().enumerate() {
        if drop_columns.iter().any(|c| c == header) {
            tracing::debug!("Dropping column '{}'", header);
            renamed.push_field(&format!("__dropped_{}", i));
        } else {
            if header.parse::<Column>().is_err() {
                tracing::warn!("Ignoring unknown column '{}'", header);
            }
            renamed.push_field(header);
        }
    }
    reader.set_headers(renamed);

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: RawTransaction = row?;
        rows.push(row);
    }

    tracing::debug!("Read {} rows from CSV", rows.len());
    Ok(rows)
}

pub fn default_drop_columns() -> Vec<String> {
    DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::WalletError;

    const SAMPLE: &str = "\
idx,transaction_id,user_id,transaction_date,product_category,product_name,merchant_name,product_amount,transaction_fee,cashback,loyalty_points,payment_method,transaction_status,merchant_id,device_type,location
1,T1,USER_05,2023-08-19 03:32:00,Streaming Service,Spotify Sub,Netflix,1437.7,37.2,3.2,107,Debit Card,Successful,MERCH_0083,iOS,Urban
2,T2,USER_09,2023-08-19 04:37:00,Food Delivery,Burger Meal,Swiggy,193.6,22.7,1.9,17,UPI,Successful,MERCH_0017,Android,Rural
";

    #[test]
    fn test_read_transactions_drops_idx() {
        let rows = read_transactions(SAMPLE.as_bytes(), &default_drop_columns()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transaction_id.as_deref(), Some("T1"));
        assert_eq!(rows[0].product_amount.as_deref(), Some("1437.7"));
        assert_eq!(rows[1].location.as_deref(), Some("Rural"));
    }

    #[test]
    fn test_empty_cells_become_none() {
        let data = "\
transaction_id,location,product_amount
T1,,12.5
";
        let rows = read_transactions(data.as_bytes(), &[]).unwrap();
        assert_eq!(rows[0].location, None);
        assert_eq!(rows[0].user_id, None);
        assert_eq!(rows[0].product_amount.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_ragged_rows_are_csv_errors() {
        let data = "transaction_id,location\nT1,Urban,extra\n";
        assert!(matches!(
            read_transactions(data.as_bytes(), &[]),
            Err(WalletError::CsvError(_))
        ));
    }
}
