use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Ledger entry. Method is `MOMO` (mobile money) or `OM` (Orange Money).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub amount: Decimal,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}
