use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::MonthKey;

#[derive(Debug, Clone)]
pub struct SavingsTarget {
    pub id: Option<i64>,
    pub user_id: i64,
    /// 1-12
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
    pub created_at: NaiveDateTime,
}

impl SavingsTarget {
    pub fn new(user_id: i64, month: MonthKey, amount: Decimal, created_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            user_id,
            month: month.month,
            year: month.year,
            amount,
            created_at,
        }
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }
}
