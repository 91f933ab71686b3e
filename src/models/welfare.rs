use chrono::NaiveDateTime;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct WelfareContribution {
    pub id: Option<i64>,
    pub user_id: i64,
    pub username: String,
    pub amount: Decimal,
    pub contributed_at: NaiveDateTime,
}

impl WelfareContribution {
    pub fn new(user_id: i64, username: String, amount: Decimal, contributed_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            user_id,
            username,
            amount,
            contributed_at,
        }
    }
}
