use chrono::NaiveDateTime;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Savings {
    pub id: Option<i64>,
    pub user_id: i64,
    /// Owner's username, filled in on reads.
    pub username: String,
    pub amount: Decimal,
    pub saved_at: NaiveDateTime,
    pub description: String,
}

impl Savings {
    pub fn new(
        user_id: i64,
        username: String,
        amount: Decimal,
        description: String,
        saved_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            user_id,
            username,
            amount,
            saved_at,
            description,
        }
    }
}
