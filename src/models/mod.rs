mod amount;
mod filter;
mod loan;
mod month;
mod savings;
mod target;
mod user;
mod welfare;

pub use amount::{check_amount, check_positive, parse_amount, MAX_AMOUNT};
pub(crate) use amount::decimal_from_sql;
pub use filter::{parse_date, RecordFilter};
pub use loan::{Loan, LoanDecision, LoanStatus, StatusSummary, LOAN_TERM_DAYS};
pub use month::{MonthKey, MonthTotal, UserTotal};
pub use savings::Savings;
pub use target::SavingsTarget;
pub use user::{Actor, Role, User};
pub use welfare::WelfareContribution;

#[cfg(test)]
mod tests;
