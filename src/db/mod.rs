mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;

use crate::models::*;

/// Sum of a TEXT amount column, rounded to cents and read back as text.
/// SQLite sums as REAL and prints 15 significant digits, so totals are exact
/// to the cent only below 1e13. Loan limits use [`Database::sum_user_savings`],
/// which sums in `Decimal`.
const SUM_AMOUNT: &str = "CAST(ROUND(COALESCE(SUM(CAST(amount AS REAL)), 0), 2) AS TEXT)";

pub(crate) struct Database {
    conn: Connection,
}

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        LoanStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown loan status: {s}").into()))
    }
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            log::info!("created schema version {}", schema::CURRENT_VERSION);
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            log::info!(
                "migrated schema from version {current} to {}",
                schema::CURRENT_VERSION
            );
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        is_staff: bool,
        date_joined: NaiveDateTime,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO users (username, password_hash, is_staff, date_joined)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, password_hash, is_staff, date_joined],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username, is_staff, date_joined FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?)
    }

    pub(crate) fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username, is_staff, date_joined FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?)
    }

    /// The user and their stored password hash, for credential checks only.
    pub(crate) fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username, is_staff, date_joined, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| Ok((user_from_row(row)?, row.get(4)?)),
            )
            .optional()?)
    }

    pub(crate) fn count_staff(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM users WHERE is_staff = 1", [], |row| {
                row.get(0)
            })?)
    }

    pub(crate) fn set_staff(&self, user_id: i64, is_staff: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET is_staff = ?1 WHERE id = ?2",
            params![is_staff, user_id],
        )?;
        Ok(())
    }

    /// Non-staff users, by username.
    pub(crate) fn get_members(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, is_staff, date_joined FROM users WHERE is_staff = 0 ORDER BY username",
        )?;
        let rows = stmt.query_map([], user_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Savings ───────────────────────────────────────────────

    pub(crate) fn insert_savings(&self, savings: &Savings) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO savings (user_id, amount, saved_at, description) VALUES (?1, ?2, ?3, ?4)",
            params![
                savings.user_id,
                savings.amount.to_string(),
                savings.saved_at,
                savings.description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Savings matching `filter`, newest first.
    pub(crate) fn get_savings(&self, filter: &RecordFilter) -> Result<Vec<Savings>> {
        let mut sql = String::from(
            "SELECT s.id, s.user_id, u.username, s.amount, s.saved_at, s.description
             FROM savings s JOIN users u ON u.id = s.user_id WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        push_filter(&mut sql, &mut param_values, filter, "s.saved_at");
        sql.push_str(" ORDER BY s.saved_at DESC, s.id DESC");

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), savings_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_user_savings(&self, user_id: i64) -> Result<Vec<Savings>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.user_id, u.username, s.amount, s.saved_at, s.description
             FROM savings s JOIN users u ON u.id = s.user_id
             WHERE s.user_id = ?1
             ORDER BY s.saved_at DESC, s.id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], savings_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// A user's savings total, all-time or for one calendar month. Summed
    /// exactly in `Decimal`, since loan limits are derived from it.
    pub(crate) fn sum_user_savings(&self, user_id: i64, month: Option<MonthKey>) -> Result<Decimal> {
        let month = month.map(|m| m.as_ym());
        let mut stmt = self.conn.prepare(
            "SELECT amount FROM savings
             WHERE user_id = ?1 AND (?2 IS NULL OR strftime('%Y-%m', saved_at) = ?2)",
        )?;
        let mut rows = stmt.query(params![user_id, month])?;
        let mut total = Decimal::ZERO;
        while let Some(row) = rows.next()? {
            let amount: String = row.get(0)?;
            total += decimal_from_sql(&amount);
        }
        Ok(total)
    }

    pub(crate) fn sum_savings(&self, filter: &RecordFilter) -> Result<Decimal> {
        self.sum_filtered("savings", "saved_at", filter)
    }

    /// Savings totals per owner, largest first.
    pub(crate) fn savings_per_user(&self, filter: &RecordFilter) -> Result<Vec<UserTotal>> {
        let mut sql = String::from(
            "SELECT u.username, CAST(ROUND(SUM(CAST(s.amount AS REAL)), 2) AS TEXT)
             FROM savings s JOIN users u ON u.id = s.user_id WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        push_filter(&mut sql, &mut param_values, filter, "s.saved_at");
        sql.push_str(" GROUP BY u.id ORDER BY SUM(CAST(s.amount AS REAL)) DESC, u.username");

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            let total: String = row.get(1)?;
            Ok(UserTotal {
                username: row.get(0)?,
                total: decimal_from_sql(&total),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Savings per calendar month, oldest first. `None` covers every user.
    pub(crate) fn monthly_savings(&self, user_id: Option<i64>) -> Result<Vec<MonthTotal>> {
        match user_id {
            Some(id) => self.monthly_totals(
                &format!(
                    "SELECT strftime('%Y-%m', saved_at) AS month, {SUM_AMOUNT}
                     FROM savings WHERE user_id = ?1
                     GROUP BY month ORDER BY month"
                ),
                params![id],
            ),
            None => self.monthly_totals(
                &format!(
                    "SELECT strftime('%Y-%m', saved_at) AS month, {SUM_AMOUNT}
                     FROM savings GROUP BY month ORDER BY month"
                ),
                params![],
            ),
        }
    }

    // ── Savings targets ───────────────────────────────────────

    /// Insert or replace the amount of the user's target for that month.
    pub(crate) fn upsert_target(&self, target: &SavingsTarget) -> Result<()> {
        self.conn.execute(
            "INSERT INTO savings_targets (user_id, month, year, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, month, year) DO UPDATE SET amount = ?4",
            params![
                target.user_id,
                target.month,
                target.year,
                target.amount.to_string(),
                target.created_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get_target(&self, user_id: i64, month: MonthKey) -> Result<Option<SavingsTarget>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, user_id, month, year, amount, created_at FROM savings_targets
                 WHERE user_id = ?1 AND month = ?2 AND year = ?3",
                params![user_id, month.month, month.year],
                target_from_row,
            )
            .optional()?)
    }

    /// All of a user's targets, oldest month first.
    pub(crate) fn get_targets(&self, user_id: i64) -> Result<Vec<SavingsTarget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, month, year, amount, created_at FROM savings_targets
             WHERE user_id = ?1 ORDER BY year, month",
        )?;
        let rows = stmt.query_map(params![user_id], target_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Loans ─────────────────────────────────────────────────

    pub(crate) fn insert_loan(&self, loan: &Loan) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO loans (user_id, amount, purpose, status, date_applied, due_date, approved_by, approval_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                loan.user_id,
                loan.amount.to_string(),
                loan.purpose,
                loan.status,
                loan.date_applied,
                loan.due_date,
                loan.approved_by,
                loan.approval_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_loan(&self, id: i64) -> Result<Option<Loan>> {
        Ok(self
            .conn
            .query_row(
                &format!("{LOAN_SELECT} WHERE l.id = ?1"),
                params![id],
                loan_from_row,
            )
            .optional()?)
    }

    /// Loans newest first, optionally narrowed to one owner and/or status.
    pub(crate) fn get_loans(&self, user_id: Option<i64>, status: Option<LoanStatus>) -> Result<Vec<Loan>> {
        let mut sql = format!("{LOAN_SELECT} WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(uid) = user_id {
            sql.push_str(&format!(" AND l.user_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(uid));
        }
        if let Some(s) = status {
            sql.push_str(&format!(" AND l.status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(s));
        }
        sql.push_str(" ORDER BY l.date_applied DESC, l.id DESC");

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), loan_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Move a pending loan to `status`. Returns false when no pending loan
    /// with that id exists, leaving the row untouched.
    pub(crate) fn decide_pending_loan(
        &self,
        id: i64,
        status: LoanStatus,
        approver_id: i64,
        at: NaiveDateTime,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE loans SET status = ?1, approved_by = ?2, approval_date = ?3
             WHERE id = ?4 AND status = 'PENDING'",
            params![status, approver_id, at, id],
        )?;
        Ok(changed == 1)
    }

    /// Count and amount per loan status, one entry for every status.
    pub(crate) fn loan_status_summary(&self) -> Result<Vec<StatusSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT status, COUNT(*), {SUM_AMOUNT} FROM loans GROUP BY status"
        ))?;
        let rows = stmt.query_map([], |row| {
            let total: String = row.get(2)?;
            Ok(StatusSummary {
                status: row.get(0)?,
                count: row.get(1)?,
                total: decimal_from_sql(&total),
            })
        })?;
        let found: Vec<StatusSummary> = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LoanStatus::all()
            .iter()
            .map(|status| {
                found
                    .iter()
                    .find(|s| s.status == *status)
                    .cloned()
                    .unwrap_or(StatusSummary {
                        status: *status,
                        count: 0,
                        total: Decimal::ZERO,
                    })
            })
            .collect())
    }

    // ── Welfare ───────────────────────────────────────────────

    pub(crate) fn insert_welfare(&self, contribution: &WelfareContribution) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO welfare_contributions (user_id, amount, contributed_at) VALUES (?1, ?2, ?3)",
            params![
                contribution.user_id,
                contribution.amount.to_string(),
                contribution.contributed_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Contributions matching `filter`, newest first.
    pub(crate) fn get_welfare(&self, filter: &RecordFilter) -> Result<Vec<WelfareContribution>> {
        let mut sql = String::from(
            "SELECT w.id, w.user_id, u.username, w.amount, w.contributed_at
             FROM welfare_contributions w JOIN users u ON u.id = w.user_id WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        push_filter(&mut sql, &mut param_values, filter, "w.contributed_at");
        sql.push_str(" ORDER BY w.contributed_at DESC, w.id DESC");

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), welfare_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_user_welfare(&self, user_id: i64) -> Result<Vec<WelfareContribution>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.id, w.user_id, u.username, w.amount, w.contributed_at
             FROM welfare_contributions w JOIN users u ON u.id = w.user_id
             WHERE w.user_id = ?1
             ORDER BY w.contributed_at DESC, w.id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], welfare_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn sum_user_welfare(&self, user_id: i64) -> Result<Decimal> {
        let total: String = self.conn.query_row(
            &format!("SELECT {SUM_AMOUNT} FROM welfare_contributions WHERE user_id = ?1"),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(decimal_from_sql(&total))
    }

    pub(crate) fn sum_welfare(&self, filter: &RecordFilter) -> Result<Decimal> {
        self.sum_filtered("welfare_contributions", "contributed_at", filter)
    }

    /// Welfare contributions per calendar month across all members, oldest first.
    pub(crate) fn monthly_welfare(&self) -> Result<Vec<MonthTotal>> {
        self.monthly_totals(
            &format!(
                "SELECT strftime('%Y-%m', contributed_at) AS month, {SUM_AMOUNT}
                 FROM welfare_contributions GROUP BY month ORDER BY month"
            ),
            params![],
        )
    }

    // ── Shared helpers ────────────────────────────────────────

    fn sum_filtered(&self, table: &str, ts_column: &str, filter: &RecordFilter) -> Result<Decimal> {
        let mut sql = format!(
            "SELECT {SUM_AMOUNT} FROM {table} t JOIN users u ON u.id = t.user_id WHERE 1=1"
        );
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        push_filter(&mut sql, &mut param_values, filter, &format!("t.{ts_column}"));

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let total: String = self
            .conn
            .query_row(&sql, params_ref.as_slice(), |row| row.get(0))?;
        Ok(decimal_from_sql(&total))
    }

    fn monthly_totals<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<MonthTotal>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            let month: Option<String> = row.get(0)?;
            let total: String = row.get(1)?;
            Ok((month, total))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (month, total) = row?;
            // Rows whose timestamp SQLite could not read have no month
            if let Some(month) = month.as_deref().and_then(MonthKey::parse_ym) {
                result.push(MonthTotal {
                    month,
                    total: decimal_from_sql(&total),
                });
            }
        }
        Ok(result)
    }
}

const LOAN_SELECT: &str = "SELECT l.id, l.user_id, u.username, l.amount, l.purpose, l.status,
        l.date_applied, l.due_date, l.approved_by, a.username, l.approval_date
     FROM loans l
     JOIN users u ON u.id = l.user_id
     LEFT JOIN users a ON a.id = l.approved_by";

/// Append username-substring and date-range predicates for `ts_column`.
/// Expects the query to join `users u`.
fn push_filter(
    sql: &mut String,
    param_values: &mut Vec<Box<dyn ToSql>>,
    filter: &RecordFilter,
    ts_column: &str,
) {
    if let Some(name) = &filter.username {
        sql.push_str(&format!(
            " AND u.username LIKE ?{} ESCAPE '\\'",
            param_values.len() + 1
        ));
        param_values.push(Box::new(like_pattern(name)));
    }
    if let Some(start) = filter.start {
        sql.push_str(&format!(" AND date({ts_column}) >= ?{}", param_values.len() + 1));
        param_values.push(Box::new(start));
    }
    if let Some(end) = filter.end {
        sql.push_str(&format!(" AND date({ts_column}) <= ?{}", param_values.len() + 1));
        param_values.push(Box::new(end));
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        is_staff: row.get(2)?,
        date_joined: row.get(3)?,
    })
}

fn savings_from_row(row: &Row<'_>) -> rusqlite::Result<Savings> {
    let amount: String = row.get(3)?;
    Ok(Savings {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        username: row.get(2)?,
        amount: decimal_from_sql(&amount),
        saved_at: row.get(4)?,
        description: row.get(5)?,
    })
}

fn target_from_row(row: &Row<'_>) -> rusqlite::Result<SavingsTarget> {
    let amount: String = row.get(4)?;
    Ok(SavingsTarget {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        month: row.get(2)?,
        year: row.get(3)?,
        amount: decimal_from_sql(&amount),
        created_at: row.get(5)?,
    })
}

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    let amount: String = row.get(3)?;
    Ok(Loan {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        username: row.get(2)?,
        amount: decimal_from_sql(&amount),
        purpose: row.get(4)?,
        status: row.get(5)?,
        date_applied: row.get(6)?,
        due_date: row.get(7)?,
        approved_by: row.get(8)?,
        approver_name: row.get(9)?,
        approval_date: row.get(10)?,
    })
}

fn welfare_from_row(row: &Row<'_>) -> rusqlite::Result<WelfareContribution> {
    let amount: String = row.get(3)?;
    Ok(WelfareContribution {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        username: row.get(2)?,
        amount: decimal_from_sql(&amount),
        contributed_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests;
