#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn add_user(db: &Database, name: &str, staff: bool) -> i64 {
    db.insert_user(name, "hash", staff, at("2024-01-01 08:00:00"))
        .unwrap()
}

fn add_savings(db: &Database, user_id: i64, amount: Decimal, ts: &str) -> i64 {
    let savings = Savings::new(user_id, String::new(), amount, String::new(), at(ts));
    db.insert_savings(&savings).unwrap()
}

fn add_welfare(db: &Database, user_id: i64, amount: Decimal, ts: &str) -> i64 {
    let contribution = WelfareContribution::new(user_id, String::new(), amount, at(ts));
    db.insert_welfare(&contribution).unwrap()
}

fn month(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).unwrap()
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sacco.db");
    {
        let db = Database::open(&path).unwrap();
        add_user(&db, "alice", false);
    }
    let db = Database::open(&path).unwrap();
    assert!(db.get_user_by_username("alice").unwrap().is_some());
}

// ── Users ─────────────────────────────────────────────────────

#[test]
fn test_user_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = add_user(&db, "alice", false);

    let user = db.get_user_by_id(id).unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert!(!user.is_staff);
    assert_eq!(user.date_joined, at("2024-01-01 08:00:00"));

    let (by_name, hash) = db.get_credentials("alice").unwrap().unwrap();
    assert_eq!(by_name.id, id);
    assert_eq!(hash, "hash");
}

#[test]
fn test_user_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_user_by_id(42).unwrap().is_none());
    assert!(db.get_user_by_username("ghost").unwrap().is_none());
    assert!(db.get_credentials("ghost").unwrap().is_none());
}

#[test]
fn test_duplicate_username_rejected_by_store() {
    let db = Database::open_in_memory().unwrap();
    add_user(&db, "alice", false);
    assert!(db.insert_user("alice", "other", false, at("2024-01-02 00:00:00")).is_err());
}

#[test]
fn test_staff_and_members() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.count_staff().unwrap(), 0);
    let admin = add_user(&db, "admin", true);
    add_user(&db, "zed", false);
    let bob = add_user(&db, "bob", false);
    assert_eq!(db.count_staff().unwrap(), 1);

    let members: Vec<String> = db.get_members().unwrap().into_iter().map(|u| u.username).collect();
    assert_eq!(members, vec!["bob", "zed"]);

    db.set_staff(bob, true).unwrap();
    assert_eq!(db.count_staff().unwrap(), 2);
    assert!(db.get_user_by_id(admin).unwrap().unwrap().is_staff);
    assert_eq!(db.get_members().unwrap().len(), 1);
}

// ── Savings ───────────────────────────────────────────────────

#[test]
fn test_savings_roundtrip_and_order() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    add_savings(&db, alice, dec!(100.50), "2024-01-05 09:00:00");
    add_savings(&db, alice, dec!(200), "2024-02-05 09:00:00");

    let rows = db.get_user_savings(alice).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].amount, dec!(200));
    assert_eq!(rows[0].username, "alice");
    assert_eq!(rows[1].amount, dec!(100.50));
    assert_eq!(rows[1].saved_at, at("2024-01-05 09:00:00"));
}

#[test]
fn test_sum_user_savings_defaults_to_zero() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    assert_eq!(db.sum_user_savings(alice, None).unwrap(), Decimal::ZERO);
    assert_eq!(
        db.sum_user_savings(alice, Some(month(2024, 1))).unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn test_sum_user_savings_by_month() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    add_savings(&db, alice, dec!(0.10), "2024-01-01 00:00:00");
    add_savings(&db, alice, dec!(0.20), "2024-01-31 23:59:59");
    add_savings(&db, alice, dec!(500), "2024-02-01 00:00:00");
    add_savings(&db, bob, dec!(999), "2024-01-15 12:00:00");

    assert_eq!(db.sum_user_savings(alice, Some(month(2024, 1))).unwrap(), dec!(0.30));
    assert_eq!(db.sum_user_savings(alice, Some(month(2024, 2))).unwrap(), dec!(500));
    assert_eq!(db.sum_user_savings(alice, None).unwrap(), dec!(500.30));
}

#[test]
fn test_sum_user_savings_keeps_cents_on_large_totals() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    add_savings(&db, alice, dec!(6000000000000.01), "2024-01-02 00:00:00");
    add_savings(&db, alice, dec!(6000000000000.02), "2024-01-03 00:00:00");

    assert_eq!(db.sum_user_savings(alice, None).unwrap(), dec!(12000000000000.03));
    assert_eq!(
        db.sum_user_savings(alice, Some(month(2024, 1))).unwrap(),
        dec!(12000000000000.03)
    );
}

#[test]
fn test_savings_filter_username_substring() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let alicia = add_user(&db, "Alicia", false);
    let bob = add_user(&db, "bob", false);
    add_savings(&db, alice, dec!(10), "2024-01-05 09:00:00");
    add_savings(&db, alicia, dec!(20), "2024-01-06 09:00:00");
    add_savings(&db, bob, dec!(40), "2024-01-07 09:00:00");

    let mut filter = RecordFilter::default();
    filter.set_username("ALI");
    let rows = db.get_savings(&filter).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|s| s.username.to_lowercase().starts_with("ali")));
    assert_eq!(db.sum_savings(&filter).unwrap(), dec!(30));
}

#[test]
fn test_savings_filter_escapes_wildcards() {
    let db = Database::open_in_memory().unwrap();
    let a = add_user(&db, "a_b", false);
    let b = add_user(&db, "axb", false);
    add_savings(&db, a, dec!(1), "2024-01-05 09:00:00");
    add_savings(&db, b, dec!(2), "2024-01-05 09:00:00");

    let mut filter = RecordFilter::default();
    filter.set_username("a_b");
    let rows = db.get_savings(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "a_b");
}

#[test]
fn test_savings_filter_date_range_inclusive() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    add_savings(&db, alice, dec!(1), "2024-01-31 23:00:00");
    add_savings(&db, alice, dec!(2), "2024-02-01 00:00:00");
    add_savings(&db, alice, dec!(4), "2024-02-29 23:59:59");
    add_savings(&db, alice, dec!(8), "2024-03-01 00:00:00");

    let filter = RecordFilter {
        username: None,
        start: NaiveDate::from_ymd_opt(2024, 2, 1),
        end: NaiveDate::from_ymd_opt(2024, 2, 29),
    };
    let rows = db.get_savings(&filter).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(db.sum_savings(&filter).unwrap(), dec!(6));
}

#[test]
fn test_savings_per_user_descending() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    let carol = add_user(&db, "carol", false);
    add_savings(&db, alice, dec!(100), "2024-01-05 09:00:00");
    add_savings(&db, bob, dec!(300), "2024-01-05 09:00:00");
    add_savings(&db, alice, dec!(50), "2024-02-05 09:00:00");
    add_savings(&db, carol, dec!(10), "2024-02-05 09:00:00");

    let totals = db.savings_per_user(&RecordFilter::default()).unwrap();
    let names: Vec<&str> = totals.iter().map(|t| t.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "alice", "carol"]);
    assert_eq!(totals[1].total, dec!(150));
}

#[test]
fn test_monthly_savings_series() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    add_savings(&db, alice, dec!(50), "2024-02-10 09:00:00");
    add_savings(&db, alice, dec!(100), "2024-01-05 09:00:00");
    add_savings(&db, alice, dec!(200), "2024-01-20 09:00:00");
    add_savings(&db, bob, dec!(25), "2023-12-24 09:00:00");

    let mine = db.monthly_savings(Some(alice)).unwrap();
    assert_eq!(
        mine,
        vec![
            MonthTotal { month: month(2024, 1), total: dec!(300) },
            MonthTotal { month: month(2024, 2), total: dec!(50) },
        ]
    );

    let everyone = db.monthly_savings(None).unwrap();
    assert_eq!(everyone.len(), 3);
    assert_eq!(everyone[0].month, month(2023, 12));
}

// ── Targets ───────────────────────────────────────────────────

#[test]
fn test_target_upsert_keeps_one_row() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let jan = month(2024, 1);

    db.upsert_target(&SavingsTarget::new(alice, jan, dec!(500), at("2024-01-02 00:00:00")))
        .unwrap();
    db.upsert_target(&SavingsTarget::new(alice, jan, dec!(750), at("2024-01-09 00:00:00")))
        .unwrap();

    let targets = db.get_targets(alice).unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].amount, dec!(750));
    // Creation time is kept across updates
    assert_eq!(targets[0].created_at, at("2024-01-02 00:00:00"));
    assert_eq!(db.get_target(alice, jan).unwrap().unwrap().amount, dec!(750));
}

#[test]
fn test_targets_are_per_user_and_month() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    let ts = at("2024-01-02 00:00:00");

    db.upsert_target(&SavingsTarget::new(alice, month(2024, 2), dec!(600), ts)).unwrap();
    db.upsert_target(&SavingsTarget::new(alice, month(2023, 12), dec!(400), ts)).unwrap();
    db.upsert_target(&SavingsTarget::new(alice, month(2024, 1), dec!(500), ts)).unwrap();
    db.upsert_target(&SavingsTarget::new(bob, month(2024, 1), dec!(100), ts)).unwrap();

    let months: Vec<MonthKey> = db
        .get_targets(alice)
        .unwrap()
        .iter()
        .map(|t| t.month_key())
        .collect();
    assert_eq!(months, vec![month(2023, 12), month(2024, 1), month(2024, 2)]);
    assert!(db.get_target(bob, month(2024, 2)).unwrap().is_none());
}

// ── Loans ─────────────────────────────────────────────────────

#[test]
fn test_loan_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let loan = Loan::new(alice, String::new(), dec!(2500), "school fees".into(), at("2024-01-20 10:00:00"));
    let id = db.insert_loan(&loan).unwrap();

    let stored = db.get_loan(id).unwrap().unwrap();
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.amount, dec!(2500));
    assert_eq!(stored.status, LoanStatus::Pending);
    assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2024, 2, 19).unwrap());
    assert!(stored.approved_by.is_none());
    assert!(stored.approver_name.is_none());
    assert!(stored.approval_date.is_none());
}

#[test]
fn test_get_loan_missing() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_loan(7).unwrap().is_none());
}

#[test]
fn test_decide_pending_loan_only_once() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let admin = add_user(&db, "admin", true);
    let id = db
        .insert_loan(&Loan::new(alice, String::new(), dec!(100), "rent".into(), at("2024-01-20 10:00:00")))
        .unwrap();

    let when = at("2024-01-21 09:30:00");
    assert!(db.decide_pending_loan(id, LoanStatus::Approved, admin, when).unwrap());
    assert!(!db
        .decide_pending_loan(id, LoanStatus::Rejected, admin, at("2024-01-22 09:30:00"))
        .unwrap());
    assert!(!db.decide_pending_loan(999, LoanStatus::Rejected, admin, when).unwrap());

    let stored = db.get_loan(id).unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Approved);
    assert_eq!(stored.approved_by, Some(admin));
    assert_eq!(stored.approver_name.as_deref(), Some("admin"));
    assert_eq!(stored.approval_date, Some(when));
}

#[test]
fn test_get_loans_filters() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    let admin = add_user(&db, "admin", true);
    let first = db
        .insert_loan(&Loan::new(alice, String::new(), dec!(100), "a".into(), at("2024-01-01 10:00:00")))
        .unwrap();
    let second = db
        .insert_loan(&Loan::new(alice, String::new(), dec!(200), "b".into(), at("2024-01-02 10:00:00")))
        .unwrap();
    db.insert_loan(&Loan::new(bob, String::new(), dec!(300), "c".into(), at("2024-01-03 10:00:00")))
        .unwrap();
    db.decide_pending_loan(first, LoanStatus::Approved, admin, at("2024-01-04 10:00:00"))
        .unwrap();

    let all = db.get_loans(None, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].username, "bob");

    let alices: Vec<i64> = db
        .get_loans(Some(alice), None)
        .unwrap()
        .iter()
        .filter_map(|l| l.id)
        .collect();
    assert_eq!(alices, vec![second, first]);

    let approved = db.get_loans(Some(alice), Some(LoanStatus::Approved)).unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, Some(first));

    assert_eq!(db.get_loans(None, Some(LoanStatus::Pending)).unwrap().len(), 2);
    assert!(db.get_loans(Some(bob), Some(LoanStatus::Rejected)).unwrap().is_empty());
}

#[test]
fn test_loan_status_summary_zero_filled() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    db.insert_loan(&Loan::new(alice, String::new(), dec!(100), "a".into(), at("2024-01-01 10:00:00")))
        .unwrap();
    db.insert_loan(&Loan::new(alice, String::new(), dec!(250.50), "b".into(), at("2024-01-02 10:00:00")))
        .unwrap();

    let summary = db.loan_status_summary().unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].status, LoanStatus::Pending);
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].total, dec!(350.50));
    assert_eq!(summary[1].count, 0);
    assert_eq!(summary[2].total, Decimal::ZERO);
}

// ── Welfare ───────────────────────────────────────────────────

#[test]
fn test_welfare_queries() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    add_welfare(&db, alice, dec!(200), "2024-01-10 10:00:00");
    add_welfare(&db, alice, dec!(200), "2024-02-10 10:00:00");
    add_welfare(&db, bob, dec!(150), "2024-02-11 10:00:00");

    assert_eq!(db.sum_user_welfare(alice).unwrap(), dec!(400));
    let history = db.get_user_welfare(alice).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].contributed_at, at("2024-02-10 10:00:00"));

    let mut filter = RecordFilter::default();
    filter.set_start("2024-02-01").unwrap();
    assert_eq!(db.get_welfare(&filter).unwrap().len(), 2);
    assert_eq!(db.sum_welfare(&filter).unwrap(), dec!(350));
    filter.set_username("bo");
    assert_eq!(db.sum_welfare(&filter).unwrap(), dec!(150));

    let monthly = db.monthly_welfare().unwrap();
    assert_eq!(
        monthly,
        vec![
            MonthTotal { month: month(2024, 1), total: dec!(200) },
            MonthTotal { month: month(2024, 2), total: dec!(350) },
        ]
    );
}

#[test]
fn test_welfare_empty_sums() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    assert_eq!(db.sum_user_welfare(alice).unwrap(), Decimal::ZERO);
    assert_eq!(db.sum_welfare(&RecordFilter::default()).unwrap(), Decimal::ZERO);
    assert!(db.monthly_welfare().unwrap().is_empty());
}

#[test]
fn test_like_pattern() {
    assert_eq!(like_pattern("ann"), "%ann%");
    assert_eq!(like_pattern("50%_"), "%50\\%\\_%");
}

#[test]
fn test_unreadable_amount_counts_as_zero() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    add_savings(&db, alice, dec!(250), "2024-01-02 00:00:00");
    let bad = add_savings(&db, alice, dec!(100), "2024-01-03 00:00:00");
    db.conn
        .execute("UPDATE savings SET amount = 'n/a' WHERE id = ?1", params![bad])
        .unwrap();

    assert_eq!(db.sum_user_savings(alice, None).unwrap(), dec!(250));
    let rows = db.get_user_savings(alice).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].amount, Decimal::ZERO);
}
