#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::SaccoError;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// ── Amounts ───────────────────────────────────────────────────

#[test]
fn test_parse_amount_plain() {
    assert_eq!(parse_amount("1000").unwrap(), dec!(1000));
    assert_eq!(parse_amount(" 250.50 ").unwrap(), dec!(250.50));
}

#[test]
fn test_parse_amount_thousands_separator() {
    assert_eq!(parse_amount("1,500.25").unwrap(), dec!(1500.25));
}

#[test]
fn test_parse_amount_rejects_garbage() {
    let err = parse_amount("ten").unwrap_err();
    assert!(matches!(err, SaccoError::Validation(_)));
    assert!(err.to_string().contains("ten"));
}

#[test]
fn test_parse_amount_rejects_empty() {
    assert!(matches!(
        parse_amount("   ").unwrap_err(),
        SaccoError::Validation(_)
    ));
}

#[test]
fn test_check_amount_negative() {
    assert!(check_amount(dec!(-0.01)).is_err());
    assert!(parse_amount("-5").is_err());
}

#[test]
fn test_check_amount_scale() {
    assert!(check_amount(dec!(1.005)).is_err());
    // Trailing zeros don't count as extra precision
    assert_eq!(check_amount(dec!(1.500)).unwrap(), dec!(1.500));
}

#[test]
fn test_check_amount_ceiling() {
    assert_eq!(MAX_AMOUNT, dec!(99999999.99));
    assert!(check_amount(MAX_AMOUNT).is_ok());
    assert!(check_amount(dec!(100000000)).is_err());
}

#[test]
fn test_check_positive_rejects_zero() {
    assert!(check_amount(Decimal::ZERO).is_ok());
    assert!(check_positive(Decimal::ZERO).is_err());
    assert!(check_positive(dec!(0.01)).is_ok());
}

#[test]
fn test_decimal_from_sql_forms() {
    assert_eq!(decimal_from_sql("300.0"), dec!(300));
    assert_eq!(decimal_from_sql("0"), Decimal::ZERO);
    assert_eq!(decimal_from_sql("1.5e+15"), dec!(1500000000000000));
    assert_eq!(decimal_from_sql("garbage"), Decimal::ZERO);
}

// ── MonthKey ──────────────────────────────────────────────────

#[test]
fn test_month_key_label() {
    let jan = MonthKey::new(2024, 1).unwrap();
    assert_eq!(jan.label(), "Jan 2024");
    assert_eq!(jan.long_label(), "January 2024");
    assert_eq!(jan.as_ym(), "2024-01");
    assert_eq!(format!("{jan}"), "Jan 2024");
}

#[test]
fn test_month_key_rejects_bad_month() {
    assert!(MonthKey::new(2024, 0).is_none());
    assert!(MonthKey::new(2024, 13).is_none());
}

#[test]
fn test_month_key_parse_ym() {
    assert_eq!(MonthKey::parse_ym("2023-11"), MonthKey::new(2023, 11));
    assert!(MonthKey::parse_ym("2023").is_none());
    assert!(MonthKey::parse_ym("2023-1x").is_none());
}

#[test]
fn test_month_key_ordering() {
    let dec23 = MonthKey::new(2023, 12).unwrap();
    let jan24 = MonthKey::new(2024, 1).unwrap();
    let feb24 = MonthKey::new(2024, 2).unwrap();
    let mut keys = vec![feb24, dec23, jan24];
    keys.sort();
    assert_eq!(keys, vec![dec23, jan24, feb24]);
}

#[test]
fn test_month_key_of_datetime() {
    let key = MonthKey::of_datetime(at("2024-03-31 23:59:59"));
    assert_eq!(key, MonthKey::new(2024, 3).unwrap());
}

// ── LoanStatus / Loan ─────────────────────────────────────────

#[test]
fn test_loan_status_parse() {
    assert_eq!(LoanStatus::parse("pending"), Some(LoanStatus::Pending));
    assert_eq!(LoanStatus::parse("APPROVED"), Some(LoanStatus::Approved));
    assert_eq!(LoanStatus::parse("Rejected"), Some(LoanStatus::Rejected));
    assert_eq!(LoanStatus::parse("paid"), None);
}

#[test]
fn test_loan_status_roundtrip() {
    for s in LoanStatus::all() {
        assert_eq!(LoanStatus::parse(s.as_str()), Some(*s), "Roundtrip failed for {s}");
    }
}

#[test]
fn test_loan_status_filter() {
    assert_eq!(LoanStatus::parse_filter("all").unwrap(), None);
    assert_eq!(LoanStatus::parse_filter("").unwrap(), None);
    assert_eq!(
        LoanStatus::parse_filter("approved").unwrap(),
        Some(LoanStatus::Approved)
    );
    assert!(LoanStatus::parse_filter("overdue").is_err());
}

#[test]
fn test_only_pending_is_open() {
    assert!(!LoanStatus::Pending.is_terminal());
    assert!(LoanStatus::Approved.is_terminal());
    assert!(LoanStatus::Rejected.is_terminal());
}

#[test]
fn test_decision_outcome() {
    assert_eq!(LoanDecision::Approve.outcome(), LoanStatus::Approved);
    assert_eq!(LoanDecision::Reject.outcome(), LoanStatus::Rejected);
}

#[test]
fn test_new_loan_defaults() {
    let applied = at("2024-01-20 10:30:00");
    let loan = Loan::new(7, "alice".into(), dec!(2500), "school fees".into(), applied);
    assert!(loan.id.is_none());
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.date_applied, applied);
    assert_eq!(loan.due_date, NaiveDate::from_ymd_opt(2024, 2, 19).unwrap());
    assert!(loan.approved_by.is_none());
    assert!(loan.approval_date.is_none());
    assert!(!loan.is_decided());
}

// ── Actor ─────────────────────────────────────────────────────

#[test]
fn test_actor_from_user() {
    let user = User {
        id: 3,
        username: "admin".into(),
        is_staff: true,
        date_joined: at("2024-01-01 00:00:00"),
    };
    let actor = Actor::from(&user);
    assert_eq!(actor.role, Role::Staff);
    assert!(actor.require_staff().is_ok());
}

#[test]
fn test_member_is_not_staff() {
    let actor = Actor {
        user_id: 1,
        username: "alice".into(),
        role: Role::Member,
    };
    assert!(matches!(
        actor.require_staff().unwrap_err(),
        SaccoError::Unauthorized
    ));
}

// ── RecordFilter ──────────────────────────────────────────────

#[test]
fn test_filter_setters() {
    let mut filter = RecordFilter::default();
    assert!(filter.is_empty());

    filter.set_username("  ali ");
    filter.set_start("2024-01-01").unwrap();
    filter.set_end("2024-01-31").unwrap();
    assert_eq!(filter.username.as_deref(), Some("ali"));
    assert_eq!(filter.start, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(
        filter.describe(),
        "member~'ali', from 2024-01-01, to 2024-01-31"
    );

    filter.set_username("");
    filter.set_start("").unwrap();
    assert!(filter.username.is_none());
    assert!(filter.start.is_none());
    assert!(filter.end.is_some());
}

#[test]
fn test_filter_bad_date() {
    let mut filter = RecordFilter::default();
    assert!(matches!(
        filter.set_start("01/02/2024").unwrap_err(),
        SaccoError::Validation(_)
    ));
    assert!(filter.start.is_none());
}

#[test]
fn test_filter_username_only() {
    let mut filter = RecordFilter::default();
    filter.set_username("bob");
    filter.set_end("2024-05-01").unwrap();
    let narrowed = filter.username_only();
    assert_eq!(narrowed.username.as_deref(), Some("bob"));
    assert!(narrowed.end.is_none());
}
