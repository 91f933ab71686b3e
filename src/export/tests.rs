#![allow(clippy::unwrap_used)]

use chrono::NaiveDateTime;
use rust_decimal_macros::dec;

use super::*;
use crate::error::SaccoError;
use crate::models::Role;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn setup() -> (Database, Actor, Actor) {
    let db = Database::open_in_memory().unwrap();
    let joined = at("2024-01-01 00:00:00");
    let alice = db.insert_user("alice", "x", false, joined).unwrap();
    let admin = db.insert_user("admin", "x", true, joined).unwrap();
    db.insert_savings(&Savings::new(
        alice,
        String::new(),
        dec!(1000),
        "first, deposit".into(),
        at("2024-01-05 09:00:00"),
    ))
    .unwrap();
    db.insert_savings(&Savings::new(
        alice,
        String::new(),
        dec!(250.50),
        String::new(),
        at("2024-02-05 09:00:00"),
    ))
    .unwrap();
    db.insert_welfare(&WelfareContribution::new(
        alice,
        String::new(),
        dec!(50),
        at("2024-02-06 10:00:00"),
    ))
    .unwrap();
    let member = Actor {
        user_id: alice,
        username: "alice".into(),
        role: Role::Member,
    };
    let staff = Actor {
        user_id: admin,
        username: "admin".into(),
        role: Role::Staff,
    };
    (db, member, staff)
}

#[test]
fn test_ledger_parse() {
    assert_eq!(Ledger::parse("Savings"), Some(Ledger::Savings));
    assert_eq!(Ledger::parse("welfare"), Some(Ledger::Welfare));
    assert_eq!(Ledger::parse("loans"), None);
}

#[test]
fn test_export_savings() {
    let (db, _, staff) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("savings.csv");

    let count = export(&db, &staff, Ledger::Savings, &RecordFilter::default(), &path).unwrap();
    assert_eq!(count, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "id,username,amount,timestamp,description");
    assert_eq!(lines[1], "2,alice,250.50,2024-02-05 09:00:00,");
    assert_eq!(lines[2], "1,alice,1000,2024-01-05 09:00:00,\"first, deposit\"");
}

#[test]
fn test_export_welfare_filtered() {
    let (db, _, staff) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("welfare.csv");
    let mut filter = RecordFilter::default();
    filter.set_username("bob");

    let count = export(&db, &staff, Ledger::Welfare, &filter, &path).unwrap();
    assert_eq!(count, 0);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim_end(), "id,username,amount,timestamp");
}

#[test]
fn test_export_needs_staff() {
    let (db, member, _) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("savings.csv");
    assert!(matches!(
        export(&db, &member, Ledger::Savings, &RecordFilter::default(), &path).unwrap_err(),
        SaccoError::Unauthorized
    ));
    assert!(!path.exists());
}

#[test]
fn test_export_unwritable_path_is_validation() {
    let (db, _, admin) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("welfare.csv");
    let err = export(&db, &admin, Ledger::Welfare, &RecordFilter::default(), &path).unwrap_err();
    assert!(matches!(&err, SaccoError::Validation(msg) if msg.starts_with("Cannot write")));
    assert!(err.is_user_facing());
}
