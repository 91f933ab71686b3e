#![allow(clippy::unwrap_used)]

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::SaccoError;
use crate::models::Role;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn member(db: &Database, name: &str) -> Actor {
    let id = db
        .insert_user(name, "x", false, at("2024-01-01 00:00:00"))
        .unwrap();
    Actor {
        user_id: id,
        username: name.into(),
        role: Role::Member,
    }
}

#[test]
fn test_contribute_records_and_instructs() {
    let db = Database::open_in_memory().unwrap();
    let alice = member(&db, "alice");
    let payment = PaymentConfig::default();

    let (savings, instruction) = contribute(
        &db,
        &alice,
        dec!(1000),
        "  January  ",
        &payment,
        at("2024-01-05 09:00:00"),
    )
    .unwrap();

    assert!(savings.id.is_some());
    assert_eq!(savings.description, "January");
    assert_eq!(
        instruction.to_string(),
        "Please complete payment of 1000 KES via M-PESA to Paybill 123456, Account: alice"
    );

    let stored = history(&db, alice.user_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount, dec!(1000));
    assert_eq!(stored[0].saved_at, at("2024-01-05 09:00:00"));
}

#[test]
fn test_instruction_uses_configured_paybill() {
    let payment = PaymentConfig {
        paybill: "555000".into(),
        ..PaymentConfig::default()
    };
    let instruction = PaymentInstruction::new(dec!(250.50), "bob", &payment);
    assert_eq!(
        instruction.to_string(),
        "Please complete payment of 250.50 KES via M-PESA to Paybill 555000, Account: bob"
    );
}

#[test]
fn test_rejected_amount_writes_nothing() {
    let db = Database::open_in_memory().unwrap();
    let alice = member(&db, "alice");
    let payment = PaymentConfig::default();
    let now = at("2024-01-05 09:00:00");

    for bad in [Decimal::ZERO, dec!(-10), dec!(1.001), dec!(100000000)] {
        let err = contribute(&db, &alice, bad, "", &payment, now).unwrap_err();
        assert!(matches!(err, SaccoError::Validation(_)), "{bad} accepted");
    }
    assert!(history(&db, alice.user_id).unwrap().is_empty());
}

#[test]
fn test_total_defaults_to_zero() {
    let db = Database::open_in_memory().unwrap();
    let alice = member(&db, "alice");
    assert_eq!(total_for(&db, alice.user_id).unwrap(), Decimal::ZERO);
}

#[test]
fn test_total_is_all_time() {
    let db = Database::open_in_memory().unwrap();
    let alice = member(&db, "alice");
    let bob = member(&db, "bob");
    let payment = PaymentConfig::default();

    contribute(&db, &alice, dec!(100), "", &payment, at("2023-06-01 10:00:00")).unwrap();
    contribute(&db, &alice, dec!(250.25), "", &payment, at("2024-02-01 10:00:00")).unwrap();
    contribute(&db, &bob, dec!(999), "", &payment, at("2024-02-01 10:00:00")).unwrap();

    assert_eq!(total_for(&db, alice.user_id).unwrap(), dec!(350.25));
}
