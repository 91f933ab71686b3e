#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn month(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).unwrap()
}

fn target(m: MonthKey, amount: Decimal) -> SavingsTarget {
    SavingsTarget::new(1, m, amount, at("2024-01-01 00:00:00"))
}

fn add_user(db: &Database, name: &str, staff: bool) -> i64 {
    db.insert_user(name, "x", staff, at("2024-01-01 00:00:00"))
        .unwrap()
}

fn save(db: &Database, user_id: i64, amount: Decimal, ts: &str) {
    db.insert_savings(&Savings::new(user_id, String::new(), amount, String::new(), at(ts)))
        .unwrap();
}

#[test]
fn test_align_missing_month_is_zero() {
    let targets = vec![
        target(month(2024, 1), dec!(500)),
        target(month(2024, 2), dec!(600)),
    ];
    let series = vec![MonthTotal {
        month: month(2024, 1),
        total: dec!(300),
    }];

    let chart = align_targets(&targets, &series);
    assert_eq!(chart.labels, vec!["Jan 2024", "Feb 2024"]);
    assert_eq!(chart.savings, vec![300.0, 0.0]);
    assert_eq!(chart.targets, vec![500.0, 600.0]);
}

#[test]
fn test_align_sorts_targets_and_ignores_untargeted_months() {
    let targets = vec![
        target(month(2024, 3), dec!(100)),
        target(month(2023, 12), dec!(50)),
    ];
    let series = vec![
        MonthTotal {
            month: month(2023, 12),
            total: dec!(75.5),
        },
        MonthTotal {
            month: month(2024, 1),
            total: dec!(999),
        },
    ];

    let chart = align_targets(&targets, &series);
    assert_eq!(chart.labels, vec!["Dec 2023", "Mar 2024"]);
    assert_eq!(chart.savings, vec![75.5, 0.0]);
    assert_eq!(chart.targets, vec![50.0, 100.0]);
}

#[test]
fn test_align_empty() {
    assert!(align_targets(&[], &[]).is_empty());
}

#[test]
fn test_chart_points() {
    let series = vec![MonthTotal {
        month: month(2024, 5),
        total: dec!(1200.50),
    }];
    assert_eq!(chart_points(&series), vec![("May 2024".to_string(), 1200.5)]);
}

#[test]
fn test_overview_filters() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice", false);
    let alina = add_user(&db, "alina", false);
    let bob = add_user(&db, "bob", false);

    save(&db, alice, dec!(100), "2024-01-10 09:00:00");
    save(&db, alice, dec!(200), "2024-02-10 09:00:00");
    save(&db, alina, dec!(50), "2024-02-11 09:00:00");
    save(&db, bob, dec!(400), "2024-02-12 09:00:00");

    let mut filter = RecordFilter::default();
    filter.set_username("ali");
    filter.set_start("2024-02-01").unwrap();

    let overview = savings_overview(&db, &filter).unwrap();
    assert_eq!(overview.records.len(), 2);
    assert_eq!(overview.records[0].username, "alina");
    assert_eq!(overview.total, dec!(250));

    // Per-member totals ignore the date range
    assert_eq!(
        overview.per_user,
        vec![
            UserTotal {
                username: "alice".into(),
                total: dec!(300),
            },
            UserTotal {
                username: "alina".into(),
                total: dec!(50),
            },
        ]
    );

    // Monthly series covers everyone
    assert_eq!(
        overview.monthly,
        vec![
            MonthTotal {
                month: month(2024, 1),
                total: dec!(100),
            },
            MonthTotal {
                month: month(2024, 2),
                total: dec!(650),
            },
        ]
    );
}

#[test]
fn test_overview_empty_store() {
    let db = Database::open_in_memory().unwrap();
    let overview = savings_overview(&db, &RecordFilter::default()).unwrap();
    assert!(overview.records.is_empty());
    assert_eq!(overview.total, Decimal::ZERO);
    assert!(overview.per_user.is_empty());
    assert!(overview.monthly.is_empty());
}

#[test]
fn test_member_month_status() {
    let db = Database::open_in_memory().unwrap();
    add_user(&db, "admin", true);
    let alice = add_user(&db, "alice", false);
    let bob = add_user(&db, "bob", false);
    let carol = add_user(&db, "carol", false);
    let feb = month(2024, 2);

    db.upsert_target(&SavingsTarget::new(alice, feb, dec!(500), at("2024-02-01 08:00:00")))
        .unwrap();
    db.upsert_target(&SavingsTarget::new(bob, feb, dec!(500), at("2024-02-01 08:00:00")))
        .unwrap();
    save(&db, alice, dec!(500), "2024-02-03 09:00:00");
    save(&db, bob, dec!(100), "2024-02-03 09:00:00");
    save(&db, bob, dec!(900), "2024-01-03 09:00:00");
    save(&db, carol, dec!(50), "2024-02-03 09:00:00");

    let today = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
    let status = member_month_status(&db, today).unwrap();
    let names: Vec<&str> = status.iter().map(|s| s.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);

    assert!(status[0].met_target);
    assert_eq!(status[1].saved, dec!(100));
    assert!(!status[1].met_target);
    // No target set: never counts as met
    assert_eq!(status[2].target, Decimal::ZERO);
    assert!(!status[2].met_target);
}
