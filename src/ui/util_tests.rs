#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_fits() {
    assert_eq!(truncate("school fees", 20), "school fees");
    assert_eq!(truncate("alice", 5), "alice");
}

#[test]
fn test_truncate_long_purpose() {
    assert_eq!(truncate("boda boda repairs", 9), "boda bod…");
}

#[test]
fn test_truncate_edges() {
    assert_eq!(truncate("", 5), "");
    assert_eq!(truncate("hello", 0), "");
    assert_eq!(truncate("hello", 1), "…");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("Nyumbani ✓✓✓", 10), "Nyumbani …");
}

// ── format_amount ──────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "KES 1,234.56");
}

#[test]
fn test_format_amount_no_commas() {
    assert_eq!(format_amount(dec!(999.99)), "KES 999.99");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "KES 0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-KES 42.50");
}

#[test]
fn test_format_amount_ceiling() {
    assert_eq!(format_amount(dec!(99999999.99)), "KES 99,999,999.99");
}

#[test]
fn test_format_amount_rounds_to_two_decimals() {
    assert_eq!(format_amount(dec!(1.5)), "KES 1.50");
}

// ── ratio / progress_bar ───────────────────────────────────

#[test]
fn test_ratio() {
    assert_eq!(ratio(dec!(250), dec!(1000)), 0.25);
    assert_eq!(ratio(dec!(1500), dec!(1000)), 1.0);
    assert_eq!(ratio(dec!(10), dec!(0)), 0.0);
}

#[test]
fn test_progress_bar() {
    assert_eq!(progress_bar(0.5, 4), "[██░░]");
    assert_eq!(progress_bar(0.0, 3), "[░░░]");
    assert_eq!(progress_bar(2.0, 3), "[███]");
}

// ── scrolling ──────────────────────────────────────────────

#[test]
fn test_scroll_down_moves_window() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!((index, scroll), (5, 3));
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (1, 0);
    scroll_down(&mut index, &mut scroll, 2, 5);
    assert_eq!(index, 1);
}

#[test]
fn test_scroll_up_and_bounds() {
    let (mut index, mut scroll) = (3, 3);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (2, 2));
    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
    scroll_up(&mut index, &mut scroll);
    assert_eq!(index, 0);
}

#[test]
fn test_scroll_to_bottom() {
    let (mut index, mut scroll) = (0, 0);
    scroll_to_bottom(&mut index, &mut scroll, 10, 4);
    assert_eq!((index, scroll), (9, 6));
    scroll_to_bottom(&mut index, &mut scroll, 0, 4);
    assert_eq!(index, 9);
}
