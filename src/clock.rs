use chrono::{Local, NaiveDateTime, Timelike};

/// Local wall-clock time at second precision, the resolution records are stored at.
pub(crate) fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
