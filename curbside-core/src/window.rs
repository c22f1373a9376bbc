//! Evening window in which nightly reminders are sent.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};

/// Local hour (24h clock) reminders go out.
pub const REMINDER_HOUR: u32 = 20;

/// Whether `now` falls in the reminder hour, local to `tz`, on an evening that precedes a
/// weekday pickup (Sunday through Thursday).
#[must_use]
pub fn is_reminder_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> bool {
    let local = now.with_timezone(tz);
    let evening_before_pickup = matches!(
        local.weekday(),
        Weekday::Sun | Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
    );
    evening_before_pickup && local.hour() == REMINDER_HOUR
}
