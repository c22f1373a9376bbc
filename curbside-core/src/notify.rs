//! Decides whether a subscriber should be reminded tonight.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{ISO_DATE_FORMAT, ResolvedCollection, ZoneId, weekday_name};
use crate::resolver::{ResolveError, Resolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Whether tomorrow is the zone's effective collection day.
pub struct NotificationDecision {
    /// True when a reminder should go out tonight.
    pub notify: bool,
    /// Tomorrow in `YYYY-MM-DD` form.
    pub tomorrow_iso: String,
    /// Holiday note for the week, if collection moved.
    pub note: Option<String>,
    /// Resolution of tomorrow's week.
    pub resolved: ResolvedCollection,
}

impl NotificationDecision {
    /// Weekday name of tomorrow's collection, for message bodies.
    #[must_use]
    pub fn collection_weekday(&self) -> &'static str {
        weekday_name(self.resolved.effective_day)
    }
}

/// Decide whether `zone` collects tomorrow, given `today`.
///
/// Compares tomorrow against the holiday-adjusted collection date of its week, so a holiday
/// can both create a reminder (collection moved onto tomorrow) and cancel one (collection
/// moved away from a nominal tomorrow).
///
/// # Errors
///
/// Returns a [`ResolveError`] for an unknown zone or a date at the calendar's limits.
pub fn should_notify(
    resolver: &Resolver,
    zone: &ZoneId,
    today: NaiveDate,
) -> Result<NotificationDecision, ResolveError> {
    let tomorrow = today
        .succ_opt()
        .ok_or(ResolveError::DateOutOfRange(today))?;
    let resolved = resolver.resolve(tomorrow, zone)?;

    Ok(NotificationDecision {
        notify: resolved.effective_date == tomorrow,
        tomorrow_iso: tomorrow.format(ISO_DATE_FORMAT).to_string(),
        note: resolved.holiday_note.clone(),
        resolved,
    })
}
