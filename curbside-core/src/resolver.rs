//! Holiday-aware resolution of the collection day for a zone and date.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, ParseError as ChronoParseError, Weekday};
use tracing::{debug, info};

use crate::config::CollectionConfig;
use crate::holiday::ObservedHoliday;
use crate::model::{ISO_DATE_FORMAT, ResolvedCollection, ZoneId};
use crate::shift::ShiftDecision;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while resolving a collection day.
pub enum ResolveError {
    /// Input is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {input}")]
    InvalidDate {
        /// Text as received.
        input: String,
        /// Underlying parser error.
        #[source]
        source: ChronoParseError,
    },
    /// The zone is not part of the configuration.
    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneId),
    /// The date sits at the edge of the representable calendar.
    #[error("Date out of range: {0}")]
    DateOutOfRange(NaiveDate),
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidDate`] for anything else; there is no fallback to today.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, ResolveError> {
    NaiveDate::parse_from_str(input.trim(), ISO_DATE_FORMAT).map_err(|source| {
        ResolveError::InvalidDate {
            input: input.to_owned(),
            source,
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A Monday-to-Sunday calendar week.
pub struct CollectionWeek {
    days: [NaiveDate; 7],
}

impl CollectionWeek {
    /// The week containing `date`, or `None` when part of it is outside chrono's calendar.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_days(Days::new(offset))?;
        let after = |days: u64| monday.checked_add_days(Days::new(days));
        Some(Self {
            days: [
                monday,
                after(1)?,
                after(2)?,
                after(3)?,
                after(4)?,
                after(5)?,
                after(6)?,
            ],
        })
    }

    /// Monday of the week.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        let [monday, ..] = self.days;
        monday
    }

    /// Sunday of the week.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        let [.., sunday] = self.days;
        sunday
    }

    /// Whether `date` falls inside the week.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start()..=self.end()).contains(&date)
    }

    /// Calendar date of `weekday` in this week.
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> NaiveDate {
        let [mon, tue, wed, thu, fri, sat, sun] = self.days;
        match weekday {
            Weekday::Mon => mon,
            Weekday::Tue => tue,
            Weekday::Wed => wed,
            Weekday::Thu => thu,
            Weekday::Fri => fri,
            Weekday::Sat => sat,
            Weekday::Sun => sun,
        }
    }
}

/// Resolves effective collection days against a shared configuration.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<CollectionConfig>,
}

impl Resolver {
    /// Create a resolver bound to the provided configuration.
    #[must_use]
    pub fn new(config: Arc<CollectionConfig>) -> Self {
        Self { config }
    }

    /// Configuration the resolver works against.
    #[must_use]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Holidays observed in the week, sorted by date.
    ///
    /// Both years a week touches are consulted, so a week straddling New Year sees
    /// holidays on either side.
    #[must_use]
    pub fn holidays_in_week(&self, week: &CollectionWeek) -> Vec<ObservedHoliday> {
        let first_year = week.start().year();
        let last_year = week.end().year();

        let mut holidays: Vec<ObservedHoliday> = (first_year..=last_year)
            .flat_map(|year| self.config.holidays_for_year(year))
            .filter(|holiday| week.contains(holiday.date))
            .collect();
        holidays.sort_by_key(|holiday| holiday.date);
        holidays
    }

    /// Resolve the effective collection day of `zone_id` for the week containing `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownZone`] when the zone is not configured and
    /// [`ResolveError::DateOutOfRange`] at the calendar's outer limits.
    pub fn resolve(
        &self,
        date: NaiveDate,
        zone_id: &ZoneId,
    ) -> Result<ResolvedCollection, ResolveError> {
        let zone = self
            .config
            .zone(zone_id)
            .ok_or_else(|| ResolveError::UnknownZone(zone_id.clone()))?;
        let week = CollectionWeek::containing(date).ok_or(ResolveError::DateOutOfRange(date))?;

        let holidays = self.holidays_in_week(&week);
        let shifts = self.config.shifts();

        let decision = match shifts.governing_holiday(&holidays, &zone.id) {
            Some(governing) => {
                let disruptive = holidays
                    .iter()
                    .filter(|holiday| shifts.disrupts(holiday, &zone.id))
                    .count();
                if disruptive > 1 {
                    info!(
                        zone = %zone.id,
                        week_start = %week.start(),
                        governing = %governing.name,
                        holidays = disruptive,
                        "several holidays in one week, earliest governs"
                    );
                }
                shifts.shift_for(governing, zone)
            }
            None => ShiftDecision::unchanged(),
        };

        let effective_day = decision
            .new_weekday
            .filter(|_weekday| decision.shifted)
            .unwrap_or(zone.nominal_day);
        let holiday_note = decision.shifted.then_some(decision.note_text);

        debug!(
            %date,
            zone = %zone.id,
            nominal = ?zone.nominal_day,
            effective = ?effective_day,
            shifted = holiday_note.is_some(),
            "resolved collection day"
        );

        Ok(ResolvedCollection {
            date,
            zone: zone.id.clone(),
            nominal_day: zone.nominal_day,
            effective_day,
            effective_date: week.day(effective_day),
            holiday_note,
        })
    }

    /// Resolve from a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidDate`] for malformed input, otherwise as [`Resolver::resolve`].
    pub fn resolve_iso(
        &self,
        iso_date: &str,
        zone_id: &ZoneId,
    ) -> Result<ResolvedCollection, ResolveError> {
        let date = parse_iso_date(iso_date)?;
        self.resolve(date, zone_id)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::holiday::{Holiday, HolidayRule};
    use crate::model::Zone;
    use crate::shift::ShiftTable;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|_poisoned| io::Error::other("log buffer poisoned"))?
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn resolver() -> Resolver {
        let holidays = vec![
            Holiday::new("New Year's Day", HolidayRule::Fixed { month: 1, day: 1 }),
            Holiday::new("Christmas Day", HolidayRule::Fixed { month: 12, day: 25 }),
            Holiday::new("Boxing Day", HolidayRule::Fixed { month: 12, day: 26 }),
        ];
        let zones = vec![Zone::new("North", Weekday::Mon), Zone::new("South", Weekday::Fri)];
        let shifts = ShiftTable::new()
            .with_chart(ZoneId::new("North"), [(Weekday::Mon, Weekday::Tue)])
            .with_chart(
                ZoneId::new("South"),
                [(Weekday::Thu, Weekday::Wed), (Weekday::Fri, Weekday::Thu)],
            );
        let config = CollectionConfig::new(holidays, zones, shifts).expect("valid configuration");
        Resolver::new(Arc::new(config))
    }

    #[test]
    fn week_is_monday_based() {
        let week = CollectionWeek::containing(date(2025, 12, 28)).expect("representable");
        assert_eq!(week.start(), date(2025, 12, 22));
        assert_eq!(week.end(), date(2025, 12, 28));
        assert_eq!(week.day(Weekday::Wed), date(2025, 12, 24));
    }

    #[test]
    fn quiet_week_keeps_nominal_day() {
        let resolved = resolver()
            .resolve(date(2025, 3, 12), &ZoneId::new("North"))
            .expect("known zone");
        assert_eq!(resolved.effective_day, Weekday::Mon);
        assert_eq!(resolved.effective_date, date(2025, 3, 10));
        assert_eq!(resolved.holiday_note, None);
    }

    #[test]
    fn earliest_holiday_governs_and_shifts_do_not_compound() {
        // Christmas (Thu) and Boxing Day (Fri) 2025 share a week; Boxing Day alone would
        // move South to Thursday.
        let resolved = resolver()
            .resolve(date(2025, 12, 22), &ZoneId::new("South"))
            .expect("known zone");
        assert_eq!(resolved.effective_day, Weekday::Wed);
        assert_eq!(resolved.effective_date, date(2025, 12, 24));
        assert_eq!(
            resolved.holiday_note.as_deref(),
            Some("Christmas Day: collection on Wednesday.")
        );
    }

    #[test]
    fn several_holidays_in_a_week_log_the_governing_one() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer_buffer = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogBuffer(Arc::clone(&writer_buffer)))
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();

        let resolved = tracing::subscriber::with_default(subscriber, || {
            resolver().resolve(date(2025, 12, 23), &ZoneId::new("South"))
        })
        .expect("known zone");
        assert_eq!(resolved.effective_day, Weekday::Wed);

        let logged = String::from_utf8(buffer.lock().expect("lock not poisoned").clone())
            .expect("log output is UTF-8");
        assert!(logged.contains("earliest governs"), "{logged}");
        assert!(logged.contains("governing=Christmas Day"), "{logged}");
        assert!(logged.contains("holidays=2"), "{logged}");
        assert!(logged.contains("week_start=2025-12-22"), "{logged}");
    }

    #[test]
    fn single_holiday_weeks_log_no_cascade() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer_buffer = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogBuffer(Arc::clone(&writer_buffer)))
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            resolver().resolve(date(2025, 12, 29), &ZoneId::new("South"))
        })
        .expect("known zone");

        let logged = buffer.lock().expect("lock not poisoned");
        assert!(logged.is_empty());
    }

    #[test]
    fn week_straddling_new_year_sees_next_year_holidays() {
        // 2026-01-01 is a Thursday; its week begins on 2025-12-29.
        let resolved = resolver()
            .resolve(date(2025, 12, 29), &ZoneId::new("South"))
            .expect("known zone");
        assert_eq!(resolved.effective_day, Weekday::Wed);
        assert_eq!(resolved.effective_date, date(2025, 12, 31));
        assert_eq!(
            resolved.holiday_note.as_deref(),
            Some("New Year's Day: collection on Wednesday.")
        );
    }

    #[test]
    fn week_days_run_monday_to_sunday_across_month_ends() {
        let week = CollectionWeek::containing(date(2026, 1, 1)).expect("representable");
        assert_eq!(week.day(Weekday::Mon), date(2025, 12, 29));
        assert_eq!(week.day(Weekday::Thu), date(2026, 1, 1));
        assert_eq!(week.day(Weekday::Sun), date(2026, 1, 4));
        assert!(week.contains(date(2025, 12, 31)));
        assert!(!week.contains(date(2026, 1, 5)));
    }

    #[test]
    fn holidays_in_week_collects_across_year_boundary() {
        let week = CollectionWeek::containing(date(2025, 12, 31)).expect("representable");
        let names: Vec<String> = resolver()
            .holidays_in_week(&week)
            .into_iter()
            .map(|holiday| holiday.name)
            .collect();
        assert_eq!(names, ["New Year's Day"]);
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let result = resolver().resolve(date(2025, 3, 12), &ZoneId::new("Zone 9"));
        assert_eq!(result, Err(ResolveError::UnknownZone(ZoneId::new("Zone 9"))));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for input in ["2025-13-01", "2025-02-30", "next thursday", ""] {
            let result = resolver().resolve_iso(input, &ZoneId::new("North"));
            assert!(
                matches!(result, Err(ResolveError::InvalidDate { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = resolver();
        let zone = ZoneId::new("South");
        let first = resolver.resolve(date(2025, 12, 24), &zone).expect("known zone");
        let second = resolver.resolve(date(2025, 12, 24), &zone).expect("known zone");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("serializable"),
            serde_json::to_string(&second).expect("serializable")
        );
    }
}
