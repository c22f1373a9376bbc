//! Recurring public holidays: fixed dates and floating "nth weekday" rules.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Non-leap reference year used to check that a fixed date exists every year.
const REFERENCE_YEAR: i32 = 2001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How a holiday's date is derived from a year.
pub enum HolidayRule {
    /// Same month and day every year.
    Fixed {
        /// Month, 1-based.
        month: u32,
        /// Day of month.
        day: u32,
    },
    /// The `n`-th occurrence of a weekday in a month, e.g. 3rd Monday of January.
    NthWeekday {
        /// Month, 1-based.
        month: u32,
        /// Ordinal, 1..=4.
        n: u8,
        /// Weekday counted.
        weekday: Weekday,
    },
    /// The last occurrence of a weekday in a month, e.g. last Monday of May.
    LastWeekday {
        /// Month, 1-based.
        month: u32,
        /// Weekday searched for.
        weekday: Weekday,
    },
}

impl HolidayRule {
    /// Fixed month/day rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFixedDate`] when the date does not exist in every year.
    pub fn fixed(month: u32, day: u32) -> Result<Self, ConfigError> {
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
            .map(|_date| HolidayRule::Fixed { month, day })
            .ok_or(ConfigError::InvalidFixedDate { month, day })
    }

    /// Floating "`n`-th weekday of month" rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMonth`] or [`ConfigError::InvalidOrdinal`]; a fifth
    /// occurrence is rejected because it does not exist in every month.
    pub fn nth_weekday(month: u32, n: u8, weekday: Weekday) -> Result<Self, ConfigError> {
        check_month(month)?;
        if !(1..=4).contains(&n) {
            return Err(ConfigError::InvalidOrdinal(n));
        }
        Ok(HolidayRule::NthWeekday { month, n, weekday })
    }

    /// Floating "last weekday of month" rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMonth`] for a month outside 1..=12.
    pub fn last_weekday(month: u32, weekday: Weekday) -> Result<Self, ConfigError> {
        check_month(month)?;
        Ok(HolidayRule::LastWeekday { month, weekday })
    }

    /// Concrete date of the rule in `year`.
    ///
    /// Returns `None` only for years outside the range chrono can represent.
    #[must_use]
    pub fn observed_date(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            HolidayRule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            HolidayRule::NthWeekday { month, n, weekday } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
            }
            HolidayRule::LastWeekday { month, weekday } => {
                let mut date = last_day_of_month(year, month)?;
                while date.weekday() != weekday {
                    date = date.pred_opt()?;
                }
                Some(date)
            }
        }
    }
}

fn check_month(month: u32) -> Result<(), ConfigError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ConfigError::InvalidMonth(month))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    first_of_next_month.pred_opt()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A named recurring holiday.
pub struct Holiday {
    /// Human-readable label, e.g. "Memorial Day".
    pub name: String,
    /// Date rule.
    pub rule: HolidayRule,
}

impl Holiday {
    /// Construct a holiday from its name and rule.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, rule: HolidayRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    /// The holiday as observed in `year`.
    #[must_use]
    pub fn observed(&self, year: i32) -> Option<ObservedHoliday> {
        self.rule.observed_date(year).map(|date| ObservedHoliday {
            name: self.name.clone(),
            date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A holiday pinned to a concrete date.
pub struct ObservedHoliday {
    /// Holiday name.
    pub name: String,
    /// Date it is observed on.
    pub date: NaiveDate,
}

/// Observed dates of `holidays` in `year`, sorted chronologically.
#[must_use]
pub fn holidays_for_year(holidays: &[Holiday], year: i32) -> Vec<ObservedHoliday> {
    let mut observed: Vec<ObservedHoliday> = holidays
        .iter()
        .filter_map(|holiday| holiday.observed(year))
        .collect();
    observed.sort_by(|left, right| left.date.cmp(&right.date).then_with(|| left.name.cmp(&right.name)));
    observed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn last_monday_of_may_lands_on_a_monday_in_may() {
        let rule = HolidayRule::last_weekday(5, Weekday::Mon).expect("valid rule");
        assert_eq!(rule.observed_date(2026), Some(date(2026, 5, 25)));
        assert_eq!(rule.observed_date(2027), Some(date(2027, 5, 31)));
        assert_eq!(rule.observed_date(2024), Some(date(2024, 5, 27)));
    }

    #[test]
    fn last_weekday_handles_february_in_leap_years() {
        let rule = HolidayRule::last_weekday(2, Weekday::Thu).expect("valid rule");
        assert_eq!(rule.observed_date(2024), Some(date(2024, 2, 29)));
        assert_eq!(rule.observed_date(2023), Some(date(2023, 2, 23)));
    }

    #[test]
    fn last_weekday_of_december_does_not_spill_into_january() {
        let rule = HolidayRule::last_weekday(12, Weekday::Wed).expect("valid rule");
        assert_eq!(rule.observed_date(2025), Some(date(2025, 12, 31)));
    }

    #[test]
    fn nth_weekday_counts_from_the_first_of_the_month() {
        let mlk = HolidayRule::nth_weekday(1, 3, Weekday::Mon).expect("valid rule");
        assert_eq!(mlk.observed_date(2025), Some(date(2025, 1, 20)));
        assert_eq!(mlk.observed_date(2024), Some(date(2024, 1, 15)));

        let labor_day = HolidayRule::nth_weekday(9, 1, Weekday::Mon).expect("valid rule");
        assert_eq!(labor_day.observed_date(2025), Some(date(2025, 9, 1)));

        let thanksgiving = HolidayRule::nth_weekday(11, 4, Weekday::Thu).expect("valid rule");
        assert_eq!(thanksgiving.observed_date(2025), Some(date(2025, 11, 27)));
        assert_eq!(thanksgiving.observed_date(2026), Some(date(2026, 11, 26)));
    }

    #[test]
    fn rule_construction_rejects_dates_that_do_not_always_exist() {
        assert!(matches!(
            HolidayRule::fixed(2, 29),
            Err(ConfigError::InvalidFixedDate { month: 2, day: 29 })
        ));
        assert!(matches!(
            HolidayRule::nth_weekday(1, 5, Weekday::Mon),
            Err(ConfigError::InvalidOrdinal(5))
        ));
        assert!(matches!(
            HolidayRule::last_weekday(13, Weekday::Mon),
            Err(ConfigError::InvalidMonth(13))
        ));
    }

    #[test]
    fn holidays_for_year_sorts_chronologically() {
        let holidays = vec![
            Holiday::new("Christmas Day", HolidayRule::Fixed { month: 12, day: 25 }),
            Holiday::new("New Year's Day", HolidayRule::Fixed { month: 1, day: 1 }),
        ];
        let observed = holidays_for_year(&holidays, 2025);
        let names: Vec<&str> = observed.iter().map(|holiday| holiday.name.as_str()).collect();
        assert_eq!(names, ["New Year's Day", "Christmas Day"]);
    }
}
