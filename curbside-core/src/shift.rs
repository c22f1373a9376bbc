//! Declarative rules describing how holidays move collection within a week.

use std::collections::HashMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::holiday::ObservedHoliday;
use crate::model::{Zone, ZoneId, is_weekend, weekday_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// What a holiday does to a zone's collection.
pub enum ShiftPolicy {
    /// Collection stays on the nominal day.
    NoChange,
    /// Collection moves to this weekday of the same week.
    MoveTo(Weekday),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShiftOverride {
    holiday: String,
    zone: ZoneId,
    policy: ShiftPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of applying the shift rules to one holiday and zone.
pub struct ShiftDecision {
    /// Whether collection moved off the nominal day.
    pub shifted: bool,
    /// Weekday collection moved to.
    pub new_weekday: Option<Weekday>,
    /// Message-ready note; empty when nothing moved.
    pub note_text: String,
}

impl ShiftDecision {
    /// Decision that leaves collection untouched.
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            shifted: false,
            new_weekday: None,
            note_text: String::new(),
        }
    }

    fn moved(holiday: &ObservedHoliday, weekday: Weekday) -> Self {
        Self {
            shifted: true,
            new_weekday: Some(weekday),
            note_text: holiday_note(&holiday.name, weekday),
        }
    }
}

/// Note substituted into outbound message templates.
///
/// Always a single sentence ending in the weekday name and a period.
#[must_use]
pub fn holiday_note(holiday_name: &str, weekday: Weekday) -> String {
    format!("{holiday_name}: collection on {}.", weekday_name(weekday))
}

/// Per-zone charts keyed by the weekday a holiday falls on, plus per-holiday overrides.
///
/// A chart entry maps "holiday on weekday X" to "this zone collects on weekday Y".
/// Overrides, keyed by holiday name and zone, win over the chart.
#[derive(Debug, Clone, Default)]
pub struct ShiftTable {
    charts: HashMap<ZoneId, HashMap<Weekday, Weekday>>,
    overrides: Vec<ShiftOverride>,
}

impl ShiftTable {
    /// Empty table: no holiday moves anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) the chart of `zone`.
    #[must_use]
    pub fn with_chart<I>(mut self, zone: ZoneId, entries: I) -> Self
    where
        I: IntoIterator<Item = (Weekday, Weekday)>,
    {
        self.charts.entry(zone).or_default().extend(entries);
        self
    }

    /// Pin the policy for one named holiday in one zone.
    #[must_use]
    pub fn with_override<S: Into<String>>(
        mut self,
        holiday: S,
        zone: ZoneId,
        policy: ShiftPolicy,
    ) -> Self {
        self.overrides.push(ShiftOverride {
            holiday: holiday.into(),
            zone,
            policy,
        });
        self
    }

    /// Every zone mentioned by a chart or an override.
    pub fn zone_ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.charts
            .keys()
            .chain(self.overrides.iter().map(|entry| &entry.zone))
    }

    /// Every weekday a chart entry or override moves collection to, with its zone.
    pub fn targets(&self) -> impl Iterator<Item = (&ZoneId, Weekday)> {
        let charted = self
            .charts
            .iter()
            .flat_map(|(zone, chart)| chart.values().map(move |target| (zone, *target)));
        let overridden = self.overrides.iter().filter_map(|entry| match entry.policy {
            ShiftPolicy::MoveTo(target) => Some((&entry.zone, target)),
            ShiftPolicy::NoChange => None,
        });
        charted.chain(overridden)
    }

    fn override_for(&self, holiday: &ObservedHoliday, zone: &ZoneId) -> Option<ShiftPolicy> {
        self.overrides
            .iter()
            .find(|entry| entry.holiday == holiday.name && &entry.zone == zone)
            .map(|entry| entry.policy)
    }

    /// Policy of `holiday` for `zone`, before comparing against the nominal day.
    #[must_use]
    pub fn policy_for(&self, holiday: &ObservedHoliday, zone: &ZoneId) -> ShiftPolicy {
        if let Some(policy) = self.override_for(holiday, zone) {
            return policy;
        }

        let weekday = holiday.date.weekday();
        if is_weekend(weekday) {
            return ShiftPolicy::NoChange;
        }

        self.charts
            .get(zone)
            .and_then(|chart| chart.get(&weekday))
            .map_or(ShiftPolicy::NoChange, |target| ShiftPolicy::MoveTo(*target))
    }

    /// Apply the rules of a single holiday to `zone`.
    ///
    /// A move onto the nominal day counts as no change and carries no note.
    #[must_use]
    pub fn shift_for(&self, holiday: &ObservedHoliday, zone: &Zone) -> ShiftDecision {
        match self.policy_for(holiday, &zone.id) {
            ShiftPolicy::MoveTo(target) if target != zone.nominal_day => {
                ShiftDecision::moved(holiday, target)
            }
            ShiftPolicy::MoveTo(_) | ShiftPolicy::NoChange => ShiftDecision::unchanged(),
        }
    }

    /// Whether `holiday` disrupts the collection week of `zone` at all.
    ///
    /// Weekend holidays only count when an override names them.
    #[must_use]
    pub fn disrupts(&self, holiday: &ObservedHoliday, zone: &ZoneId) -> bool {
        !is_weekend(holiday.date.weekday()) || self.override_for(holiday, zone).is_some()
    }

    /// The holiday that governs a week for `zone`: the earliest disruptive one.
    ///
    /// `holidays` must be sorted by date. Later holidays in the same week never compound.
    #[must_use]
    pub fn governing_holiday<'h>(
        &self,
        holidays: &'h [ObservedHoliday],
        zone: &ZoneId,
    ) -> Option<&'h ObservedHoliday> {
        holidays
            .iter()
            .find(|holiday| self.disrupts(holiday, zone))
    }
}
