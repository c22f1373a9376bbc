//! Immutable configuration a resolver works against.

use std::collections::HashSet;

use crate::holiday::{Holiday, ObservedHoliday, holidays_for_year};
use chrono::Weekday;

use crate::model::{Zone, ZoneId, is_weekend};
use crate::shift::ShiftTable;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while building a collection configuration.
pub enum ConfigError {
    /// Fixed holiday names a day that does not exist every year.
    #[error("Invalid fixed holiday date: month {month}, day {day}")]
    InvalidFixedDate {
        /// Month given.
        month: u32,
        /// Day given.
        day: u32,
    },
    /// Month outside 1..=12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    /// Weekday ordinal outside 1..=4.
    #[error("Invalid weekday ordinal: {0}")]
    InvalidOrdinal(u8),
    /// The same zone was listed twice.
    #[error("Duplicate zone: {0}")]
    DuplicateZone(ZoneId),
    /// A shift rule refers to a zone that is not configured.
    #[error("Shift rule for unknown zone: {0}")]
    UnknownShiftZone(ZoneId),
    /// A shift rule moves collection onto Saturday or Sunday.
    #[error("Shift rule for {zone} moves collection to a weekend day: {target}")]
    WeekendShiftTarget {
        /// Zone the rule belongs to.
        zone: ZoneId,
        /// Weekend day named as the target.
        target: Weekday,
    },
}

/// Holidays, zones, and shift rules of one municipality.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    holidays: Vec<Holiday>,
    zones: Vec<Zone>,
    shifts: ShiftTable,
}

impl CollectionConfig {
    /// Assemble a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateZone`] when a zone id repeats and
    /// [`ConfigError::UnknownShiftZone`] when the shift table names an unlisted zone, and
    /// [`ConfigError::WeekendShiftTarget`] when a chart entry or override moves collection
    /// onto Saturday or Sunday.
    pub fn new(
        holidays: Vec<Holiday>,
        zones: Vec<Zone>,
        shifts: ShiftTable,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if !seen.insert(&zone.id) {
                return Err(ConfigError::DuplicateZone(zone.id.clone()));
            }
        }

        if let Some(unknown) = shifts.zone_ids().find(|id| !seen.contains(id)) {
            return Err(ConfigError::UnknownShiftZone(unknown.clone()));
        }

        if let Some((zone, target)) = shifts.targets().find(|(_zone, target)| is_weekend(*target)) {
            return Err(ConfigError::WeekendShiftTarget {
                zone: zone.clone(),
                target,
            });
        }

        Ok(Self {
            holidays,
            zones,
            shifts,
        })
    }

    /// Configured holiday rules.
    #[must_use]
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Observed holidays in `year`, sorted chronologically.
    #[must_use]
    pub fn holidays_for_year(&self, year: i32) -> Vec<ObservedHoliday> {
        holidays_for_year(&self.holidays, year)
    }

    /// All zones, in configuration order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a zone by id.
    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| &zone.id == id)
    }

    /// Shift rules.
    #[must_use]
    pub fn shifts(&self) -> &ShiftTable {
        &self.shifts
    }
}
