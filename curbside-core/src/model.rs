//! Domain data structures for municipalities, zones, subscribers, and resolved collections.

use std::fmt;

use chrono::{DateTime, NaiveDate, ParseWeekdayError, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Built-in municipalities supported by the application.
pub enum Municipalities {
    /// Lower Merion Township, Pennsylvania.
    LowerMerion,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a municipality known to curbside.
pub struct MunicipalityId(pub String);

impl fmt::Display for Municipalities {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Municipalities::LowerMerion => "lower-merion",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Municipalities> for MunicipalityId {
    fn from(municipality: Municipalities) -> Self {
        MunicipalityId(municipality.to_string())
    }
}

impl fmt::Display for MunicipalityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a municipality and its human-friendly name.
pub struct MunicipalityMeta {
    /// Unique identifier.
    pub id: MunicipalityId,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier of a collection zone, e.g. `"Zone 3"`.
pub struct ZoneId(pub String);

impl ZoneId {
    /// Construct a zone identifier.
    #[must_use]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A municipal grouping of addresses sharing one nominal collection day.
pub struct Zone {
    /// Unique identifier.
    pub id: ZoneId,
    /// Weekday collection happens when no holiday interferes.
    pub nominal_day: Weekday,
}

impl Zone {
    /// Construct a zone with its nominal collection day.
    #[must_use]
    pub fn new<S: Into<String>>(id: S, nominal_day: Weekday) -> Self {
        Self {
            id: ZoneId::new(id),
            nominal_day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Result of looking up a free-text address.
pub struct ZoneAssignment {
    /// Zone the address belongs to.
    pub zone: ZoneId,
    /// Nominal collection day of that zone.
    pub collection_day: Weekday,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Someone who signed up for reminders.
pub struct Subscriber {
    /// Destination number in E.164 form.
    pub phone_number: String,
    /// Street address as entered at sign-up.
    pub street_address: String,
    /// Zone, when it was already resolved at sign-up.
    #[serde(default)]
    pub zone: Option<ZoneId>,
    /// Whether the subscriber agreed to receive messages.
    pub consent: bool,
    /// Sign-up time.
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Collection day for a zone in the week of a given date, after holiday shifts.
pub struct ResolvedCollection {
    /// Date the resolution was asked for.
    #[serde(rename = "iso_date")]
    pub date: NaiveDate,
    /// Zone resolved against.
    pub zone: ZoneId,
    /// Weekday collection happens absent holidays.
    pub nominal_day: Weekday,
    /// Weekday collection actually happens this week.
    pub effective_day: Weekday,
    /// Calendar date of the effective collection day.
    pub effective_date: NaiveDate,
    /// Present only when a holiday moved collection for this zone.
    pub holiday_note: Option<String>,
}

impl ResolvedCollection {
    /// The requested date in `YYYY-MM-DD` form.
    #[must_use]
    pub fn iso_date(&self) -> String {
        self.date.format(ISO_DATE_FORMAT).to_string()
    }

    /// Whether a holiday moved collection away from the nominal day.
    #[must_use]
    pub fn is_shifted(&self) -> bool {
        self.holiday_note.is_some()
    }
}

/// Format used for every date crossing a boundary.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Full English name of a weekday, as used in message templates.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a weekday name such as `"Thursday"` or `"thu"`.
///
/// # Errors
///
/// Returns a [`ParseWeekdayError`] when the text names no weekday.
pub fn parse_weekday(name: &str) -> Result<Weekday, ParseWeekdayError> {
    name.trim().parse()
}

/// Saturday and Sunday carry no collection.
#[must_use]
pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
