//! Provider implementation for Lower Merion Township, Pennsylvania.
//!
//! Zones, holiday rules, and the holiday collection chart follow the township's refuse and
//! recycling holiday schedule. Addresses resolve through a street index.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use serde::Deserialize;
use tracing::debug;

use curbside_core::{
    config::{CollectionConfig, ConfigError},
    holiday::{Holiday, HolidayRule},
    model::{MunicipalityId, MunicipalityMeta, Zone, ZoneAssignment, ZoneId},
    plugin::MunicipalityPlugin,
    ports::{AddressLookupPort, AddressQuery, PortError},
    resolver::Resolver,
    shift::ShiftTable,
};

/// Streets known without loading an external index.
const BUILTIN_STREETS: &str = r#"
[[street]]
name = "Ardleigh Rd"
zone = "Zone 3"
"#;

/// Street suffixes folded to their postal abbreviation before matching.
const SUFFIXES: &[(&str, &str)] = &[
    ("avenue", "ave"),
    ("boulevard", "blvd"),
    ("circle", "cir"),
    ("court", "ct"),
    ("drive", "dr"),
    ("lane", "ln"),
    ("place", "pl"),
    ("road", "rd"),
    ("street", "st"),
    ("terrace", "ter"),
];

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading a street index.
pub enum StreetIndexError {
    /// The TOML document is malformed.
    #[error("Invalid street index: {0}")]
    Parse(#[from] toml::de::Error),
    /// The same street is listed twice with different zones.
    #[error("Street {street} listed for both {first} and {second}")]
    Conflict {
        /// Street as written in the index.
        street: String,
        /// Zone listed first.
        first: ZoneId,
        /// Conflicting zone.
        second: ZoneId,
    },
}

/// Street index document, `[[street]]` tables with `name` and `zone`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StreetIndexToml {
    #[serde(default, rename = "street")]
    streets: Vec<StreetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StreetEntry {
    name: String,
    zone: String,
}

/// Normalised street name to zone.
#[derive(Debug, Clone, Default)]
pub struct StreetIndex {
    streets: HashMap<String, ZoneId>,
}

impl StreetIndex {
    /// Index with the streets bundled in this crate.
    ///
    /// # Errors
    ///
    /// Returns a [`StreetIndexError`] if the bundled document is invalid.
    pub fn builtin() -> Result<Self, StreetIndexError> {
        Self::from_toml(BUILTIN_STREETS)
    }

    /// Parse an index from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a [`StreetIndexError`] for malformed documents or conflicting entries.
    pub fn from_toml(document: &str) -> Result<Self, StreetIndexError> {
        let parsed: StreetIndexToml = toml::from_str(document)?;
        let mut index = Self::default();
        for entry in parsed.streets {
            index.insert(&entry.name, ZoneId(entry.zone))?;
        }
        Ok(index)
    }

    /// Merge `other` into this index.
    ///
    /// # Errors
    ///
    /// Returns [`StreetIndexError::Conflict`] when both indexes disagree about a street.
    pub fn merge(mut self, other: StreetIndex) -> Result<Self, StreetIndexError> {
        for (street, zone) in other.streets {
            self.insert(&street, zone)?;
        }
        Ok(self)
    }

    fn insert(&mut self, street: &str, zone: ZoneId) -> Result<(), StreetIndexError> {
        let key = normalize_street(street);
        match self.streets.get(&key) {
            Some(existing) if existing != &zone => Err(StreetIndexError::Conflict {
                street: street.to_owned(),
                first: existing.clone(),
                second: zone,
            }),
            Some(_) => Ok(()),
            None => {
                self.streets.insert(key, zone);
                Ok(())
            }
        }
    }

    /// Zone of a street, matched after normalisation.
    #[must_use]
    pub fn zone_of(&self, street: &str) -> Option<&ZoneId> {
        self.streets.get(&normalize_street(street))
    }

    /// Number of streets indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streets.len()
    }

    /// Whether the index has no streets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

/// Lowercase, drop punctuation, collapse whitespace, and abbreviate the suffix.
#[must_use]
pub fn normalize_street(street: &str) -> String {
    let cleaned: String = street
        .chars()
        .filter(|ch| !matches!(ch, '.' | ','))
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .map(|word| {
            SUFFIXES
                .iter()
                .find(|(long, _short)| *long == word)
                .map_or(word, |(_long, short)| *short)
        })
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Address lookup backed by a [`StreetIndex`].
pub struct LowerMerionAddressPort {
    meta: MunicipalityMeta,
    index: StreetIndex,
    config: Arc<CollectionConfig>,
}

impl LowerMerionAddressPort {
    /// Create a lookup port over `index`, reading nominal days from `config`.
    #[must_use]
    pub fn new(index: StreetIndex, config: Arc<CollectionConfig>) -> Self {
        Self {
            meta: municipality_meta(),
            index,
            config,
        }
    }
}

#[async_trait]
impl AddressLookupPort for LowerMerionAddressPort {
    fn municipality(&self) -> &MunicipalityMeta {
        &self.meta
    }

    async fn lookup(&self, query: &AddressQuery) -> Result<ZoneAssignment, PortError> {
        let Some(zone_id) = self.index.zone_of(&query.street) else {
            debug!(street = %query.street, "street not in index");
            return Err(PortError::AddressNotFound);
        };

        let zone = self.config.zone(zone_id).ok_or_else(|| {
            PortError::Internal(format!("street index names unconfigured {zone_id}"))
        })?;

        Ok(ZoneAssignment {
            zone: zone.id.clone(),
            collection_day: zone.nominal_day,
        })
    }
}

/// The eight holidays observed by the township's refuse division.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a rule is invalid.
pub fn holidays() -> Result<Vec<Holiday>, ConfigError> {
    Ok(vec![
        Holiday::new("New Year's Day", HolidayRule::fixed(1, 1)?),
        Holiday::new(
            "Martin Luther King Jr. Day",
            HolidayRule::nth_weekday(1, 3, Weekday::Mon)?,
        ),
        Holiday::new("Memorial Day", HolidayRule::last_weekday(5, Weekday::Mon)?),
        Holiday::new("Juneteenth", HolidayRule::fixed(6, 19)?),
        Holiday::new("Independence Day", HolidayRule::fixed(7, 4)?),
        Holiday::new("Labor Day", HolidayRule::nth_weekday(9, 1, Weekday::Mon)?),
        Holiday::new(
            "Thanksgiving Day",
            HolidayRule::nth_weekday(11, 4, Weekday::Thu)?,
        ),
        Holiday::new("Christmas Day", HolidayRule::fixed(12, 25)?),
    ])
}

/// Zones 1–4 and their regular collection days. Nobody collects on Wednesday, which
/// leaves room for holiday weeks.
#[must_use]
pub fn zones() -> Vec<Zone> {
    vec![
        Zone::new("Zone 1", Weekday::Mon),
        Zone::new("Zone 2", Weekday::Tue),
        Zone::new("Zone 3", Weekday::Thu),
        Zone::new("Zone 4", Weekday::Fri),
    ]
}

/// Holiday collection chart: for each zone, the weekday collection happens on when the
/// week's holiday falls on a given weekday.
#[must_use]
pub fn shift_table() -> ShiftTable {
    use Weekday::{Fri, Mon, Thu, Tue, Wed};

    ShiftTable::new()
        .with_chart(
            ZoneId::new("Zone 1"),
            [(Mon, Tue), (Tue, Mon), (Wed, Mon), (Thu, Mon), (Fri, Mon)],
        )
        .with_chart(
            ZoneId::new("Zone 2"),
            [(Mon, Wed), (Tue, Wed), (Wed, Tue), (Thu, Tue), (Fri, Tue)],
        )
        .with_chart(
            ZoneId::new("Zone 3"),
            [(Mon, Thu), (Tue, Thu), (Wed, Thu), (Thu, Wed), (Fri, Wed)],
        )
        .with_chart(
            ZoneId::new("Zone 4"),
            [(Mon, Fri), (Tue, Fri), (Wed, Fri), (Thu, Fri), (Fri, Thu)],
        )
}

/// Full collection configuration of the township.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the bundled tables are inconsistent.
pub fn collection_config() -> Result<CollectionConfig, ConfigError> {
    CollectionConfig::new(holidays()?, zones(), shift_table())
}

/// Build the plugin bundle for Lower Merion around a street index.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the bundled tables are inconsistent.
pub fn plugin(index: StreetIndex) -> Result<MunicipalityPlugin, ConfigError> {
    let config = Arc::new(collection_config()?);
    let address_port = Arc::new(LowerMerionAddressPort::new(index, Arc::clone(&config)));

    Ok(MunicipalityPlugin {
        meta: municipality_meta(),
        resolver: Resolver::new(config),
        address_port,
    })
}

fn municipality_meta() -> MunicipalityMeta {
    MunicipalityMeta {
        id: MunicipalityId(String::from("lower-merion")),
        name: String::from("Lower Merion Township"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_folds_suffix_case_and_punctuation() {
        assert_eq!(normalize_street("Ardleigh Road"), "ardleigh rd");
        assert_eq!(normalize_street("  ARDLEIGH   Rd. "), "ardleigh rd");
        assert_eq!(normalize_street("Old Lancaster Avenue"), "old lancaster ave");
    }

    #[test]
    fn builtin_index_knows_ardleigh() {
        let index = StreetIndex::builtin().expect("bundled index parses");
        assert_eq!(index.zone_of("Ardleigh Road"), Some(&ZoneId::new("Zone 3")));
        assert!(index.zone_of("Ardleigh Lane").is_none());
    }

    #[test]
    fn conflicting_entries_are_rejected() {
        let document = r#"
            [[street]]
            name = "Elm Street"
            zone = "Zone 1"

            [[street]]
            name = "elm st"
            zone = "Zone 2"
        "#;
        let result = StreetIndex::from_toml(document);
        assert!(matches!(result, Err(StreetIndexError::Conflict { .. })));
    }

    #[test]
    fn merge_combines_indexes() {
        let extra = StreetIndex::from_toml(
            "[[street]]\nname = \"Elm Street\"\nzone = \"Zone 1\"\n",
        )
        .expect("valid document");
        let index = StreetIndex::builtin()
            .and_then(|builtin| builtin.merge(extra))
            .expect("no conflicts");
        assert_eq!(index.len(), 2);
        assert_eq!(index.zone_of("Elm St"), Some(&ZoneId::new("Zone 1")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = StreetIndex::from_toml(
            "[[street]]\nname = \"Elm Street\"\nzone = \"Zone 1\"\nward = 4\n",
        );
        assert!(matches!(result, Err(StreetIndexError::Parse(_))));
    }
}
