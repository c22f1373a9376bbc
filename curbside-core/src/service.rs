//! High-level service facade combining all municipality plugins.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::holiday::ObservedHoliday;
use crate::model::{MunicipalityId, ResolvedCollection, Subscriber, Zone, ZoneAssignment, ZoneId};
use crate::notify::{NotificationDecision, should_notify};
use crate::plugin::PluginRegistry;
use crate::ports::{AddressQuery, PortError};
use crate::resolver::ResolveError;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by [`CurbsideService`].
pub enum ServiceError {
    /// A boundary port failed.
    #[error(transparent)]
    Port(#[from] PortError),
    /// Resolution rejected the input.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone, Serialize)]
/// Everything the debug view shows for one date and zone.
pub struct Inspection {
    /// Resolution of the requested date.
    pub resolved: ResolvedCollection,
    /// All holidays observed in the requested date's year.
    pub holidays: Vec<ObservedHoliday>,
}

/// Public entry point for address lookups, resolutions, and reminder decisions.
pub struct CurbsideService {
    registry: Arc<PluginRegistry>,
}

impl CurbsideService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// List all available municipalities and their display names.
    #[must_use]
    pub fn municipalities(&self) -> Vec<(MunicipalityId, String)> {
        self.registry
            .municipalities()
            .into_iter()
            .map(|meta| (meta.id, meta.name))
            .collect()
    }

    /// Zones of a municipality in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Port`] if the municipality is unsupported.
    pub fn zones(&self, municipality: &MunicipalityId) -> Result<Vec<Zone>, ServiceError> {
        let plugin = self.registry.plugin(municipality)?;
        Ok(plugin.resolver.config().zones().to_vec())
    }

    /// Resolve a free-text address to its zone.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the municipality is unsupported, the text is blank,
    /// or the lookup fails.
    pub async fn lookup_address(
        &self,
        municipality: &MunicipalityId,
        address: &str,
    ) -> Result<ZoneAssignment, ServiceError> {
        let plugin = self.registry.plugin(municipality)?;
        let query = AddressQuery::parse(address);
        if query.is_empty() {
            return Err(PortError::AddressNotFound.into());
        }
        Ok(plugin.address_port.lookup(&query).await?)
    }

    /// Zone of a subscriber: the stored one, or a lookup of the street address.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the address cannot be resolved.
    pub async fn zone_of(
        &self,
        municipality: &MunicipalityId,
        subscriber: &Subscriber,
    ) -> Result<ZoneId, ServiceError> {
        if let Some(zone) = &subscriber.zone {
            return Ok(zone.clone());
        }
        let assignment = self
            .lookup_address(municipality, &subscriber.street_address)
            .await?;
        Ok(assignment.zone)
    }

    /// Resolve the effective collection day for a date and zone.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the municipality is unsupported or the zone unknown.
    pub fn resolve(
        &self,
        municipality: &MunicipalityId,
        date: NaiveDate,
        zone: &ZoneId,
    ) -> Result<ResolvedCollection, ServiceError> {
        let plugin = self.registry.plugin(municipality)?;
        Ok(plugin.resolver.resolve(date, zone)?)
    }

    /// Resolution plus every holiday of the year, for operational verification.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the municipality is unsupported or the zone unknown.
    pub fn inspect(
        &self,
        municipality: &MunicipalityId,
        date: NaiveDate,
        zone: &ZoneId,
    ) -> Result<Inspection, ServiceError> {
        let plugin = self.registry.plugin(municipality)?;
        let resolved = plugin.resolver.resolve(date, zone)?;
        let holidays = plugin.resolver.config().holidays_for_year(date.year());
        Ok(Inspection { resolved, holidays })
    }

    /// Whether `zone` should be reminded on the evening of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the municipality is unsupported or the zone unknown.
    pub fn should_notify(
        &self,
        municipality: &MunicipalityId,
        zone: &ZoneId,
        today: NaiveDate,
    ) -> Result<NotificationDecision, ServiceError> {
        let plugin = self.registry.plugin(municipality)?;
        Ok(should_notify(&plugin.resolver, zone, today)?)
    }
}
