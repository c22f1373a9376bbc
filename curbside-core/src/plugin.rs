//! Registry for all municipality plugins and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{MunicipalityId, MunicipalityMeta};
use crate::ports::{AddressLookupPort, PortError};
use crate::resolver::Resolver;

/// Configuration and ports implementing a single municipality.
pub struct MunicipalityPlugin {
    /// Static metadata describing the municipality.
    pub meta: MunicipalityMeta,
    /// Resolver bound to the municipality's collection configuration.
    pub resolver: Resolver,
    /// Implementation for resolving addresses to zones.
    pub address_port: Arc<dyn AddressLookupPort>,
}

/// Registry that resolves plugins by municipality identifier.
pub struct PluginRegistry {
    plugins: HashMap<MunicipalityId, MunicipalityPlugin>,
}

impl PluginRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<MunicipalityPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered municipalities, sorted by name.
    #[must_use]
    pub fn municipalities(&self) -> Vec<MunicipalityMeta> {
        let mut metas: Vec<MunicipalityMeta> = self
            .plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect();
        metas.sort_by(|left, right| left.name.cmp(&right.name));
        metas
    }

    /// Look up a plugin for the given municipality.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedMunicipality`] when no plugin is registered.
    pub fn plugin(&self, municipality: &MunicipalityId) -> Result<&MunicipalityPlugin, PortError> {
        self.plugins
            .get(municipality)
            .ok_or(PortError::UnsupportedMunicipality)
    }
}
