use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use curbside_core::{
    ISO_DATE_FORMAT,
    model::{MunicipalityId, Zone, ZoneId},
    notify::NotificationDecision,
    service::{CurbsideService, Inspection},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    ZoneSelect,
    AddressLookup,
    DateEntry,
    InspectionView,
}

pub(crate) struct App {
    pub service: Arc<CurbsideService>,
    pub municipality: MunicipalityId,
    pub municipality_name: String,

    pub screen: Screen,
    pub zones: Vec<Zone>,
    pub zone_list_index: usize,
    pub selected_zone: Option<Zone>,

    pub address_input: String,
    pub date_input: String,

    pub inspection: Option<Inspection>,
    pub reminder_tonight: Option<NotificationDecision>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<CurbsideService>,
        municipality: MunicipalityId,
        municipality_name: String,
        zones: Vec<Zone>,
    ) -> Self {
        Self {
            service,
            municipality,
            municipality_name,
            screen: Screen::ZoneSelect,
            zones,
            zone_list_index: 0,
            selected_zone: None,
            address_input: String::new(),
            date_input: today_iso(),
            inspection: None,
            reminder_tonight: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn select_current_zone(&mut self) {
        if let Some(zone) = self.zones.get(self.zone_list_index) {
            self.selected_zone = Some(zone.clone());
            self.screen = Screen::DateEntry;
        }
    }

    /// Select the zone an address lookup returned; `false` if it is not listed.
    pub(crate) fn select_zone_by_id(&mut self, id: &ZoneId) -> bool {
        let Some(index) = self.zones.iter().position(|zone| &zone.id == id) else {
            return false;
        };
        self.zone_list_index = index;
        self.select_current_zone();
        true
    }

    /// Move the date being inspected by whole weeks.
    pub(crate) fn shift_date_input(&mut self, forward: bool) -> Option<NaiveDate> {
        let current = NaiveDate::parse_from_str(self.date_input.trim(), ISO_DATE_FORMAT).ok()?;
        let week = Days::new(7);
        let moved = if forward {
            current.checked_add_days(week)
        } else {
            current.checked_sub_days(week)
        }?;
        self.date_input = moved.format(ISO_DATE_FORMAT).to_string();
        Some(moved)
    }
}

pub(crate) fn today_iso() -> String {
    Local::now().date_naive().format(ISO_DATE_FORMAT).to_string()
}
