//! Nightly reminder batch: decide per subscriber, dispatch, and report.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::{MunicipalityId, Subscriber};
use crate::notify::NotificationDecision;
use crate::ports::{MessagePort, MessageReceipt, OutboundMessage, PortError, SubscriberPort};
use crate::service::{CurbsideService, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// What happened for a single subscriber.
pub enum ReminderOutcome {
    /// A reminder was accepted by the messaging provider.
    Sent(MessageReceipt),
    /// Tomorrow is not the subscriber's effective collection day.
    NotDue,
    /// The subscriber has not agreed to messages.
    NoConsent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Counts of one nightly run.
pub struct NightlyReport {
    /// Subscribers considered.
    pub total: usize,
    /// Reminders accepted by the provider.
    pub sent: usize,
    /// Subscribers whose collection is not tomorrow.
    pub not_due: usize,
    /// Subscribers without consent.
    pub no_consent: usize,
    /// Subscribers whose resolution or delivery failed.
    pub failed: usize,
}

/// Runs the nightly reminder for every subscriber of one municipality.
pub struct ReminderService {
    service: Arc<CurbsideService>,
    municipality: MunicipalityId,
    subscribers: Arc<dyn SubscriberPort>,
    messenger: Arc<dyn MessagePort>,
}

impl ReminderService {
    /// Bind the batch to a municipality, a subscriber store, and a messenger.
    #[must_use]
    pub fn new(
        service: Arc<CurbsideService>,
        municipality: MunicipalityId,
        subscribers: Arc<dyn SubscriberPort>,
        messenger: Arc<dyn MessagePort>,
    ) -> Self {
        Self {
            service,
            municipality,
            subscribers,
            messenger,
        }
    }

    /// Remind every subscriber whose effective collection day is tomorrow.
    ///
    /// A failure for one subscriber is logged and counted; the batch carries on.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] only when the subscriber list itself cannot be loaded.
    pub async fn run_nightly(&self, today: NaiveDate) -> Result<NightlyReport, PortError> {
        let subscribers = self.subscribers.subscribers().await?;
        let mut report = NightlyReport {
            total: subscribers.len(),
            ..NightlyReport::default()
        };

        for subscriber in &subscribers {
            let recipient = redact_phone(&subscriber.phone_number);
            match self.remind(subscriber, today).await {
                Ok(ReminderOutcome::Sent(receipt)) => {
                    debug!(%recipient, message_id = %receipt.id, "reminder sent");
                    report.sent += 1;
                }
                Ok(ReminderOutcome::NotDue) => report.not_due += 1,
                Ok(ReminderOutcome::NoConsent) => report.no_consent += 1,
                Err(err) => {
                    warn!(%recipient, error = %err, "reminder failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            municipality = %self.municipality,
            %today,
            total = report.total,
            sent = report.sent,
            not_due = report.not_due,
            no_consent = report.no_consent,
            failed = report.failed,
            "nightly reminders finished"
        );

        Ok(report)
    }

    /// Decide for and, when due, message a single subscriber.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the zone cannot be resolved or delivery fails.
    pub async fn remind(
        &self,
        subscriber: &Subscriber,
        today: NaiveDate,
    ) -> Result<ReminderOutcome, ServiceError> {
        if !subscriber.consent {
            return Ok(ReminderOutcome::NoConsent);
        }

        let zone = self.service.zone_of(&self.municipality, subscriber).await?;
        let decision = self
            .service
            .should_notify(&self.municipality, &zone, today)?;
        if !decision.notify {
            return Ok(ReminderOutcome::NotDue);
        }

        let message = OutboundMessage {
            to: subscriber.phone_number.clone(),
            body: render_reminder(&subscriber.street_address, &decision),
        };
        let receipt = self.messenger.send(&message).await?;
        Ok(ReminderOutcome::Sent(receipt))
    }
}

/// Message body for a due reminder; the holiday note, if any, is appended verbatim.
#[must_use]
pub fn render_reminder(street_address: &str, decision: &NotificationDecision) -> String {
    let mut body = format!(
        "Reminder: trash collection is tomorrow ({}) at {street_address}. Don't forget to put out your bins!",
        decision.collection_weekday()
    );
    if let Some(note) = &decision.note {
        body.push(' ');
        body.push_str(note);
    }
    body
}

// Keeps only the last four digits of a number for log output.
fn redact_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits.iter().rev().take(4).rev().collect();
    format!("***{tail}")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Weekday;

    use super::*;
    use crate::config::CollectionConfig;
    use crate::holiday::{Holiday, HolidayRule};
    use crate::model::{MunicipalityMeta, Zone, ZoneAssignment, ZoneId};
    use crate::plugin::{MunicipalityPlugin, PluginRegistry};
    use crate::ports::{AddressLookupPort, AddressQuery};
    use crate::resolver::Resolver;
    use crate::shift::ShiftTable;

    struct FixedAddresses {
        meta: MunicipalityMeta,
    }

    #[async_trait]
    impl AddressLookupPort for FixedAddresses {
        fn municipality(&self) -> &MunicipalityMeta {
            &self.meta
        }

        async fn lookup(&self, query: &AddressQuery) -> Result<ZoneAssignment, PortError> {
            if query.street.eq_ignore_ascii_case("Ardleigh Rd") {
                Ok(ZoneAssignment {
                    zone: ZoneId::new("Zone 3"),
                    collection_day: Weekday::Thu,
                })
            } else {
                Err(PortError::AddressNotFound)
            }
        }
    }

    struct StaticSubscribers(Vec<Subscriber>);

    #[async_trait]
    impl SubscriberPort for StaticSubscribers {
        async fn subscribers(&self) -> Result<Vec<Subscriber>, PortError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl MessagePort for RecordingMessenger {
        async fn send(&self, message: &OutboundMessage) -> Result<MessageReceipt, PortError> {
            if message.to.ends_with("0000") {
                return Err(PortError::Delivery("unreachable number".to_owned()));
            }
            let mut sent = self.sent.lock().expect("lock not poisoned");
            sent.push(message.clone());
            Ok(MessageReceipt {
                id: format!("SM{}", sent.len()),
            })
        }
    }

    fn municipality() -> MunicipalityId {
        MunicipalityId("testville".to_owned())
    }

    fn service() -> Arc<CurbsideService> {
        let holidays = vec![Holiday::new(
            "Christmas Day",
            HolidayRule::Fixed { month: 12, day: 25 },
        )];
        let zones = vec![Zone::new("Zone 1", Weekday::Mon), Zone::new("Zone 3", Weekday::Thu)];
        let shifts = ShiftTable::new()
            .with_chart(ZoneId::new("Zone 3"), [(Weekday::Thu, Weekday::Wed)]);
        let config = CollectionConfig::new(holidays, zones, shifts).expect("valid configuration");
        let meta = MunicipalityMeta {
            id: municipality(),
            name: "Testville".to_owned(),
        };
        let plugin = MunicipalityPlugin {
            meta: meta.clone(),
            resolver: Resolver::new(Arc::new(config)),
            address_port: Arc::new(FixedAddresses { meta }),
        };
        Arc::new(CurbsideService::new(Arc::new(PluginRegistry::new(vec![plugin]))))
    }

    fn subscriber(phone: &str, address: &str, zone: Option<&str>, consent: bool) -> Subscriber {
        Subscriber {
            phone_number: phone.to_owned(),
            street_address: address.to_owned(),
            zone: zone.map(ZoneId::new),
            consent,
            added_at: None,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[tokio::test]
    async fn batch_isolates_failures_and_counts_outcomes() {
        let subscribers = vec![
            subscriber("+15555550101", "229 Ardleigh Rd", None, true),
            subscriber("+15555550102", "1 Nowhere Ln", None, true),
            subscriber("+15555550103", "229 Ardleigh Rd", Some("Zone 9"), true),
            subscriber("+15555550000", "229 Ardleigh Rd", Some("Zone 3"), true),
            subscriber("+15555550104", "229 Ardleigh Rd", Some("Zone 1"), true),
            subscriber("+15555550105", "229 Ardleigh Rd", Some("Zone 3"), false),
        ];
        let messenger = Arc::new(RecordingMessenger::default());
        let reminders = ReminderService::new(
            service(),
            municipality(),
            Arc::new(StaticSubscribers(subscribers)),
            Arc::clone(&messenger) as Arc<dyn MessagePort>,
        );

        // Tuesday before Christmas 2025: Zone 3 collects on Wednesday.
        let report = reminders
            .run_nightly(date(2025, 12, 23))
            .await
            .expect("subscribers load");

        assert_eq!(
            report,
            NightlyReport {
                total: 6,
                sent: 1,
                not_due: 1,
                no_consent: 1,
                failed: 3,
            }
        );

        let sent = messenger.sent.lock().expect("lock not poisoned");
        assert_eq!(sent.len(), 1);
        let body = sent.first().map(|message| message.body.as_str()).unwrap_or_default();
        assert!(body.contains("tomorrow (Wednesday) at 229 Ardleigh Rd"));
        assert!(body.ends_with("Christmas Day: collection on Wednesday."));
    }

    #[tokio::test]
    async fn holiday_cancels_the_nominal_eve() {
        let reminders = ReminderService::new(
            service(),
            municipality(),
            Arc::new(StaticSubscribers(Vec::new())),
            Arc::new(RecordingMessenger::default()),
        );
        let outcome = reminders
            .remind(
                &subscriber("+15555550101", "229 Ardleigh Rd", Some("Zone 3"), true),
                date(2025, 12, 24),
            )
            .await
            .expect("resolvable subscriber");
        assert_eq!(outcome, ReminderOutcome::NotDue);
    }

    #[test]
    fn redaction_keeps_last_four_digits() {
        assert_eq!(redact_phone("whatsapp:+1 555 555 0199"), "***0199");
        assert_eq!(redact_phone("12"), "***12");
    }
}
