//! Traits describing boundary services and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{MunicipalityMeta, Subscriber, ZoneAssignment};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to boundary services.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Stored or received data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// Local storage could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Requested address could not be found.
    #[error("Address not found")]
    AddressNotFound,
    /// The municipality has no registered plugin.
    #[error("Unsupported municipality")]
    UnsupportedMunicipality,
    /// The messaging provider refused the message.
    #[error("Delivery failed: {0}")]
    Delivery(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A free-text address split into house number and street.
pub struct AddressQuery {
    /// Street name to look up.
    pub street: String,
    /// Optional house number.
    pub house_number: Option<String>,
}

impl AddressQuery {
    /// Construct a new query.
    #[must_use]
    pub fn new<S: Into<String>, H: Into<String>>(street: S, house_number: Option<H>) -> Self {
        Self {
            street: street.into(),
            house_number: house_number.map(Into::into),
        }
    }

    /// Split free text such as `"229 Ardleigh Rd"`; a leading token containing a digit is
    /// taken as the house number.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some((first, street_parts)) = parts.split_first() else {
            return Self::new("", None::<String>);
        };

        let has_number = first.chars().any(|ch| ch.is_ascii_digit()) && !street_parts.is_empty();

        if has_number {
            Self::new(street_parts.join(" "), Some(*first))
        } else {
            Self::new(parts.join(" "), None::<String>)
        }
    }

    /// Check if the query is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A message ready to hand to a delivery provider.
pub struct OutboundMessage {
    /// Destination number in E.164 form.
    pub to: String,
    /// Rendered body.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Provider acknowledgement of an accepted message.
pub struct MessageReceipt {
    /// Provider-side message id.
    pub id: String,
}

#[async_trait]
/// Trait for municipality-specific address lookups.
pub trait AddressLookupPort: Send + Sync {
    /// Metadata describing the municipality handled by this port.
    fn municipality(&self) -> &MunicipalityMeta;

    /// Resolve an address to its zone and nominal collection day.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::AddressNotFound`] when no street matches, or another
    /// [`PortError`] when the backing store fails.
    async fn lookup(&self, query: &AddressQuery) -> Result<ZoneAssignment, PortError>;
}

#[async_trait]
/// Trait for subscriber stores.
pub trait SubscriberPort: Send + Sync {
    /// All known subscribers.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the store cannot be read.
    async fn subscribers(&self) -> Result<Vec<Subscriber>, PortError>;
}

#[async_trait]
/// Trait for outbound message delivery.
pub trait MessagePort: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider rejects the message or cannot be reached.
    async fn send(&self, message: &OutboundMessage) -> Result<MessageReceipt, PortError>;
}
