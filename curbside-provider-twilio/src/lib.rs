//! Message delivery through the Twilio Messages REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use curbside_core::ports::{MessagePort, MessageReceipt, OutboundMessage, PortError};

const BASE_URL: &str = "https://api.twilio.com/2010-04-01";
const WHATSAPP_PREFIX: &str = "whatsapp:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Channel messages travel over.
pub enum Channel {
    /// WhatsApp via the Twilio WhatsApp sender.
    #[default]
    WhatsApp,
    /// Plain SMS.
    Sms,
}

impl Channel {
    /// Address a phone number for this channel, e.g. `whatsapp:+15555550100`.
    #[must_use]
    pub fn address(self, number: &str) -> String {
        let number = number.trim();
        match self {
            Channel::WhatsApp if !number.starts_with(WHATSAPP_PREFIX) => {
                format!("{WHATSAPP_PREFIX}{number}")
            }
            Channel::Sms => number
                .strip_prefix(WHATSAPP_PREFIX)
                .unwrap_or(number)
                .to_owned(),
            Channel::WhatsApp => number.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
/// Account credentials and sender number.
pub struct TwilioCredentials {
    /// Account SID, used as the basic-auth user.
    pub account_sid: String,
    /// Auth token, used as the basic-auth password.
    pub auth_token: String,
    /// Sender number.
    pub from: String,
}

/// Message resource returned by `POST /Accounts/{sid}/Messages.json`.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Error body returned for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorResource {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// [`MessagePort`] backed by Twilio.
pub struct TwilioMessagePort {
    client: Client,
    credentials: TwilioCredentials,
    channel: Channel,
}

impl TwilioMessagePort {
    /// Create a new message port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, credentials: TwilioCredentials, channel: Channel) -> Self {
        Self {
            client,
            credentials,
            channel,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{BASE_URL}/Accounts/{}/Messages.json",
            self.credentials.account_sid
        )
    }
}

#[async_trait]
impl MessagePort for TwilioMessagePort {
    async fn send(&self, message: &OutboundMessage) -> Result<MessageReceipt, PortError> {
        let to = self.channel.address(&message.to);
        let from = self.channel.address(&self.credentials.from);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", message.body.as_str())])
            .send()
            .await
            .map_err(PortError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(PortError::from)?;

        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        let resource: MessageResource = serde_json::from_str(&body).map_err(PortError::from)?;
        debug!(sid = %resource.sid, status = ?resource.status, "message accepted");

        Ok(MessageReceipt { id: resource.sid })
    }
}

// Turn a non-2xx response into a delivery error, keeping Twilio's own message when present.
fn rejection(status: StatusCode, body: &str) -> PortError {
    match serde_json::from_str::<ErrorResource>(body) {
        Ok(ErrorResource {
            code: Some(code),
            message,
        }) => PortError::Delivery(format!("{status}: {message} (code {code})")),
        Ok(ErrorResource { code: None, message }) => {
            PortError::Delivery(format!("{status}: {message}"))
        }
        Err(_err) => PortError::Delivery(status.to_string()),
    }
}
