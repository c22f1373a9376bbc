use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use curbside_core::{MessagePort, MessageReceipt, OutboundMessage, PortError};

/// Logs messages instead of delivering them.
#[derive(Default)]
pub(crate) struct DryRunMessagePort {
    sent: AtomicUsize,
}

#[async_trait]
impl MessagePort for DryRunMessagePort {
    async fn send(&self, message: &OutboundMessage) -> Result<MessageReceipt, PortError> {
        let sequence = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(to = %message.to, body = %message.body, "dry run, not sending");
        Ok(MessageReceipt {
            id: format!("dry-run-{sequence}"),
        })
    }
}
