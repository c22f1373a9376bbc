use std::path::PathBuf;

use async_trait::async_trait;
use curbside_core::{PortError, Subscriber, SubscriberPort};
use serde_json::Value;
use tracing::{debug, warn};

/// Subscriber list kept as a JSON array on disk.
pub(crate) struct JsonFileSubscriberStore {
    path: PathBuf,
}

impl JsonFileSubscriberStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SubscriberPort for JsonFileSubscriberStore {
    async fn subscribers(&self) -> Result<Vec<Subscriber>, PortError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let rows: Vec<Value> = serde_json::from_str(&raw)?;
        let total = rows.len();

        // A malformed row skips that subscriber only.
        let subscribers: Vec<Subscriber> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(row, value)| match serde_json::from_value(value) {
                Ok(subscriber) => Some(subscriber),
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        row,
                        error = %err,
                        "skipping malformed subscriber"
                    );
                    None
                }
            })
            .collect();

        debug!(
            path = %self.path.display(),
            count = subscribers.len(),
            skipped = total.saturating_sub(subscribers.len()),
            "loaded subscribers"
        );
        Ok(subscribers)
    }
}
