//! The sync relay: drains change events from the store's broadcaster and
//! mirrors each one to every configured endpoint.
//!
//! Delivery is strictly best-effort. Failures are logged and swallowed,
//! never retried, and never surfaced to the caller whose mutation produced
//! the event. The local store is the source of truth; the mirrors are
//! allowed to diverge.

use std::sync::Arc;

use rsvpd_core::{ChangeEvent, EntityRecord};
use rsvpd_store::RegistrationStore;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ImageHostConfig, RelayEndpoint};
use crate::payload;
use crate::photos::{ImageHost, resolve_photo};
use crate::webhook::WebhookSender;

pub struct SyncRelay {
    store: Arc<RegistrationStore>,
    endpoints: Vec<RelayEndpoint>,
    sender: WebhookSender,
    photos: Option<ImageHost>,
}

impl SyncRelay {
    pub fn new(
        store: Arc<RegistrationStore>,
        endpoints: Vec<RelayEndpoint>,
        image_host: Option<ImageHostConfig>,
    ) -> Self {
        Self {
            store,
            endpoints,
            sender: WebhookSender::new(),
            photos: image_host.map(ImageHost::new),
        }
    }

    /// Subscribe to the store's broadcaster and drain events on a detached
    /// task until the broadcaster is dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        let mut rx = self.store.broadcaster().subscribe();
        info!(endpoints = self.endpoints.len(), "Sync relay started");
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.forward(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        // Best-effort mirroring: lost events stay lost.
                        warn!(skipped, "Relay lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("Sync relay stopped");
        })
    }

    /// Mirror one event to every configured target.
    pub async fn forward(&self, event: ChangeEvent) {
        let targets = self.targets().await;
        if targets.is_empty() {
            debug!(kind = %event.kind, action = %event.action, "No relay targets configured");
            return;
        }

        let payload = self.render(&event).await;
        for target in &targets {
            if let Err(e) = self.sender.post(target, &payload).await {
                warn!(
                    url = %target.url,
                    kind = %event.kind,
                    action = %event.action,
                    error = %e,
                    "Relay delivery failed"
                );
            }
        }
    }

    /// Static endpoints plus the runtime-configured webhook URL, deduplicated.
    async fn targets(&self) -> Vec<RelayEndpoint> {
        let mut targets = self.endpoints.clone();
        if let Some(url) = self.store.webhook_url().await {
            if !url.is_empty() && !targets.iter().any(|t| t.url == url) {
                targets.push(RelayEndpoint::new(url));
            }
        }
        targets
    }

    async fn render(&self, event: &ChangeEvent) -> serde_json::Value {
        let catalog = self.store.catalog();
        let mut data = Vec::with_capacity(event.records.len());
        for record in &event.records {
            let photo = match record {
                EntityRecord::Registrant(r) => r.photo.as_deref(),
                EntityRecord::Waitlist(w) => w.photo.as_deref(),
                EntityRecord::Invite(_) => None,
            };
            let photo_link = resolve_photo(photo, self.photos.as_ref()).await;
            data.push(payload::record_wire(record, catalog, &photo_link));
        }
        payload::envelope(event, data)
    }
}

impl std::fmt::Debug for SyncRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRelay")
            .field("endpoints", &self.endpoints.len())
            .field("image_host", &self.photos.is_some())
            .finish()
    }
}
