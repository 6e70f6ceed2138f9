use crate::domain::models::notification::NotificationEvent;
use crate::domain::ports::NotificationDispatcher;
use reqwest::Client;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Posts booking events to a webhook in a detached task.
pub struct HttpNotifier {
    client: Client,
    webhook_url: String,
}

impl HttpNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

impl NotificationDispatcher for HttpNotifier {
    fn dispatch(&self, event: NotificationEvent) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime; dropping {:?} notification", event.event_kind);
            return;
        };

        let client = self.client.clone();
        let url = self.webhook_url.clone();
        handle.spawn(async move {
            let res = client.post(&url).json(&event).send().await;
            match res {
                Ok(r) if r.status().is_success() => {
                    info!("Notification {:?} delivered for {}", event.event_kind, event.appointment.id);
                }
                Ok(r) => {
                    let status = r.status();
                    let text = r.text().await.unwrap_or_default();
                    error!("Notification webhook failed. Status: {}, Body: {}", status, text);
                }
                Err(e) => error!("Notification webhook connection error: {}", e),
            }
        });
    }
}

/// Writes events to the log only.
#[derive(Default)]
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    fn dispatch(&self, event: NotificationEvent) {
        info!(
            kind = ?event.event_kind,
            appointment_id = %event.appointment.id,
            "Booking notification: {} on {} at {}",
            event.appointment.client_name,
            event.appointment.date,
            event.appointment.time
        );
    }
}
