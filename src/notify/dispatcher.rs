use async_trait::async_trait;
use std::time::Duration;

use crate::config::NotificationConfig;
use crate::notify::{payload, Delivery, Notifier, NotifyError, NotifyEvent};

/// Fires webhook POSTs at the external automation service. One URL per
/// transition kind; an unset URL disables dispatch for that kind. Every
/// request carries a bounded timeout so a hung endpoint cannot stall the
/// caller's HTTP response.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    config: NotificationConfig,
    public_base_url: String,
}

impl WebhookDispatcher {
    pub fn new(
        config: NotificationConfig,
        public_base_url: String,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            public_base_url,
        })
    }

    fn url_for(&self, event: &NotifyEvent) -> Option<&str> {
        match event {
            NotifyEvent::Submitted { .. } | NotifyEvent::Resubmitted { .. } => {
                self.config.submit_url.as_deref()
            }
            NotifyEvent::Rejected { .. } => self.config.reject_url.as_deref(),
            NotifyEvent::Forwarded { .. } | NotifyEvent::Approved { .. } => {
                self.config.forward_url.as_deref()
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookDispatcher {
    async fn dispatch(&self, event: &NotifyEvent) -> Result<Delivery, NotifyError> {
        let Some(url) = self.url_for(event) else {
            return Ok(Delivery::Skipped);
        };

        let body = payload::payload_for(event, &self.public_base_url);
        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.to_string(),
                status,
            });
        }

        tracing::debug!(
            kind = event.kind(),
            form.id = %event.form().id,
            url,
            "webhook delivered"
        );
        Ok(Delivery::Delivered)
    }
}
