use tracing::info;

use super::state_machine::{FormCore, FormState};
use crate::client::Client;
use crate::error::Result;
use crate::system::{SystemThreshold, ThresholdField};

/// Alert limits for one system.
///
/// Input is coerced on every keystroke (see [`SystemThreshold::set`]); the
/// network maxima are only normalized when submitting.
#[derive(Debug)]
pub struct ThresholdForm {
    client: Client,
    system_id: String,
    core: FormCore,
    threshold: Option<SystemThreshold>,
}

impl ThresholdForm {
    pub fn new(client: Client, system_id: &str) -> Self {
        ThresholdForm {
            client,
            system_id: system_id.to_string(),
            core: FormCore::new("threshold"),
            threshold: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.core.state()
    }

    pub fn error(&self) -> Option<&str> {
        self.core.error()
    }

    pub fn threshold(&self) -> Option<&SystemThreshold> {
        self.threshold.as_ref()
    }

    /// Ignored until a threshold is loaded.
    pub fn set_field(&mut self, field: ThresholdField, raw: &str) {
        if let Some(t) = self.threshold.as_mut() {
            t.set(field, raw);
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.core.transition(FormState::Loading);
        match self.client.get_threshold(&self.system_id).await {
            Ok(t) => {
                self.threshold = Some(t);
                self.core.ready();
                Ok(())
            }
            Err(e) => self.core.fail(e),
        }
    }

    /// Returns the payload that was sent. The form then shows what the
    /// backend stored.
    pub async fn submit(&mut self) -> Result<SystemThreshold> {
        let payload = match &self.threshold {
            Some(t) => t.normalized(),
            None => return self.core.reject("threshold not loaded"),
        };

        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.put_threshold(&self.system_id, &payload).await {
            return self.core.fail(e);
        }
        info!("[THRESHOLD] saved for {}", self.system_id);
        self.load().await?;
        Ok(payload)
    }

    /// Drop the stored limits and reload the backend defaults.
    pub async fn reset(&mut self) -> Result<()> {
        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.delete_threshold(&self.system_id).await {
            return self.core.fail(e);
        }
        info!("[THRESHOLD] reset for {}", self.system_id);
        self.load().await
    }
}
