use tracing::info;

use super::state_machine::{FormCore, FormState};
use crate::client::Client;
use crate::error::Result;
use crate::system::SystemAlias;

/// Edit the one optional alias of a system.
#[derive(Debug)]
pub struct AliasForm {
    client: Client,
    system_id: String,
    core: FormCore,
    alias: Option<SystemAlias>,
    input: String,
}

impl AliasForm {
    pub fn new(client: Client, system_id: &str) -> Self {
        AliasForm {
            client,
            system_id: system_id.to_string(),
            core: FormCore::new("alias"),
            alias: None,
            input: String::new(),
        }
    }

    pub fn state(&self) -> FormState {
        self.core.state()
    }

    pub fn error(&self) -> Option<&str> {
        self.core.error()
    }

    pub fn alias(&self) -> Option<&SystemAlias> {
        self.alias.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: &str) {
        self.input = value.to_string();
    }

    pub async fn load(&mut self) -> Result<()> {
        self.core.transition(FormState::Loading);
        match self.client.get_alias(&self.system_id).await {
            Ok(alias) => {
                self.input = alias.as_ref().map(|a| a.alias.clone()).unwrap_or_default();
                self.alias = alias;
                self.core.ready();
                Ok(())
            }
            Err(e) => self.core.fail(e),
        }
    }

    pub async fn save(&mut self) -> Result<()> {
        let alias = self.input.trim().to_string();
        if alias.is_empty() {
            return self.core.reject("alias must not be empty");
        }

        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.put_alias(&self.system_id, &alias).await {
            return self.core.fail(e);
        }
        info!("[ALIAS] {} set to {:?}", self.system_id, alias);
        self.load().await
    }

    /// Local state is only cleared once the backend acknowledged.
    pub async fn delete(&mut self) -> Result<()> {
        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.delete_alias(&self.system_id).await {
            return self.core.fail(e);
        }
        info!("[ALIAS] {} removed", self.system_id);
        self.alias = None;
        self.input.clear();
        self.core.ready();
        Ok(())
    }
}
