use super::state_machine::{FormCore, FormState};
use super::tag::parse_node_ref;
use crate::client::Client;
use crate::error::Result;
use crate::node::{NodeLoadResponse, NodeRef};

/// Ask the backend about the load of an ad-hoc list of nodes.
#[derive(Debug)]
pub struct LoadProbeForm {
    client: Client,
    core: FormCore,
    requests: Vec<NodeRef>,
    responses: Vec<NodeLoadResponse>,
}

impl LoadProbeForm {
    pub fn new(client: Client) -> Self {
        LoadProbeForm {
            client,
            core: FormCore::starting_at("load-probe", FormState::Ready),
            requests: Vec::new(),
            responses: Vec::new(),
        }
    }

    pub fn with_requests(client: Client, requests: Vec<NodeRef>) -> Self {
        LoadProbeForm {
            requests,
            ..Self::new(client)
        }
    }

    pub fn state(&self) -> FormState {
        self.core.state()
    }

    pub fn error(&self) -> Option<&str> {
        self.core.error()
    }

    pub fn requests(&self) -> &[NodeRef] {
        &self.requests
    }

    pub fn responses(&self) -> &[NodeLoadResponse] {
        &self.responses
    }

    pub fn add(&mut self, node_type: &str, id: &str) -> Result<()> {
        let node = match parse_node_ref(node_type, id) {
            Ok(node) => node,
            Err(e) => return self.core.fail(e),
        };
        self.requests.push(node);
        self.core.ready();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<NodeRef> {
        if index < self.requests.len() {
            Some(self.requests.remove(index))
        } else {
            None
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.requests.is_empty() {
            return self.core.reject("add at least one node to query");
        }

        self.core.transition(FormState::Saving);
        match self.client.node_load_status(&self.requests).await {
            Ok(responses) => {
                self.responses = responses;
                self.core.ready();
                Ok(())
            }
            Err(e) => {
                self.responses.clear();
                self.core.fail(e)
            }
        }
    }
}
