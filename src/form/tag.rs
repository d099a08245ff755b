use tracing::info;

use super::state_machine::{FormCore, FormState};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::node::{NodeRef, NodeTag};

/// Validate a `(type, id)` pair typed by a user.
pub fn parse_node_ref(node_type: &str, id: &str) -> Result<NodeRef> {
    let node_type = node_type.trim();
    if node_type.is_empty() {
        return Err(Error::InvalidInput("type must not be empty".into()));
    }
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("ID must not be empty".into()));
    }
    let id = id
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput("ID must be numeric".into()))?;
    Ok(NodeRef::new(node_type, id))
}

/// Manage the node tags of one system. Every change is followed by a full
/// refetch; the list is never edited locally.
#[derive(Debug)]
pub struct TagForm {
    client: Client,
    system_id: String,
    core: FormCore,
    tags: Vec<NodeTag>,
    type_input: String,
    id_input: String,
}

impl TagForm {
    pub fn new(client: Client, system_id: &str) -> Self {
        TagForm {
            client,
            system_id: system_id.to_string(),
            core: FormCore::new("tags"),
            tags: Vec::new(),
            type_input: String::new(),
            id_input: String::new(),
        }
    }

    pub fn state(&self) -> FormState {
        self.core.state()
    }

    pub fn error(&self) -> Option<&str> {
        self.core.error()
    }

    pub fn tags(&self) -> &[NodeTag] {
        &self.tags
    }

    pub fn set_type(&mut self, value: &str) {
        self.type_input = value.to_string();
    }

    pub fn set_id(&mut self, value: &str) {
        self.id_input = value.to_string();
    }

    pub async fn load(&mut self) -> Result<()> {
        self.core.transition(FormState::Loading);
        match self.client.get_tags(&self.system_id).await {
            Ok(tags) => {
                self.tags = tags;
                self.core.ready();
                Ok(())
            }
            Err(e) => self.core.fail(e),
        }
    }

    pub async fn add(&mut self) -> Result<()> {
        let tag = match parse_node_ref(&self.type_input, &self.id_input) {
            Ok(tag) => tag,
            Err(e) => return self.core.fail(e),
        };

        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.add_tag(&self.system_id, &tag).await {
            return self.core.fail(e);
        }
        info!("[TAGS] {} tagged {}:{}", self.system_id, tag.node_type, tag.id);
        self.type_input.clear();
        self.id_input.clear();
        self.load().await
    }

    pub async fn remove(&mut self, tag: &NodeTag) -> Result<()> {
        self.core.transition(FormState::Saving);
        if let Err(e) = self.client.remove_tag(&self.system_id, &tag.node_ref()).await {
            return self.core.fail(e);
        }
        info!(
            "[TAGS] {} untagged {}:{}",
            self.system_id, tag.tag_type, tag.tag_id
        );
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_trimmed_pairs() {
        assert_eq!(parse_node_ref(" proxy ", " 12 ").unwrap(), NodeRef::new("proxy", 12));
    }

    #[test]
    fn rejects_bad_input() {
        assert_matches!(parse_node_ref("", "1"), Err(Error::InvalidInput(m)) if m == "type must not be empty");
        assert_matches!(parse_node_ref("proxy", "  "), Err(Error::InvalidInput(m)) if m == "ID must not be empty");
        assert_matches!(parse_node_ref("proxy", "abc"), Err(Error::InvalidInput(m)) if m == "ID must be numeric");
        assert_matches!(parse_node_ref("proxy", "1.5"), Err(Error::InvalidInput(_)));
    }
}
