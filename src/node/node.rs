use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::system::de_id;

/// `(type, id)` pair naming a proxy/service node. Used both to tag a system
/// and to ask the backend about a node's load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    #[serde(rename = "type")]
    pub node_type: String,
    pub id: i64,
}

impl NodeRef {
    pub fn new(node_type: &str, id: i64) -> Self {
        NodeRef {
            node_type: node_type.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTag {
    #[serde(default)]
    pub id: u64,
    #[serde(deserialize_with = "de_id")]
    pub system_id: String,
    pub tag_type: String,
    pub tag_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NodeTag {
    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(&self.tag_type, self.tag_id)
    }
}

/// A node hanging off a system that is currently flagged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighLoadNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub id: i64,
    pub online: i64,
}

/// `/nodes/load-status` answers either with a bare array or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HighLoadNodesBody {
    Bare(Option<Vec<HighLoadNode>>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<HighLoadNode>>,
    },
}

impl HighLoadNodesBody {
    pub(crate) fn into_nodes(self) -> Vec<HighLoadNode> {
        match self {
            HighLoadNodesBody::Bare(nodes) => nodes.unwrap_or_default(),
            HighLoadNodesBody::Wrapped { data } => data.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceNode {
    pub name: String,
    pub id: i64,
    #[serde(rename = "type")]
    pub node_type: String,
    pub online: i64,
    /// Unix seconds.
    #[serde(default)]
    pub last_update: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemNodeInfo {
    #[serde(deserialize_with = "de_id")]
    pub system_id: String,
    pub system_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub nodes: Vec<ServiceNode>,
    #[serde(default)]
    pub total_online: i64,
}

impl SystemNodeInfo {
    pub fn empty(system_id: &str, system_name: &str) -> Self {
        SystemNodeInfo {
            system_id: system_id.to_string(),
            system_name: system_name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeLoad {
    Normal,
    High,
    NotFound,
    /// Up, but no metrics collected yet.
    NoData,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLoadResponse {
    #[serde(rename = "type")]
    pub node_type: String,
    pub id: i64,
    pub load_status: NodeLoad,
}
