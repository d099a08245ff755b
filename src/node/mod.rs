mod node;

pub(crate) use node::HighLoadNodesBody;
pub use node::{
    HighLoadNode, NodeLoad, NodeLoadResponse, NodeRef, NodeTag, ServiceNode, SystemNodeInfo,
};
