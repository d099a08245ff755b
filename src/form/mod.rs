mod alias;
mod load_probe;
mod state_machine;
mod tag;
mod threshold;

pub use alias::AliasForm;
pub use load_probe::LoadProbeForm;
pub use state_machine::{is_valid_transition, state_transition_map, FormCore, FormState};
pub use tag::{parse_node_ref, TagForm};
pub use threshold::ThresholdForm;
