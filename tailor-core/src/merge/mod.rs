//! Merge of alterations and parameter settings into fetched catalogs

mod mapping;
mod processor;
mod prose;

pub use mapping::{ControlFamily, ControlIdMapper, IdentityMapper, NistControlMapper};
pub use processor::{add_control_to_group, add_subcontrol_to_controls, find_subcontrol, Processor};
pub use prose::ParamPlaceholder;
