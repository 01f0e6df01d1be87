//! Translation of parameter and subcontrol ids to their owning control id
//!
//! Catalog families number their controls differently, so the mapping is a
//! pluggable capability rather than a fixed rule.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maps a parameter or subcontrol id to the id of the control that owns it
pub trait ControlIdMapper: Send + Sync {
    fn map_to_control_id(&self, id: &str) -> String;
}

/// NIST SP 800-53 numbering: `ac-2.1`, `ac-2(1)`, `ac-1_prm_1` and
/// `ac-2.1_prm_2` all belong to their base control (`ac-2`, `ac-1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NistControlMapper;

impl ControlIdMapper for NistControlMapper {
    fn map_to_control_id(&self, id: &str) -> String {
        let base = id.split('_').next().unwrap_or(id);
        let base = base.split('.').next().unwrap_or(base);
        let base = base.split('(').next().unwrap_or(base);
        base.trim().to_string()
    }
}

/// Catalogs whose parameter and subcontrol ids are already control ids
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl ControlIdMapper for IdentityMapper {
    fn map_to_control_id(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Catalog numbering family selected in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlFamily {
    #[default]
    Nist,
    Identity,
}

impl ControlFamily {
    pub fn mapper(self) -> Arc<dyn ControlIdMapper> {
        match self {
            ControlFamily::Nist => Arc::new(NistControlMapper),
            ControlFamily::Identity => Arc::new(IdentityMapper),
        }
    }
}
