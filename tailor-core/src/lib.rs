//! Tailor library exports
//!
//! Resolves security-control profiles into tailored catalogs: follows the
//! profile's import chain, collects alterations, and merges them together
//! with parameter settings into the selected controls.

pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod model;
pub mod resolve;

pub use engine::{Engine, EngineConfig};
pub use error::{ResolveError, Result};
