//! In-memory document model for profiles and catalogs
//!
//! Control and subcontrol identity is their string id. Absent optional
//! sections (modify, include) deserialize as empty values so the resolvers
//! never have to special-case them.

mod catalog;
mod href;
mod profile;

pub use catalog::{Catalog, Control, Group, Param, Part, Subcontrol};
pub use href::Href;
pub use profile::{Add, Alter, Call, Constraint, Import, Include, Modify, Profile, SetParam};
