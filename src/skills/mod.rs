pub mod catalog;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod frontmatter;
pub mod permissions;
pub mod scaffold;
pub mod validator;

pub use catalog::{CatalogEntry, SkillCatalog};
pub use descriptor::SkillDescriptor;
pub use discovery::{
    discover, search_roots, DiscoveredSkill, Discovery, InvalidSkill, Problem, Scope, SearchRoot,
    SkillLocation, SKILL_FILENAME,
};
pub use error::ValidationError;
pub use permissions::{PermissionLevel, SkillPermissions};
pub use validator::{validate, validate_description, validate_name};
