//! Organizations, skills and their metadata

pub mod discovery;
pub mod frontmatter;
pub mod org;
pub mod validation;

pub use discovery::{find_orgs, find_skills, load_org};
pub use frontmatter::Frontmatter;
pub use org::{BrandManifest, Organization, Skill};
pub use validation::{ValidationResult, validate_org, validate_skill};
