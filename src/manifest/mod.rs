//! Plugin marketplace manifests
//!
//! Pure generation of per-skill plugin descriptors and the org-wide
//! marketplace catalog, plus the patch-level version bump.

pub mod generator;
pub mod version;

pub use generator::{
    MarketplaceManifest, MarketplaceOwner, MarketplacePlugin, PluginManifest, SKILLS_ROOT,
    generate_marketplace, generate_plugin, to_pretty_json,
};
pub use version::{bump_version, next_patch, published_version};

/// Version given to a skill that has never been published.
pub const INITIAL_VERSION: &str = "0.1.0";

/// Plugin descriptor file name inside each skill directory.
pub const PLUGIN_FILE: &str = "plugin.json";

/// Marketplace catalog location, relative to the brand repository root.
pub const MARKETPLACE_PATH: &str = ".claude-plugin/marketplace.json";
