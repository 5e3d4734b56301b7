//! Template content for `packforge init`.

/// `.gitignore` for a new project: the workspace and local export output.
pub const GITIGNORE_TEMPLATE: &str = "/.packforge\n/build\n";

/// Source directories created for a new project, relative to its root.
pub const BEHAVIOR_PACK_DIR: &str = "packs/BP";
pub const RESOURCE_PACK_DIR: &str = "packs/RP";
pub const DATA_DIR: &str = "packs/data";
