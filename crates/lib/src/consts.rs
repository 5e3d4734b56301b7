//! Names and sizes shared across the crate.

/// Application name, used for cache directories and environment variables.
pub const APP_NAME: &str = "packforge";

/// Project configuration file name at the project root.
pub const CONFIG_FILENAME: &str = "config.json";

/// Default name of the per-project cache area ("dot dir").
pub const DOT_DIR: &str = ".packforge";

/// Buffer size used when streaming file contents during copies.
pub const COPY_BUFFER_SIZE: usize = 1_000_000;

/// Environment variable overriding the content staging directory lookup.
pub const CONTENT_DIR_ENV: &str = "PACKFORGE_CONTENT_DIR";

/// Profile used when none is named.
pub const DEFAULT_PROFILE: &str = "default";

/// Subdirectories and files of the per-project cache area.
pub const TMP_DIR: &str = "tmp";
pub const BACKUP_DIR: &str = "backup";
pub const CACHE_DIR: &str = "cache";
pub const MANIFEST_FILENAME: &str = "owned_files.json";

/// Parent of per-project cache areas inside the user cache directory.
pub const PROJECT_CACHE_DIR: &str = "project-cache";

/// Environment passed to pipeline steps.
pub const ROOT_DIR_ENV: &str = "PACKFORGE_ROOT_DIR";
pub const WORK_DIR_ENV: &str = "PACKFORGE_WORK_DIR";
