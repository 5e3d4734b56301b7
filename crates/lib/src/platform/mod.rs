//! Platform integration: per-user directories, the content staging
//! directory lookup and file permission handling.

pub mod content;
pub mod paths;
pub mod readonly;

pub use content::{ContentLocator, LocateError, PlatformContentLocator, World};
