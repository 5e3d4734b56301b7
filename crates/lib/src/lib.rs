//! packforge-lib: build and publish content packs.
//!
//! The core of this crate is the transactional export:
//! - `walk`: deterministic leaf-first directory traversal
//! - `transaction`: reversible filesystem operations with undo
//! - `ownership`: record of files placed by earlier exports, used to refuse
//!   exports that would delete anything else
//! - `export`: destination resolution and the export sequence itself
//!
//! Around it sit the project model (`project`), the step runner (`pipeline`)
//! and workspace maintenance (`clean`, `init`).

pub mod clean;
pub mod consts;
pub mod export;
pub mod init;
pub mod ownership;
pub mod pipeline;
pub mod platform;
pub mod project;
pub mod transaction;
pub mod util;
pub mod walk;
