mod check;
mod clean;
mod init;
mod paths;
mod run;

pub use check::cmd_check;
pub use clean::cmd_clean;
pub use init::cmd_init;
pub use paths::cmd_paths;
pub use run::cmd_run;
