mod check;
mod info;
mod jobs;
mod run;

pub use check::cmd_check;
pub use info::cmd_info;
pub use jobs::cmd_jobs;
pub use run::cmd_run;
