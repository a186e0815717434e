//! Command implementations for the scribe-ext CLI.

mod info;
mod install;
mod list;

pub use info::run_info;
pub use install::run_install;
pub use list::run_list;
