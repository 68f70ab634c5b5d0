//! CLI subcommand implementations.

pub mod dash;
pub mod delete;
pub mod logs;
pub mod names;
pub mod start;
pub mod status;
pub mod stop;
pub mod update;
pub mod util;
