//! CLI subcommand implementations.

pub mod day;
pub mod edit;
pub mod records;
pub mod report;
pub mod status;
pub mod timeline;
pub mod util;
