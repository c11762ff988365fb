//! Command implementations.

mod clear;
mod config;
mod export;
mod history;
mod import;
mod ingest;
mod listen;
mod monthly;
mod this_month;
mod today;
mod view;

pub use clear::cmd_clear;
pub use config::cmd_config;
pub use export::cmd_export;
pub use history::cmd_history;
pub use import::cmd_import;
pub use ingest::cmd_ingest;
pub use listen::cmd_listen;
pub use monthly::cmd_monthly;
pub use this_month::cmd_this_month;
pub use today::cmd_today;
