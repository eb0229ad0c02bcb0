//! crondeck keeps a user's crontab, the scripts its entries run and the
//! index-based task list shown to clients consistent with each other.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod crontab;
pub mod error;
pub mod logger;
pub mod schedule;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
