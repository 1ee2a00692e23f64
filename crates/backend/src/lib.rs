pub mod api;
pub mod common;
pub mod config;
pub mod db;
pub mod google;

pub use api::app_router;
pub use config::Config;
