pub mod analytics_impl;
pub mod backend;
pub mod error;
pub mod queries;
pub mod record;
pub mod retention;

pub use backend::{JsonFileStore, DAILY_STATS_FILE, VISITORS_FILE};
pub use error::StoreError;
