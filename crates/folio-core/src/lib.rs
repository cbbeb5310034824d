pub mod analytics;
pub mod config;
pub mod error;
pub mod geo;
pub mod rate_limit;
pub mod user_agent;
pub mod visitor;
