pub mod app;
pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod routes;
pub mod seo;
pub mod state;
pub mod visit;
