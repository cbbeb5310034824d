pub mod analytics;
pub mod chat;
pub mod export;
pub mod health;
pub mod spa;
