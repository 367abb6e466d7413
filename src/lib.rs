pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod preprocess;
