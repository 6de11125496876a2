pub mod api;
pub mod config;
pub mod errors;
pub mod github;
pub mod server;
pub mod throttle;
