pub mod api;
pub mod client;
pub mod config;
pub mod jobs;
pub mod observability;
pub mod worker;
