pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod realtime;
pub mod repo;
pub mod security;
pub mod server;
pub mod store;
