pub mod config;
pub mod debug_log;
pub mod health;
pub mod insight;
pub mod persist;
pub mod reader;
pub mod runtime;
