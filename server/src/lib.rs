pub mod config;
pub mod console;
pub mod engine;
pub mod store;
