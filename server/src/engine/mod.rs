pub mod channel;
pub mod command;
pub mod directory;
pub mod error;
pub mod message;
pub mod outcome;
pub mod server;
pub mod session;
pub mod system;
pub mod user;
pub mod validation;
