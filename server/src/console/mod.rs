pub mod connection;
pub mod formatter;

pub use connection::Console;
