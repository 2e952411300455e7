mod base;
mod connection;

pub use base::*;
pub use connection::*;
