pub mod pods;
pub mod utils;
