pub mod config;
pub mod hash;
pub mod precision;

pub use config::*;
pub use hash::prompt_hash;
