pub mod config;
pub mod error;
pub mod report;

pub use config::Config;
pub use error::*;
pub use report::*;
