//! HTTP handlers.

pub mod analyze;
pub mod doc;
pub mod health;

pub use analyze::analyze;
pub use health::{health, root};
