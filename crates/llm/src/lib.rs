pub mod prompt;
pub mod provider;
pub mod providers;
pub mod risk;

pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
pub use risk::{RiskError, RiskExtraction, RiskExtractor};
