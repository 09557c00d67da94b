pub mod gateway;
pub mod handler;
pub mod prompt;

pub use crate::domain::model::{GatewayOutcome, PromptPair};
pub use crate::domain::ports::CompletionGateway;
pub use crate::utils::error::Result;
