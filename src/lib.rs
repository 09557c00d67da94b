pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::calendar::{CalendarSync, ImmunizationEvent, SyncOutcome};
pub use config::{AppConfig, CalendarConfig, GatewayConfig, ServerConfig};
pub use core::{gateway::GatewayClient, handler::AdviceHandler};
pub use domain::model::{AdviceKind, AdviceRequest, AdviceResponse, GatewayOutcome, PromptPair};
pub use domain::ports::CompletionGateway;
pub use utils::error::{AdviceError, Result};
