use crate::domain::model::{GatewayOutcome, PromptPair};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One stateless chat completion per call.
///
/// `Err` is reserved for configuration faults detected before any network
/// traffic (for example a missing credential). Everything that happens on the
/// wire, transport failures included, is reported through [`GatewayOutcome`].
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompts: &PromptPair) -> Result<GatewayOutcome>;
}
