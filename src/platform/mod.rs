pub mod teams;

use async_trait::async_trait;
use serde_json::Value;

use crate::dialogflow::Platform;
use crate::error::ConvertError;

/// Turns Dialogflow fulfillment messages into a delivery platform's schema.
///
/// The method is async so webhook handlers can await it alongside their
/// other calls; implementations are pure and never suspend.
#[async_trait]
pub trait MessageConverter: Send + Sync {
    /// Outgoing message type of the platform
    type Output: Send;

    /// Platform identifier whose messages this converter keeps
    fn platform(&self) -> &Platform;

    /// Convert a batch of raw fulfillment messages in order, dropping messages
    /// addressed to other platforms. Each element is read on its own, so a
    /// badly typed one is handled like any other malformed message.
    /// `context` is the caller's turn context and may be ignored.
    async fn convert(
        &self,
        context: Option<&Value>,
        messages: &[Value],
    ) -> Result<Vec<Self::Output>, ConvertError>;
}
