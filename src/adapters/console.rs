use crate::domain::model::Message;
use crate::domain::ports::Channel;
use crate::utils::error::DeliveryError;
use std::io::Write;

/// Writes messages to stdout instead of a chat. Used for dry runs and when
/// no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleChannel;

#[async_trait::async_trait]
impl Channel for ConsoleChannel {
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        tracing::info!(title = %message.title, "Console delivery");
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}\n", message.to_plain_text())?;
        out.flush()?;
        Ok(())
    }
}
