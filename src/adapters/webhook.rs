use crate::domain::model::Message;
use crate::domain::ports::Channel;
use crate::utils::error::DeliveryError;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Discord rejects `content` longer than this.
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WebhookStyle {
    /// `{ "content": "..." }`, accepted by Discord, Slack-compatible and most chat webhooks.
    #[default]
    Content,
    /// Discord embed payload.
    Embed,
}

impl fmt::Display for WebhookStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookStyle::Content => f.write_str("content"),
            WebhookStyle::Embed => f.write_str("embed"),
        }
    }
}

impl FromStr for WebhookStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(WebhookStyle::Content),
            "embed" => Ok(WebhookStyle::Embed),
            other => Err(format!("unknown webhook style '{}' (expected content or embed)", other)),
        }
    }
}

#[derive(Serialize)]
struct ContentPayload {
    content: String,
}

#[derive(Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Embed<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<EmbedFooter<'a>>,
}

#[derive(Serialize)]
struct EmbedPayload<'a> {
    embeds: Vec<Embed<'a>>,
}

impl<'a> EmbedPayload<'a> {
    fn from_message(message: &'a Message) -> Self {
        Self {
            embeds: vec![Embed {
                title: &message.title,
                description: message.description.as_deref(),
                color: message.color,
                fields: message
                    .fields
                    .iter()
                    .map(|f| EmbedField {
                        name: &f.name,
                        value: &f.value,
                        inline: false,
                    })
                    .collect(),
                footer: message.footer.as_deref().map(|text| EmbedFooter { text }),
            }],
        }
    }
}

fn truncate_content(text: String) -> String {
    if text.chars().count() <= MAX_CONTENT_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_CONTENT_CHARS - 1).collect();
    cut.push('…');
    cut
}

/// Posts messages to a chat webhook. A single attempt per message; a
/// non-2xx answer is returned as [`DeliveryError::Status`].
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    url: String,
    client: Client,
    style: WebhookStyle,
    timeout: Duration,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, style: WebhookStyle) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            style,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn style(&self) -> WebhookStyle {
        self.style
    }

    fn body(&self, message: &Message) -> Result<Vec<u8>, DeliveryError> {
        let body = match self.style {
            WebhookStyle::Content => serde_json::to_vec(&ContentPayload {
                content: truncate_content(message.to_plain_text()),
            })?,
            WebhookStyle::Embed => serde_json::to_vec(&EmbedPayload::from_message(message))?,
        };
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Channel for WebhookChannel {
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        let body = self.body(message)?;
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), style = %self.style, "Webhook accepted message");
        Ok(())
    }
}
