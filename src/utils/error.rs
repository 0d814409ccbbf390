use thiserror::Error;

/// Failures of the feed client. Any of these aborts the current cycle.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Feed returned status code: {0}")]
    BadStatus(u16),

    #[error("Failed to decode feed: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn decode(message: impl Into<String>) -> Self {
        FetchError::Decode {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Seen-set state at {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },

    #[error("Failed to read seen-set state at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to write seen-set state at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by an outbound channel.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Channel rejected message with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Channel request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write message: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery of contest {contest_id} failed: {source}")]
    Delivery {
        contest_id: String,
        #[source]
        source: DeliveryError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Umbrella error for everything the crate surfaces to its callers.
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NotifierError {
    /// Short text that is safe to show to chat or CLI users. Raw error
    /// details belong in the logs.
    pub fn user_friendly_message(&self) -> &'static str {
        match self {
            NotifierError::Fetch(_) => {
                "❌ Error fetching contest information. Please try again later."
            }
            NotifierError::Load(_) | NotifierError::Save(_) => {
                "❌ Could not access the announced-contest state."
            }
            NotifierError::Notify(_) | NotifierError::Delivery(_) => {
                "❌ Could not deliver the message to the chat channel."
            }
            NotifierError::Config(_) => "❌ The configuration is invalid.",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NotifierError::Fetch(FetchError::Network(_)) => {
                "Check network connectivity and the feed URL"
            }
            NotifierError::Fetch(FetchError::BadStatus(_)) => {
                "The feed endpoint is unhealthy; the next cycle will retry"
            }
            NotifierError::Fetch(FetchError::Decode { .. }) => {
                "Check that feed_format matches the feed's JSON shape"
            }
            NotifierError::Load(LoadError::Corrupt { .. }) => {
                "Inspect or remove the state file; it will be rebuilt on the next save"
            }
            NotifierError::Load(LoadError::Io { .. }) | NotifierError::Save(_) => {
                "Check permissions on the state file and its directory"
            }
            NotifierError::Notify(_) | NotifierError::Delivery(_) => {
                "Check the webhook URL and that the channel still exists"
            }
            NotifierError::Config(_) => "Fix the reported setting and restart",
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_have_generic_user_message() {
        let err = NotifierError::from(FetchError::BadStatus(503));
        assert_eq!(
            err.user_friendly_message(),
            "❌ Error fetching contest information. Please try again later."
        );
        assert_eq!(err.to_string(), "Feed returned status code: 503");
    }

    #[test]
    fn decode_error_mentions_feed_format() {
        let err = NotifierError::from(FetchError::decode("expected array"));
        assert!(err.recovery_suggestion().contains("feed_format"));
        assert!(err.to_string().contains("expected array"));
    }
}
