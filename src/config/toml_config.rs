use crate::config::{parse_feed_format, parse_interval, parse_utc_offset, parse_webhook_style, AppConfig};
use crate::utils::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Optional settings file. Every key may be omitted; present keys override
/// the defaults, and environment/CLI values override the file.
///
/// ```toml
/// [feed]
/// url = "https://kenkoooo.com/atcoder/resources/contests.json"
/// format = "kenkoooo-v1"
/// timeout_secs = 10
///
/// [schedule]
/// update_interval = "10m"
///
/// [display]
/// max_contests = 5
/// command_prefix = "!"
/// utc_offset = "+09:00"
///
/// [webhook]
/// url = "${WEBHOOK_URL}"
/// style = "embed"
///
/// [state]
/// path = "./data/seen_contests.json"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub webhook: WebhookSection,
    #[serde(default)]
    pub state: StateSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedSection {
    pub url: Option<String>,
    pub format: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleSection {
    pub update_interval: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySection {
    pub max_contests: Option<usize>,
    pub command_prefix: Option<String>,
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    pub url: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Overlays the keys present in this file onto `config`.
    pub fn apply_to(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(url) = &self.feed.url {
            config.feed_url = url.clone();
        }
        if let Some(format) = &self.feed.format {
            config.feed_format = parse_feed_format("feed.format", format)?;
        }
        if let Some(secs) = self.feed.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(interval) = &self.schedule.update_interval {
            config.update_interval = parse_interval("schedule.update_interval", interval)?;
        }
        if let Some(max) = self.display.max_contests {
            config.max_contests = max;
        }
        if let Some(prefix) = &self.display.command_prefix {
            config.command_prefix = prefix.clone();
        }
        if let Some(offset) = &self.display.utc_offset {
            config.display_offset = parse_utc_offset("display.utc_offset", offset)?;
        }
        if let Some(url) = self.webhook.url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.webhook_url = Some(url.to_string());
        }
        if let Some(style) = &self.webhook.style {
            config.webhook_style = parse_webhook_style("webhook.style", style)?;
        }
        if let Some(path) = &self.state.path {
            config.state_path = path.clone();
        }
        if let Some(level) = &self.logging.level {
            config.log_level = level.clone();
        }
        Ok(())
    }
}

/// Replaces `${VAR}` with the variable's value. Unset variables become empty
/// strings so that an unset secret reads as "not configured".
fn substitute_env_vars(content: &str) -> String {
    static ENV_REF: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REF.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env reference regex")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
