#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::{FeedFormat, WebhookStyle};
use crate::core::ConfigProvider;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use chrono::{FixedOffset, Offset};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://kenkoooo.com/atcoder/resources/contests.json";
pub const DEFAULT_STATE_PATH: &str = "./data/seen_contests.json";
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const MAX_UPDATE_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Fully resolved settings. Built from defaults, then a TOML file, then
/// environment variables and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub feed_url: String,
    pub feed_format: FeedFormat,
    pub request_timeout: Duration,
    pub update_interval: Duration,
    pub max_contests: usize,
    pub command_prefix: String,
    pub webhook_url: Option<String>,
    pub webhook_style: WebhookStyle,
    pub state_path: PathBuf,
    pub display_offset: FixedOffset,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_format: FeedFormat::default(),
            request_timeout: Duration::from_secs(10),
            update_interval: Duration::from_secs(10 * 60),
            max_contests: 5,
            command_prefix: "!".to_string(),
            webhook_url: None,
            webhook_style: WebhookStyle::default(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            display_offset: utc(),
            log_level: "info".to_string(),
        }
    }
}

fn utc() -> FixedOffset {
    chrono::Utc.fix()
}

impl ConfigProvider for AppConfig {
    fn feed_url(&self) -> &str {
        &self.feed_url
    }

    fn update_interval(&self) -> Duration {
        self.update_interval
    }

    fn max_contests(&self) -> usize {
        self.max_contests
    }

    fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for std::sync::Arc<T> {
    fn feed_url(&self) -> &str {
        (**self).feed_url()
    }

    fn update_interval(&self) -> Duration {
        (**self).update_interval()
    }

    fn max_contests(&self) -> usize {
        (**self).max_contests()
    }

    fn command_prefix(&self) -> &str {
        (**self).command_prefix()
    }

    fn display_offset(&self) -> FixedOffset {
        (**self).display_offset()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_url("feed_url", &self.feed_url)?;
        if let Some(webhook) = &self.webhook_url {
            validation::validate_url("webhook_url", webhook)?;
        }
        validation::validate_range(
            "request_timeout_secs",
            self.request_timeout.as_secs(),
            1,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        validation::validate_range(
            "update_interval",
            self.update_interval.as_secs(),
            1,
            MAX_UPDATE_INTERVAL_SECS,
        )?;
        validation::validate_positive_number("max_contests", self.max_contests as u64, 1)?;
        // Discord embeds hold at most 25 fields.
        if self.max_contests > 25 {
            return Err(ConfigError::InvalidValue {
                field: "max_contests".to_string(),
                value: self.max_contests.to_string(),
                reason: "Value must be at most 25".to_string(),
            });
        }
        validation::validate_non_empty_string("command_prefix", &self.command_prefix)?;
        validation::validate_no_whitespace("command_prefix", &self.command_prefix)?;
        validation::validate_path("state_path", &self.state_path.to_string_lossy())?;
        validation::validate_non_empty_string("log_level", &self.log_level)?;
        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parses intervals such as `90s`, `10m`, `1h30m` or a bare number of seconds.
pub fn parse_interval(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(invalid(field, raw, "Interval cannot be empty"));
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit = match ch {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid(field, raw, format!("Unknown interval unit '{}'", ch))),
        };
        let n: u64 = digits
            .parse()
            .map_err(|_| invalid(field, raw, "Expected a number before each unit"))?;
        total = n
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| invalid(field, raw, "Interval is too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(invalid(field, raw, "Trailing number without unit"));
    }
    Ok(Duration::from_secs(total))
}

/// Parses `+09:00`, `-05:30`, `+9`, `Z` or `UTC`.
pub fn parse_utc_offset(field: &str, raw: &str) -> Result<FixedOffset, ConfigError> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }
    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(invalid(field, raw, "Offset must start with '+' or '-'")),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours
        .parse()
        .map_err(|_| invalid(field, raw, "Invalid hour component"))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| invalid(field, raw, "Invalid minute component"))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid(field, raw, "Offset out of range"));
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| invalid(field, raw, "Offset out of range"))
}

pub fn parse_feed_format(field: &str, raw: &str) -> Result<FeedFormat, ConfigError> {
    raw.parse().map_err(|reason: String| invalid(field, raw, reason))
}

pub fn parse_webhook_style(field: &str, raw: &str) -> Result<WebhookStyle, ConfigError> {
    raw.parse().map_err(|reason: String| invalid(field, raw, reason))
}
