use crate::config::toml_config::FileConfig;
use crate::config::{parse_feed_format, parse_interval, parse_utc_offset, parse_webhook_style, AppConfig};
use crate::utils::error::ConfigError;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "contest-notifier")]
#[command(about = "Announces upcoming programming contests to a chat channel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    #[arg(long, env = "NOTIFIER_CONFIG", global = true, help = "TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "FEED_URL", global = true)]
    pub feed_url: Option<String>,

    #[arg(long, env = "FEED_FORMAT", global = true, help = "kenkoooo-v1 or envelope-v1")]
    pub feed_format: Option<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, env = "UPDATE_INTERVAL", global = true, help = "e.g. 90s, 10m, 1h30m")]
    pub update_interval: Option<String>,

    #[arg(long, env = "MAX_CONTESTS", global = true)]
    pub max_contests: Option<usize>,

    #[arg(long, env = "COMMAND_PREFIX", global = true)]
    pub command_prefix: Option<String>,

    #[arg(long, env = "WEBHOOK_URL", global = true, hide_env_values = true)]
    pub webhook_url: Option<String>,

    #[arg(long, env = "WEBHOOK_STYLE", global = true, help = "content or embed")]
    pub webhook_style: Option<String>,

    #[arg(long, env = "STATE_PATH", global = true)]
    pub state_path: Option<PathBuf>,

    #[arg(long, env = "DISPLAY_UTC_OFFSET", global = true, help = "e.g. +09:00")]
    pub display_utc_offset: Option<String>,

    #[arg(long, env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Print messages instead of posting to the webhook")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Run a cycle every update interval until interrupted (default)
    Run,
    /// Run a single cycle and exit
    Once,
    /// Answer one chat command, e.g. `command '!next'`
    #[command(name = "command")]
    Reply {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long, help = "Post the reply through the configured channel")]
        deliver: bool,
    },
}

impl Cli {
    pub fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Run)
    }

    /// Builds the effective configuration: defaults, then the `--config`
    /// file, then flags and environment variables. The result is validated.
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();
        if let Some(path) = &self.config {
            FileConfig::from_file(path)?.apply_to(&mut config)?;
        }
        self.apply_to(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(url) = &self.feed_url {
            config.feed_url = url.clone();
        }
        if let Some(format) = &self.feed_format {
            config.feed_format = parse_feed_format("feed_format", format)?;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(interval) = &self.update_interval {
            config.update_interval = parse_interval("update_interval", interval)?;
        }
        if let Some(max) = self.max_contests {
            config.max_contests = max;
        }
        if let Some(prefix) = &self.command_prefix {
            config.command_prefix = prefix.clone();
        }
        if let Some(url) = self.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.webhook_url = Some(url.to_string());
        }
        if let Some(style) = &self.webhook_style {
            config.webhook_style = parse_webhook_style("webhook_style", style)?;
        }
        if let Some(path) = &self.state_path {
            config.state_path = path.clone();
        }
        if let Some(offset) = &self.display_utc_offset {
            config.display_offset = parse_utc_offset("display_utc_offset", offset)?;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(())
    }
}
