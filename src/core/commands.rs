//! Chat command surface. A chat gateway (or the CLI) hands raw message text
//! to [`CommandDispatcher::handle_text`] and sends back whatever it returns.
//! Commands only read the feed; they never touch the seen-set.

use crate::core::format::{self, COLOR_HELP, COLOR_STATUS};
use crate::core::upcoming::select_upcoming;
use crate::domain::model::{Contest, Message};
use crate::domain::ports::{Clock, ConfigProvider, FeedSource};
use crate::utils::error::{NotifierError, Result};

pub const NO_UPCOMING: &str = "📅 No upcoming contests found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Contest,
    Next,
    Status,
    Help,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Contest, Command::Next, Command::Status, Command::Help];

    pub fn name(self) -> &'static str {
        match self {
            Command::Contest => "contest",
            Command::Next => "next",
            Command::Status => "status",
            Command::Help => "help",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Contest => "Show upcoming contests",
            Command::Next => "Show the next contest and when it starts",
            Command::Status => "Show feed and schedule status",
            Command::Help => "Show this help message",
        }
    }
}

/// Parses `text` as a command. The first whitespace-separated token must be
/// exactly `prefix` followed by a command name.
pub fn parse_command(text: &str, prefix: &str) -> Option<Command> {
    let token = text.split_whitespace().next()?;
    let name = token.strip_prefix(prefix)?;
    Command::ALL.into_iter().find(|c| c.name() == name)
}

pub struct CommandDispatcher<F: FeedSource, C: ConfigProvider, K: Clock> {
    feed: F,
    config: C,
    clock: K,
}

impl<F: FeedSource, C: ConfigProvider, K: Clock> CommandDispatcher<F, C, K> {
    pub fn new(feed: F, config: C, clock: K) -> Self {
        Self {
            feed,
            config,
            clock,
        }
    }

    /// Returns `None` when `text` is not a command for this bot.
    pub async fn handle_text(&self, text: &str) -> Option<Message> {
        let command = parse_command(text, self.config.command_prefix())?;
        Some(self.handle(command).await)
    }

    pub async fn handle(&self, command: Command) -> Message {
        tracing::info!(command = command.name(), "Handling command");
        match command {
            Command::Contest => self.contest().await,
            Command::Next => self.next().await,
            Command::Status => self.status().await,
            Command::Help => self.help(),
        }
    }

    async fn upcoming(&self) -> Result<Vec<Contest>> {
        let all = self.feed.fetch().await?;
        Ok(select_upcoming(&all, self.clock.now()))
    }

    async fn contest(&self) -> Message {
        match self.upcoming().await {
            Ok(upcoming) if upcoming.is_empty() => Message::notice(NO_UPCOMING),
            Ok(upcoming) => {
                let message = format::render_contest_list(
                    &upcoming,
                    self.config.max_contests(),
                    self.clock.now(),
                    self.config.display_offset(),
                    self.config.update_interval(),
                );
                tracing::info!(shown = message.fields.len(), "Sent contest information");
                message
            }
            Err(e) => fetch_failure(e),
        }
    }

    async fn next(&self) -> Message {
        match self.upcoming().await {
            Ok(upcoming) => match upcoming.first() {
                Some(contest) => {
                    format::render_next(contest, self.clock.now(), self.config.display_offset())
                }
                None => Message::notice(NO_UPCOMING),
            },
            Err(e) => fetch_failure(e),
        }
    }

    async fn status(&self) -> Message {
        let feed_state = match self.upcoming().await {
            Ok(upcoming) => format!("✅ reachable ({} upcoming)", upcoming.len()),
            Err(e) => {
                tracing::warn!(error = %e, "Feed check failed during status command");
                "❌ unreachable".to_string()
            }
        };
        Message::new("📊 Bot Status", COLOR_STATUS)
            .with_field("Feed", self.config.feed_url())
            .with_field("Feed state", feed_state)
            .with_field(
                "Update interval",
                format::format_std_duration(self.config.update_interval()),
            )
            .with_field("Contests shown", self.config.max_contests().to_string())
    }

    fn help(&self) -> Message {
        let prefix = self.config.command_prefix();
        let mut message = Message::new("🤖 Contest Bot Help", COLOR_HELP)
            .with_description("I help you stay updated with upcoming contests!");
        for command in Command::ALL {
            message = message.with_field(format!("{}{}", prefix, command.name()), command.description());
        }
        message.with_footer(format!("Data from {}", self.config.feed_url()))
    }
}

fn fetch_failure(e: NotifierError) -> Message {
    tracing::error!(error = %e, "Error fetching contests for command");
    Message::notice(e.user_friendly_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_prefix() {
        assert_eq!(parse_command("!contest", "!"), Some(Command::Contest));
        assert_eq!(parse_command("  !next please", "!"), Some(Command::Next));
        assert_eq!(parse_command("?status", "?"), Some(Command::Status));
        assert_eq!(parse_command("bot.help", "bot."), Some(Command::Help));
    }

    #[test]
    fn test_parse_command_rejects_other_text() {
        assert_eq!(parse_command("contest", "!"), None);
        assert_eq!(parse_command("!contests", "!"), None);
        assert_eq!(parse_command("!unknown", "!"), None);
        assert_eq!(parse_command("", "!"), None);
        assert_eq!(parse_command("hello !contest", "!"), None);
    }
}
