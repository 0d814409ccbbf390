pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, CliCommand};
pub use config::AppConfig;

pub use adapters::{ConsoleChannel, FeedClient, FeedFormat, JsonFileStore, WebhookChannel, WebhookStyle};
pub use crate::core::{
    clock::SystemClock,
    commands::CommandDispatcher,
    cycle::{CycleOrchestrator, CycleReport},
    notifier::Notifier,
    scheduler::run_scheduled,
};
pub use domain::model::{Contest, Message, SeenSet};
pub use utils::error::{NotifierError, Result};
