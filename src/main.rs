use anyhow::Context;
use clap::Parser;
use contest_notifier::domain::ports::Channel;
use contest_notifier::utils::logger;
use contest_notifier::{
    run_scheduled, AppConfig, Cli, CliCommand, CommandDispatcher, ConsoleChannel, CycleOrchestrator, FeedClient,
    JsonFileStore, Notifier, NotifierError, SystemClock, WebhookChannel,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            let e = NotifierError::from(e);
            eprintln!("{} {}", e.user_friendly_message(), e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if cli.json_logs {
        logger::init_json_logger(&config.log_level, cli.verbose);
    } else {
        logger::init_cli_logger(&config.log_level, cli.verbose);
    }

    tracing::info!(
        feed = %config.feed_url,
        format = %config.feed_format,
        interval = ?config.update_interval,
        "Starting contest-notifier"
    );
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let feed = Arc::new(
        FeedClient::new(&config.feed_url, config.feed_format, config.request_timeout)
            .context("failed to build feed client")?,
    );
    let channel = build_channel(&config, cli.dry_run);

    match cli.command() {
        CliCommand::Run => {
            let store = JsonFileStore::new(&config.state_path);
            let notifier = Notifier::new(channel, config.display_offset);
            let mut orchestrator = CycleOrchestrator::new(feed, store, notifier, SystemClock);

            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Could not listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            };
            let summary = run_scheduled(&mut orchestrator, config.update_interval, shutdown).await;
            tracing::info!(
                cycles = summary.cycles,
                failed_cycles = summary.failed_cycles,
                announcements = summary.announcements,
                "Stopped"
            );
        }
        CliCommand::Once => {
            let store = JsonFileStore::new(&config.state_path);
            let notifier = Notifier::new(channel, config.display_offset);
            let mut orchestrator = CycleOrchestrator::new(feed, store, notifier, SystemClock);

            match orchestrator.run_cycle().await {
                Ok(report) => {
                    println!(
                        "✅ Cycle finished: {} upcoming, {} announced, {} failed",
                        report.upcoming,
                        report.notified.len(),
                        report.failed.len()
                    );
                    if let Some(e) = &report.save_error {
                        eprintln!("⚠️ State was not saved: {}", e);
                    }
                }
                Err(e) => exit_with(&e),
            }
        }
        CliCommand::Reply { text, deliver } => {
            let text = text.join(" ");
            let dispatcher = CommandDispatcher::new(feed, config.clone(), SystemClock);
            let Some(reply) = dispatcher.handle_text(&text).await else {
                eprintln!(
                    "'{}' is not a command. Try {}help",
                    text, config.command_prefix
                );
                std::process::exit(2);
            };

            if deliver {
                if let Err(e) = channel.deliver(&reply).await {
                    tracing::error!(error = %e, "Could not deliver command reply");
                    exit_with(&NotifierError::from(e));
                }
            } else {
                println!("{}", reply.to_plain_text());
            }
        }
    }

    Ok(())
}

fn build_channel(config: &AppConfig, dry_run: bool) -> Arc<dyn Channel> {
    match &config.webhook_url {
        Some(url) if !dry_run => {
            tracing::info!(style = %config.webhook_style, "Delivering to webhook");
            Arc::new(WebhookChannel::new(url.clone(), config.webhook_style).with_timeout(config.request_timeout))
        }
        _ => {
            tracing::info!("No webhook in use; printing messages to stdout");
            Arc::new(ConsoleChannel)
        }
    }
}

fn exit_with(e: &NotifierError) -> ! {
    eprintln!("{}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
