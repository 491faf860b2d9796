//! votegate daemon — entry point for running and administering the gate.

mod console;
mod replay;

use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use console::ConsolePlatform;
use votegate_gate::{GateConfig, GateService, StopSignal};
use votegate_platform::{ConfigStore, TomlConfigStore};
use votegate_types::{ChannelId, CommunityId, RoleId};
use votegate_utils::{init_logging, LogFormat};
use votegate_voting::{SettingsEditor, VoteSetup};

#[derive(Parser)]
#[command(name = "votegate-daemon", about = "Vote-to-join gate for chat communities")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are used
    /// as the base; CLI flags and env vars override them.
    #[arg(long, env = "VOTEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTEGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTEGATE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Per-community settings file (overrides `communities_path`).
    #[arg(long, env = "VOTEGATE_COMMUNITIES")]
    communities: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Feed recorded gateway events (JSON lines) through the gate, logging
    /// every outbound action instead of performing it.
    Replay {
        /// Event log, one JSON event per line.
        #[arg(long)]
        events: PathBuf,

        /// Handle events one at a time, in file order.
        #[arg(long)]
        sequential: bool,
    },

    /// Print a community's vote settings.
    Info {
        #[arg(long)]
        community: u64,
    },

    /// Change a community's vote settings.
    Settings {
        #[arg(long)]
        community: u64,

        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Subcommand)]
enum SettingsAction {
    /// Enable or disable vote-to-join.
    Toggle,
    /// Add a role granted on admission.
    AddRole { role: u64 },
    /// Remove a role granted on admission.
    RemoveRole { role: u64 },
    /// Set the approval channel; omit to grant roles on join without a vote.
    SetChannel { channel: Option<u64> },
    /// Set the approval message; omit to restore the default.
    SetApprovalMessage { text: Option<String> },
    /// Configure a vote in one step, or reset everything but the roles.
    Setup {
        /// Approval channel. Without it the settings are reset.
        #[arg(long)]
        channel: Option<u64>,
        #[arg(long, default_value_t = 3)]
        positive_threshold: u32,
        #[arg(long, default_value_t = 1)]
        negative_threshold: u32,
        #[arg(long)]
        positive_symbol: Option<String>,
        #[arg(long)]
        negative_symbol: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Set the success announcement; omit to restore the default.
    SetSuccessMessage { text: Option<String> },
    /// Set the cancellation announcement; omit to restore the default.
    SetCancelMessage { text: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => GateConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GateConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(path) = cli.communities {
        config.communities_path = path;
    }

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level);

    let store = Arc::new(
        TomlConfigStore::open(&config.communities_path)
            .await
            .with_context(|| format!("opening {}", config.communities_path.display()))?,
    );
    let platform = Arc::new(ConsolePlatform::new(config.bot_account));

    match cli.command {
        Command::Replay { events, sequential } => {
            let text = std::fs::read_to_string(&events)
                .with_context(|| format!("reading {}", events.display()))?;
            let events = replay::parse_events(&text)?;
            if sequential {
                config.max_concurrent_events = 1;
            }
            tracing::info!(
                "replaying {} events (max {} concurrent, settings from {})",
                events.len(),
                config.max_concurrent_events,
                store.path().display(),
            );
            let stats = replay_events(&config, store, platform, events).await?;
            for (name, count) in stats {
                println!("{name:>18}: {count}");
            }
            Ok(())
        }
        Command::Info { community } => {
            let editor = SettingsEditor::new(store, platform);
            let summary = editor.summary(CommunityId::new(community)).await?;
            println!("{summary}");
            Ok(())
        }
        Command::Settings { community, action } => {
            let editor = SettingsEditor::new(store, platform);
            let reply = apply_setting(&editor, CommunityId::new(community), action).await?;
            println!("{reply}");
            Ok(())
        }
    }
}

async fn replay_events(
    config: &GateConfig,
    store: Arc<dyn ConfigStore>,
    platform: Arc<ConsolePlatform>,
    events: Vec<votegate_types::GatewayEvent>,
) -> anyhow::Result<BTreeMap<&'static str, u64>> {
    let service = Arc::new(GateService::new(
        store,
        platform,
        config.max_concurrent_events,
    ));
    let stop = Arc::new(StopSignal::new());
    let (tx, rx) = tokio::sync::mpsc::channel(config.event_buffer);

    let runner = tokio::spawn(service.clone().run(rx, stop.receiver()));
    let signals = {
        let stop = stop.clone();
        tokio::spawn(async move { stop.trip_on_os_signal().await })
    };

    for event in events {
        if tx.send(event).await.is_err() {
            tracing::warn!("event loop stopped early, remaining events dropped");
            break;
        }
    }
    drop(tx);

    runner.await.context("event loop panicked")?;
    signals.abort();

    let mut stats = service.stats().snapshot();
    stats.insert("votes_still_open", service.registry().len().await as u64);
    Ok(stats)
}

async fn apply_setting(
    editor: &SettingsEditor,
    community: CommunityId,
    action: SettingsAction,
) -> anyhow::Result<String> {
    let reply = match action {
        SettingsAction::Toggle => editor.toggle(community).await?,
        SettingsAction::AddRole { role } => editor.add_role(community, RoleId::new(role)).await?,
        SettingsAction::RemoveRole { role } => {
            editor.remove_role(community, RoleId::new(role)).await?
        }
        SettingsAction::SetChannel { channel } => {
            editor
                .set_channel(community, channel.map(ChannelId::new))
                .await?
        }
        SettingsAction::SetApprovalMessage { text } => {
            editor.set_approval_message(community, text).await?
        }
        SettingsAction::Setup {
            channel,
            positive_threshold,
            negative_threshold,
            positive_symbol,
            negative_symbol,
            message,
        } => {
            let setup = channel.map(|channel| {
                let mut setup = VoteSetup::new(ChannelId::new(channel));
                setup.positive_threshold = positive_threshold;
                setup.negative_threshold = negative_threshold;
                if let Some(symbol) = positive_symbol {
                    setup.positive_symbol = symbol;
                }
                if let Some(symbol) = negative_symbol {
                    setup.negative_symbol = symbol;
                }
                if let Some(message) = message {
                    setup.approval_message = message;
                }
                setup
            });
            editor.setup(community, setup).await?
        }
        SettingsAction::SetSuccessMessage { text } => {
            editor.set_success_message(community, text).await?
        }
        SettingsAction::SetCancelMessage { text } => {
            editor.set_cancel_message(community, text).await?
        }
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_settings_subcommand() {
        let cli = Cli::try_parse_from([
            "votegate-daemon",
            "--log-format",
            "json",
            "settings",
            "--community",
            "7",
            "setup",
            "--channel",
            "500",
            "--positive-threshold",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.log_format.as_deref(), Some("json"));
        let Command::Settings { community, action } = cli.command else {
            panic!("expected the settings subcommand");
        };
        assert_eq!(community, 7);
        assert!(matches!(
            action,
            SettingsAction::Setup {
                channel: Some(500),
                positive_threshold: 2,
                negative_threshold: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn settings_commands_update_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("communities.toml");
        let store = Arc::new(TomlConfigStore::open(&path).await.unwrap());
        let platform = Arc::new(ConsolePlatform::new(votegate_types::AccountId::new(1)));
        let editor = SettingsEditor::new(store, platform);
        let community = CommunityId::new(3);

        apply_setting(&editor, community, SettingsAction::AddRole { role: 42 })
            .await
            .unwrap();
        apply_setting(&editor, community, SettingsAction::Toggle)
            .await
            .unwrap();

        let reopened = TomlConfigStore::open(&path).await.unwrap();
        let config = reopened.load_config(community).await.unwrap();
        assert!(config.enabled);
        assert_eq!(config.roles(), vec![RoleId::new(42)]);
    }

    #[tokio::test]
    async fn replay_runs_a_vote_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("communities.toml");
        std::fs::write(
            &path,
            r#"
[communities.1]
enabled = true
target_roles = [42]
approval_channel = 500
positive_threshold = 1
"#,
        )
        .unwrap();
        let store = Arc::new(TomlConfigStore::open(&path).await.unwrap());
        let platform = Arc::new(ConsolePlatform::new(votegate_types::AccountId::new(999)));
        let events = replay::parse_events(
            r#"{"type":"member_joined","community":1,"account":50}
{"type":"reaction_added","community":1,"message":1,"account":60,"symbol":"✅"}"#,
        )
        .unwrap();
        let config = GateConfig {
            max_concurrent_events: 1,
            ..Default::default()
        };

        let stats = replay_events(&config, store, platform, events).await.unwrap();
        assert_eq!(stats["votes_opened"], 1);
        assert_eq!(stats["votes_approved"], 1);
        assert_eq!(stats["votes_still_open"], 0);
    }
}
