//! Command-line front-end over the launcher commands.
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::commands;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{LaunchObserver, LaunchRequest};
use crate::core::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "onlyus-launcher")]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Increase verbosity (-v for debug output, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding launcher_config.json, profiles.json and the install roots
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision a profile and start the game, waiting for it to exit
    Launch {
        /// Profile id, e.g. `vanilla` or `hitech`
        profile: String,

        #[arg(short, long)]
        username: String,

        /// Requested heap ceiling in GiB
        #[arg(long)]
        ram_gb: Option<f64>,

        /// Identity token forwarded to the companion plugin
        #[arg(long)]
        token: Option<String>,
    },

    /// Check that the configured Java binary runs
    CheckJava,

    /// List the configured profiles
    Profiles,
}

impl Command {
    pub async fn run(self, base_dir: Option<PathBuf>) -> LauncherResult<()> {
        let observer = LaunchObserver::new(
            |line| info!(target: "game", "{}", line),
            |event| debug!("[{}] {} {:?}%", event.kind, event.task, event.percent),
        );
        let state = match base_dir {
            Some(base_dir) => AppState::with_base_dir(base_dir, observer),
            None => AppState::new(observer),
        };
        let state = Arc::new(Mutex::new(state));

        match self {
            Self::Launch {
                profile,
                username,
                ram_gb,
                token,
            } => {
                let request = LaunchRequest {
                    profile_id: profile,
                    username,
                    ram_gb,
                    identity_token: token,
                };
                let (outcome, code) = commands::launch_and_wait(&state, request).await;
                if let Some(error) = outcome.error {
                    return Err(LauncherError::Other(error));
                }
                match code {
                    Some(0) | None => Ok(()),
                    Some(code) => Err(LauncherError::Other(format!(
                        "Game exited with code {}",
                        code
                    ))),
                }
            }
            Self::CheckJava => {
                let check = commands::check_java(&state).await;
                println!("{}", serde_json::to_string_pretty(&check)?);
                if check.installed {
                    Ok(())
                } else {
                    Err(LauncherError::Other("Java is not available".into()))
                }
            }
            Self::Profiles => {
                for profile in commands::list_profiles(&state).await {
                    println!(
                        "{:<10} {:<24} {:<32} max {:<4} {}",
                        profile.id,
                        profile.name,
                        profile.version,
                        profile.memory_max,
                        profile.install_root.display()
                    );
                }
                Ok(())
            }
        }
    }
}
