// ─── Process Supervisor ───
// Runs the launch pipeline for one request: runtime install, natives,
// companion plugin, then hands the prepared options to the launch primitive
// and relays its events to the observer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::auth::LaunchAccountProfile;
use crate::core::config::CompanionSettings;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::BundleResolver;
use crate::core::profile::{ServerProfile, NETWORK_TIMEOUT_JVM_ARGS};
use crate::core::provision::{
    ensure_companion, ensure_installed, ensure_natives, CompanionOutcome, NativesOutcome,
    RuntimeInstallOutcome,
};

use super::events::{normalize_progress, LaunchObserver};
use super::params::LaunchParams;
use super::primitive::{LaunchOptions, LaunchPrimitive, PrimitiveEvent};

/// A started game. Dropping it does not stop the game; `wait` resolves
/// once the primitive has reported the process exit.
#[derive(Debug)]
pub struct LaunchHandle {
    pub profile_id: String,
    pub started_at: DateTime<Utc>,
    events: JoinHandle<Option<i32>>,
}

impl LaunchHandle {
    /// Exit code of the game, `None` if it was killed or never reported one.
    pub async fn wait(self) -> Option<i32> {
        self.events.await.unwrap_or(None)
    }
}

pub struct Launcher<P: LaunchPrimitive> {
    primitive: Arc<P>,
    resolver: BundleResolver,
    companion: CompanionSettings,
    observer: LaunchObserver,
}

impl<P: LaunchPrimitive> Launcher<P> {
    pub fn new(
        primitive: P,
        resolver: BundleResolver,
        companion: CompanionSettings,
        observer: LaunchObserver,
    ) -> Self {
        Self {
            primitive: Arc::new(primitive),
            resolver,
            companion,
            observer,
        }
    }

    pub fn observer(&self) -> &LaunchObserver {
        &self.observer
    }

    /// Provision and start the game described by `params`. Resolves when the
    /// process has been handed off, not when it exits. Any provisioning
    /// failure aborts before a process is started; whatever was already
    /// copied stays on disk for the next attempt.
    pub async fn launch(&self, params: LaunchParams) -> LauncherResult<LaunchHandle> {
        let profile = params.profile;
        self.observer.log(format!("Preparing launch: {}", profile.name));

        if profile.needs_runtime_provisioning() {
            self.provision_runtime(&profile).await?;
        }
        self.install_companion(&profile).await?;

        let mut jvm_args = params.jvm_args;
        ensure_timeout_flags(&mut jvm_args);

        let options = LaunchOptions {
            root: profile.install_root.clone(),
            version: profile.version.clone(),
            memory: profile.memory.clone(),
            jvm_args,
            account: LaunchAccountProfile::offline(&params.username),
            server: profile.server.clone(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let events = tokio::spawn(forward_events(rx, self.observer.clone()));

        self.observer.log(describe_version(&profile));
        info!("Starting {} for {}", profile.version.launch_id(), params.username);
        self.primitive.launch(options, tx).await?;

        Ok(LaunchHandle {
            profile_id: profile.id,
            started_at: Utc::now(),
            events,
        })
    }

    async fn provision_runtime(&self, profile: &ServerProfile) -> LauncherResult<()> {
        self.observer.log("[Runtime] Checking mod loader runtime...");

        let owned = profile.clone();
        let resolver = self.resolver.clone();
        let (installed, natives) = tokio::task::spawn_blocking(move || {
            let installed = ensure_installed(&owned, &resolver)?;
            let natives = ensure_natives(&owned)?;
            Ok::<_, LauncherError>((installed, natives))
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))??;

        match installed {
            RuntimeInstallOutcome::AlreadyInstalled { custom_id } => {
                self.observer.log(format!("[Runtime] {} already installed", custom_id));
            }
            RuntimeInstallOutcome::Installed {
                custom_id,
                bundle,
                files_copied,
            } => {
                self.observer.log(format!(
                    "[Runtime] Installed {} from {} ({} files)",
                    custom_id,
                    bundle.display(),
                    files_copied
                ));
            }
        }

        match natives {
            NativesOutcome::AlreadyPresent => {
                self.observer.log("[Natives] Already prepared");
            }
            NativesOutcome::Extracted {
                count,
                missing_archives,
            } => {
                for archive in missing_archives {
                    self.observer
                        .log(format!("[Natives] Archive not found: {}", archive.display()));
                }
                self.observer
                    .log(format!("[Natives] Ready, extracted {} files", count));
            }
        }

        Ok(())
    }

    async fn install_companion(&self, profile: &ServerProfile) -> LauncherResult<()> {
        let profile_id = profile.id.clone();
        let root = profile.install_root.clone();
        let settings = self.companion.clone();
        let resolver = self.resolver.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            ensure_companion(&profile_id, &root, &settings, &resolver)
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))?;

        match outcome {
            CompanionOutcome::NotApplicable => {}
            CompanionOutcome::Installed { destination, .. } => {
                self.observer
                    .log(format!("[Companion] Installed {}", destination.display()));
            }
            CompanionOutcome::Skipped { reason } => {
                self.observer.log(format!("[Companion] Warning: {}", reason));
            }
        }
        Ok(())
    }
}

/// Prepend each network-timeout flag that is not already present.
pub fn ensure_timeout_flags(jvm_args: &mut Vec<String>) {
    for flag in NETWORK_TIMEOUT_JVM_ARGS {
        if !jvm_args.iter().any(|arg| arg == flag) {
            jvm_args.insert(0, flag.to_string());
        }
    }
}

fn describe_version(profile: &ServerProfile) -> String {
    let version = &profile.version;
    match version.custom_id() {
        Some(custom) => format!(
            "Launching Minecraft: {} ({}, {})",
            version.number, version.kind, custom
        ),
        None => format!("Launching Minecraft: {} ({})", version.number, version.kind),
    }
}

async fn forward_events(
    mut rx: mpsc::UnboundedReceiver<PrimitiveEvent>,
    observer: LaunchObserver,
) -> Option<i32> {
    let mut exit_code = None;

    while let Some(event) = rx.recv().await {
        match event {
            PrimitiveEvent::Debug(line) | PrimitiveEvent::Data(line) => observer.log(line),
            PrimitiveEvent::Progress(raw) => observer.progress(&normalize_progress(&raw)),
            PrimitiveEvent::Close(code) => {
                match code {
                    Some(0) => info!("Game exited normally"),
                    Some(code) => warn!("Game exited with code {}", code),
                    None => error!("Game exited without an exit code"),
                }
                observer.log(match code {
                    Some(code) => format!("Game exited with code {}", code),
                    None => "Game exited without an exit code".to_string(),
                });
                exit_code = code;
            }
        }
    }

    exit_code
}
