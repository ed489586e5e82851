// ─── Commands ───
// Front-end facing operations. Every call returns a plain serializable
// value so a UI bridge or the CLI can forward it as-is.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java::{self, JavaCheck};
use crate::core::launch::{LaunchHandle, LaunchParams, LaunchPrimitive, LaunchRequest};
use crate::core::profile::VersionKind;
use crate::core::state::AppState;

pub type SharedState<P> = Arc<Mutex<AppState<P>>>;

/// Result of a launch command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LaunchOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(err: &LauncherError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub install_root: PathBuf,
    pub version: String,
    pub version_type: VersionKind,
    pub memory_max: String,
    pub running: bool,
}

/// Provision and start the requested profile. Failures are reported through
/// the log observer as `Launch failed: ...` and returned, never raised.
pub async fn launch_minecraft<P>(state: &SharedState<P>, request: LaunchRequest) -> LaunchOutcome
where
    P: LaunchPrimitive + 'static,
{
    match launch_tracked(state, &request).await {
        Ok(_) => LaunchOutcome::ok(),
        Err(outcome) => outcome,
    }
}

/// Like [`launch_minecraft`] but also waits for the game to exit. The exit
/// code is `None` when the launch failed or the process was killed.
pub async fn launch_and_wait<P>(
    state: &SharedState<P>,
    request: LaunchRequest,
) -> (LaunchOutcome, Option<i32>)
where
    P: LaunchPrimitive + 'static,
{
    match launch_tracked(state, &request).await {
        Ok(waiter) => (LaunchOutcome::ok(), waiter.await.unwrap_or(None)),
        Err(outcome) => (outcome, None),
    }
}

async fn launch_tracked<P>(
    state: &SharedState<P>,
    request: &LaunchRequest,
) -> Result<JoinHandle<Option<i32>>, LaunchOutcome>
where
    P: LaunchPrimitive + 'static,
{
    let mut guard = state.lock().await;

    let handle = match start_launch(&guard, request).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("Launch of '{}' failed: {}", request.profile_id, err);
            guard.launcher.observer().log(format!("Launch failed: {}", err));
            return Err(LaunchOutcome::failed(&err));
        }
    };

    let profile_id = handle.profile_id.clone();
    guard
        .running_profiles
        .insert(profile_id.clone(), handle.started_at);
    info!("Profile '{}' handed off at {}", profile_id, handle.started_at);
    drop(guard);

    // Clear the running marker once the game exits.
    let state = state.clone();
    Ok(tokio::spawn(async move {
        let code = handle.wait().await;
        info!("Profile '{}' finished with {:?}", profile_id, code);
        state.lock().await.running_profiles.remove(&profile_id);
        code
    }))
}

async fn start_launch<P: LaunchPrimitive>(
    state: &AppState<P>,
    request: &LaunchRequest,
) -> LauncherResult<LaunchHandle> {
    let params = LaunchParams::build(&state.catalog, request, state.config.memory_limits)?;
    state.launcher.launch(params).await
}

/// Probe the configured Java binary.
pub async fn check_java<P: LaunchPrimitive>(state: &SharedState<P>) -> JavaCheck {
    let java = state.lock().await.config.java_binary();
    java::check_java(&java).await
}

pub async fn list_profiles<P: LaunchPrimitive>(state: &SharedState<P>) -> Vec<ProfileSummary> {
    let state = state.lock().await;
    state
        .catalog
        .profiles()
        .iter()
        .map(|profile| ProfileSummary {
            id: profile.id.clone(),
            name: profile.name.clone(),
            install_root: profile.install_root.clone(),
            version: profile.version.launch_id().to_string(),
            version_type: profile.version.kind,
            memory_max: profile.memory.max.clone(),
            running: state.is_running(&profile.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LauncherConfig;
    use crate::core::launch::{LaunchObserver, LaunchOptions, PrimitiveEvent, PrimitiveSender};
    use crate::core::profile::ProfileCatalog;
    use std::sync::Mutex as StdMutex;

    /// Exits as soon as it starts.
    struct InstantExit;

    #[async_trait::async_trait]
    impl LaunchPrimitive for InstantExit {
        async fn launch(&self, _options: LaunchOptions, events: PrimitiveSender) -> LauncherResult<()> {
            let _ = events.send(PrimitiveEvent::Close(Some(0)));
            Ok(())
        }
    }

    fn shared_state(base: &std::path::Path, lines: Arc<StdMutex<Vec<String>>>) -> SharedState<InstantExit> {
        let observer = LaunchObserver::new(move |line| lines.lock().unwrap().push(line.to_string()), |_| {});
        let mut config = LauncherConfig::load(base);
        config.asset_roots = vec![base.join("no-assets")];
        let catalog = ProfileCatalog::builtin(base);
        Arc::new(Mutex::new(AppState::with_primitive(config, catalog, InstantExit, observer)))
    }

    #[tokio::test]
    async fn unknown_profile_reports_failure() {
        let temp = tempfile::tempdir().unwrap();
        let lines = Arc::new(StdMutex::new(Vec::new()));
        let state = shared_state(temp.path(), lines.clone());

        let outcome = launch_minecraft(
            &state,
            LaunchRequest {
                profile_id: "missing".into(),
                username: "Steve".into(),
                ..LaunchRequest::default()
            },
        )
        .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Unknown profile: missing"));
        assert_eq!(
            lines.lock().unwrap().last().map(String::as_str),
            Some("Launch failed: Unknown profile: missing")
        );
    }

    #[tokio::test]
    async fn profile_without_runtime_launches() {
        let temp = tempfile::tempdir().unwrap();
        let lines = Arc::new(StdMutex::new(Vec::new()));
        let state = shared_state(temp.path(), lines);

        let outcome = launch_minecraft(
            &state,
            LaunchRequest {
                profile_id: "hitech".into(),
                username: "Alex".into(),
                ram_gb: Some(8.0),
                identity_token: None,
            },
        )
        .await;

        assert_eq!(outcome, LaunchOutcome::ok());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn running_marker_is_cleared_after_exit() {
        let temp = tempfile::tempdir().unwrap();
        let state = shared_state(temp.path(), Arc::new(StdMutex::new(Vec::new())));

        let (outcome, code) = launch_and_wait(
            &state,
            LaunchRequest {
                profile_id: "hitech".into(),
                username: "Alex".into(),
                ..LaunchRequest::default()
            },
        )
        .await;

        assert!(outcome.success);
        assert_eq!(code, Some(0));
        assert!(!state.lock().await.is_running("hitech"));
    }

    #[tokio::test]
    async fn profiles_are_listed_with_launch_ids() {
        let temp = tempfile::tempdir().unwrap();
        let state = shared_state(temp.path(), Arc::new(StdMutex::new(Vec::new())));

        let profiles = list_profiles(&state).await;

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, "vanilla");
        assert_eq!(profiles[0].version, "forge-1.12.2-14.23.5.2864");
        assert_eq!(profiles[1].memory_max, "6G");
        assert!(profiles.iter().all(|p| !p.running));
    }
}
