// ─── Java Process Launcher ───
// Built-in launch primitive: reads the version JSON from the install root,
// assembles the JVM command line and runs the game as a child process.

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::natives_dir_for;
use crate::core::version::VersionJson;

use super::events::RawProgress;
use super::primitive::{LaunchOptions, LaunchPrimitive, PrimitiveEvent, PrimitiveSender};

const LAUNCHER_NAME: &str = "onlyus-launcher";
const LAUNCHER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchDiagnostic {
    NativesNotLoaded,
    MainClassMissing,
}

fn detect_launch_diagnostic(line: &str) -> Option<LaunchDiagnostic> {
    if line.contains("UnsatisfiedLinkError") || line.contains("no lwjgl") {
        return Some(LaunchDiagnostic::NativesNotLoaded);
    }

    if line.contains("Could not find or load main class") || line.contains("ClassNotFoundException: net.minecraft") {
        return Some(LaunchDiagnostic::MainClassMissing);
    }

    None
}

fn diagnostic_message(diagnostic: LaunchDiagnostic) -> &'static str {
    match diagnostic {
        LaunchDiagnostic::NativesNotLoaded => {
            "[Diagnostics] The JVM could not load LWJGL natives. Delete the natives/<version> folder of this install and launch again to re-extract them."
        }
        LaunchDiagnostic::MainClassMissing => {
            "[Diagnostics] The game's main class is not on the classpath. The versions/ or libraries/ folder of this install is incomplete."
        }
    }
}

/// Runs the game with a local Java binary.
#[derive(Debug, Clone)]
pub struct JavaProcessLauncher {
    java: PathBuf,
}

impl JavaProcessLauncher {
    pub fn new(java: impl Into<PathBuf>) -> Self {
        Self { java: java.into() }
    }
}

#[async_trait]
impl LaunchPrimitive for JavaProcessLauncher {
    async fn launch(&self, options: LaunchOptions, events: PrimitiveSender) -> LauncherResult<()> {
        let args = {
            let options = options.clone();
            let events = events.clone();
            tokio::task::spawn_blocking(move || prepare_arguments(&options, &events))
                .await
                .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))??
        };

        let natives_dir = natives_dir_for(&options.root, &options.version.number);
        let mut cmd = Command::new(&self.java);
        cmd.args(&args)
            .current_dir(&options.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let (library_var, library_path) = native_library_env(&natives_dir);
        cmd.env(library_var, library_path);

        let command_line = command_line_for_logs(&self.java, &args);
        info!("Launching Minecraft with Java: {:?}", self.java);
        debug!("Command: {}", command_line);
        let _ = events.send(PrimitiveEvent::Debug(format!("[Launch] {}", command_line)));

        let mut child = cmd
            .spawn()
            .map_err(|e| LauncherError::JavaExecution(format!("{:?}: {}", self.java, e)))?;
        if let Some(pid) = child.id() {
            let _ = events.send(PrimitiveEvent::Debug(format!("[Launch] Game process started (PID {})", pid)));
        }

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(forward_lines(stdout, events.clone(), false)));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(forward_lines(stderr, events.clone(), true)));

        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => {
                    info!("Minecraft exited with status: {:?}", status);
                    status.code()
                }
                Err(e) => {
                    warn!("Failed while waiting for Minecraft: {}", e);
                    let _ = events.send(PrimitiveEvent::Debug(format!("[Launch] Wait failed: {}", e)));
                    None
                }
            };
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                let _ = task.await;
            }
            let _ = events.send(PrimitiveEvent::Close(code));
        });

        Ok(())
    }
}

async fn forward_lines<R>(stream: R, events: PrimitiveSender, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut seen = Vec::new();

    while let Ok(Some(line)) = lines.next_line().await {
        let diagnostic = if is_stderr { detect_launch_diagnostic(&line) } else { None };
        let _ = events.send(PrimitiveEvent::Data(line));

        if let Some(diagnostic) = diagnostic {
            if !seen.contains(&diagnostic) {
                seen.push(diagnostic);
                let _ = events.send(PrimitiveEvent::Debug(diagnostic_message(diagnostic).into()));
            }
        }
    }
}

/// Full argument list after the java binary. Blocking: reads version
/// metadata and checks library files.
pub fn prepare_arguments(options: &LaunchOptions, events: &PrimitiveSender) -> LauncherResult<Vec<String>> {
    let launch_id = options.version.launch_id();
    let versions_dir = options.root.join("versions");
    let version = VersionJson::load(&versions_dir, launch_id)?;
    let _ = events.send(PrimitiveEvent::Debug(format!(
        "[Launch] Loaded version metadata for {}",
        launch_id
    )));

    let classpath = resolve_classpath(options, &version, events)?;
    build_arguments(options, &version, &classpath)
}

/// Libraries, then the custom version jar, then the base version jar.
pub fn resolve_classpath(
    options: &LaunchOptions,
    version: &VersionJson,
    events: &PrimitiveSender,
) -> LauncherResult<String> {
    let libs_dir = options.root.join("libraries");
    let libraries: Vec<_> = version
        .libraries
        .iter()
        .filter(|lib| lib.is_allowed_for_current_os() && !lib.is_natives_only())
        .collect();
    let total = libraries.len();

    let mut entries = Vec::with_capacity(total + 2);
    for (index, lib) in libraries.iter().enumerate() {
        let _ = events.send(PrimitiveEvent::Progress(RawProgress {
            kind: Some("classes".into()),
            current: Some((index + 1) as f64),
            total: Some(total as f64),
            name: Some(lib.name.clone()),
            ..RawProgress::default()
        }));

        let relative = match lib.local_path() {
            Ok(path) => path,
            Err(e) => {
                let _ = events.send(PrimitiveEvent::Debug(format!("[Classpath] Skipping {}: {}", lib.name, e)));
                continue;
            }
        };
        let jar = libs_dir.join(relative);
        if jar.is_file() {
            entries.push(safe_path_str(&jar));
        } else {
            let _ = events.send(PrimitiveEvent::Debug(format!("[Classpath] Missing library {:?}", jar)));
        }
    }

    let versions_dir = options.root.join("versions");
    let mut version_ids = Vec::new();
    if let Some(custom_id) = options.version.custom_id() {
        version_ids.push(custom_id.to_string());
    }
    version_ids.push(version.jar.clone().unwrap_or_else(|| options.version.number.clone()));
    for id in version_ids {
        let jar = versions_dir.join(&id).join(format!("{}.jar", id));
        if jar.is_file() {
            entries.push(safe_path_str(&jar));
        }
    }

    dedup_preserving_order(&mut entries);
    if entries.is_empty() {
        return Err(LauncherError::Other(
            "Empty classpath: refusing to start java without any jar".into(),
        ));
    }

    Ok(entries.join(get_classpath_separator()))
}

pub fn build_arguments(options: &LaunchOptions, version: &VersionJson, classpath: &str) -> LauncherResult<Vec<String>> {
    let main_class = version
        .main_class
        .as_deref()
        .filter(|class| !class.trim().is_empty())
        .ok_or_else(|| {
            LauncherError::Other(format!(
                "Version {} does not declare a mainClass",
                options.version.launch_id()
            ))
        })?;

    let natives_dir = safe_path_str(&natives_dir_for(&options.root, &options.version.number));
    let libraries_dir = safe_path_str(&options.root.join("libraries"));
    let game_dir = safe_path_str(&options.root);
    let assets_dir = safe_path_str(&options.root.join("assets"));
    let account = &options.account;
    let launch_id = options.version.launch_id().to_string();

    let mut args = vec![
        format!("-Xms{}", options.memory.min),
        format!("-Xmx{}", options.memory.max),
        format!("-Djava.library.path={}", natives_dir),
    ];
    args.extend(options.jvm_args.iter().cloned());

    let jvm_values = [
        ("natives_directory", natives_dir.clone()),
        ("library_directory", libraries_dir),
        ("classpath_separator", get_classpath_separator().to_string()),
        ("launcher_name", LAUNCHER_NAME.to_string()),
        ("launcher_version", LAUNCHER_VERSION.to_string()),
        ("version_name", launch_id.clone()),
    ];
    args.extend(sanitize_jvm_args(&version.simple_jvm_args(), &jvm_values));

    args.push("-cp".into());
    args.push(classpath.to_string());
    args.push(main_class.to_string());

    let game_values = [
        ("auth_player_name", account.username.clone()),
        ("version_name", launch_id),
        ("game_directory", game_dir),
        ("assets_root", assets_dir.clone()),
        ("game_assets", assets_dir),
        ("assets_index_name", version.asset_index_name().to_string()),
        ("auth_uuid", account.uuid.clone()),
        ("auth_access_token", account.access_token.clone()),
        ("auth_session", account.access_token.clone()),
        ("user_properties", "{}".to_string()),
        ("user_type", account.user_type.clone()),
        ("version_type", "release".to_string()),
    ];
    args.extend(substitute_args(&version.simple_game_args(), &game_values));

    if let Some(server) = options.server.as_ref().filter(|s| !s.host.trim().is_empty()) {
        args.push("--server".into());
        args.push(server.host.clone());
        args.push("--port".into());
        args.push(server.port.to_string());
    }

    Ok(args)
}

/// Metadata JVM args minus any classpath they bring; `-cp` is always ours.
fn sanitize_jvm_args(raw_args: &[String], values: &[(&str, String)]) -> Vec<String> {
    let mut filtered = Vec::with_capacity(raw_args.len());
    let mut i = 0;
    while i < raw_args.len() {
        let arg = raw_args[i].as_str();
        if arg == "-cp" || arg == "-classpath" || arg == "--class-path" {
            i += 2;
            continue;
        }
        filtered.push(raw_args[i].clone());
        i += 1;
    }
    substitute_args(&filtered, values)
}

/// Replace `${key}` placeholders. An argument that still carries an unknown
/// placeholder is dropped together with the option flag in front of it.
fn substitute_args(raw_args: &[String], values: &[(&str, String)]) -> Vec<String> {
    let mut resolved_args = Vec::with_capacity(raw_args.len());

    for arg in raw_args {
        let resolved = values.iter().fold(arg.clone(), |acc, (key, value)| {
            acc.replace(&format!("${{{}}}", key), value)
        });

        if resolved.contains("${") {
            drop_dangling_option(&mut resolved_args);
            continue;
        }

        resolved_args.push(resolved);
    }

    resolved_args
}

fn drop_dangling_option(args: &mut Vec<String>) {
    if args.last().is_some_and(|last| last.starts_with('-')) {
        let _ = args.pop();
    }
}

pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

fn dedup_preserving_order(entries: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| seen.insert(entry.clone()));
}

/// Canonical path text, without the `\\?\` prefix Java cannot handle in
/// classpath entries on Windows.
pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

/// Loader search path variable for this OS, with the natives directory in
/// front of whatever the launcher itself inherited.
fn native_library_env(natives_dir: &Path) -> (&'static str, OsString) {
    let var = if cfg!(target_os = "windows") {
        "PATH"
    } else if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    };

    let natives = PathBuf::from(safe_path_str(natives_dir));
    let mut entries = vec![natives.clone()];
    if let Some(inherited) = std::env::var_os(var) {
        entries.extend(std::env::split_paths(&inherited).filter(|p| !p.as_os_str().is_empty()));
    }
    let value = std::env::join_paths(entries).unwrap_or_else(|_| natives.into_os_string());
    (var, value)
}

/// JVM properties whose values stay out of logs and the observer channel.
const SECRET_PROPERTIES: [&str; 1] = ["-Donlyus.token="];

fn redact_secret(arg: &str) -> Cow<'_, str> {
    match SECRET_PROPERTIES.iter().find(|prefix| arg.starts_with(*prefix)) {
        Some(prefix) if arg.len() > prefix.len() => Cow::Owned(format!("{}***", prefix)),
        _ => Cow::Borrowed(arg),
    }
}

/// Copy/paste-able command line with secrets masked.
fn command_line_for_logs(program: &Path, args: &[String]) -> String {
    let program = program.to_string_lossy();
    std::iter::once(quote_arg(&program))
        .chain(args.iter().map(|arg| quote_arg(&redact_secret(arg))))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '"' | '\'' | '$' | '&' | '|' | ';'));
    if plain {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::LaunchAccountProfile;
    use crate::core::profile::{MemoryBounds, ServerAddress, VersionSpec};
    use tokio::sync::mpsc;

    const FORGE_ID: &str = "forge-1.12.2-14.23.5.2864";

    fn options(root: &Path) -> LaunchOptions {
        LaunchOptions {
            root: root.to_path_buf(),
            version: VersionSpec::custom("1.12.2", FORGE_ID),
            memory: MemoryBounds::new("2G", "6G"),
            jvm_args: vec!["-Donlyus.user=Steve".into()],
            account: LaunchAccountProfile::offline("Steve"),
            server: None,
        }
    }

    fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn write_forge_install(root: &Path) {
        write_file(
            &root.join("versions/1.12.2/1.12.2.json"),
            &serde_json::json!({
                "id": "1.12.2",
                "mainClass": "net.minecraft.client.main.Main",
                "assetIndex": { "id": "1.12" },
                "libraries": [
                    { "name": "com.mojang:patchy:1.1" },
                    {
                        "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209",
                        "natives": { "windows": "natives-windows", "linux": "natives-linux", "osx": "natives-osx" }
                    },
                    { "name": "com.example:missing:1.0" }
                ],
                "minecraftArguments": "--username ${auth_player_name} --version ${version_name}"
            })
            .to_string(),
        );
        write_file(&root.join("versions/1.12.2/1.12.2.jar"), "vanilla");
        write_file(
            &root.join(format!("versions/{FORGE_ID}/{FORGE_ID}.json")),
            &serde_json::json!({
                "id": FORGE_ID,
                "inheritsFrom": "1.12.2",
                "mainClass": "net.minecraft.launchwrapper.Launch",
                "libraries": [{ "name": "net.minecraft:launchwrapper:1.12" }],
                "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --gameDir ${game_directory} --assetIndex ${assets_index_name} --uuid ${auth_uuid} --accessToken ${auth_access_token} --userType ${user_type} --width ${resolution_width} --tweakClass net.minecraftforge.fml.common.launcher.FMLTweaker"
            })
            .to_string(),
        );
        write_file(&root.join(format!("versions/{FORGE_ID}/{FORGE_ID}.jar")), "forge");
        write_file(&root.join("libraries/com/mojang/patchy/1.1/patchy-1.1.jar"), "lib");
        write_file(
            &root.join("libraries/net/minecraft/launchwrapper/1.12/launchwrapper-1.12.jar"),
            "lib",
        );
    }

    #[test]
    fn unknown_placeholder_drops_its_option() {
        let raw: Vec<String> = ["--username", "${auth_player_name}", "--width", "${resolution_width}", "--demo"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let resolved = substitute_args(&raw, &[("auth_player_name", "Steve".to_string())]);

        assert_eq!(resolved, vec!["--username", "Steve", "--demo"]);
    }

    #[test]
    fn metadata_classpath_is_stripped() {
        let raw: Vec<String> = ["-Djava.library.path=${natives_directory}", "-cp", "${classpath}", "-Dx=1"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let resolved = sanitize_jvm_args(&raw, &[("natives_directory", "/n".to_string())]);

        assert_eq!(resolved, vec!["-Djava.library.path=/n", "-Dx=1"]);
    }

    #[test]
    fn classpath_orders_libraries_then_custom_then_base_jar() {
        let temp = tempfile::tempdir().unwrap();
        write_forge_install(temp.path());
        let options = options(temp.path());
        let version = VersionJson::load(&temp.path().join("versions"), FORGE_ID).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let classpath = resolve_classpath(&options, &version, &tx).unwrap();
        drop(tx);

        let entries: Vec<&str> = classpath.split(get_classpath_separator()).collect();
        assert_eq!(entries.len(), 4);
        assert!(entries[0].ends_with("launchwrapper-1.12.jar"));
        assert!(entries[1].ends_with("patchy-1.1.jar"));
        assert!(entries[2].ends_with(&format!("{FORGE_ID}.jar")));
        assert!(entries[3].ends_with("1.12.2.jar"));

        let mut progress = 0;
        let mut missing = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                PrimitiveEvent::Progress(raw) => {
                    assert_eq!(raw.kind.as_deref(), Some("classes"));
                    assert_eq!(raw.total, Some(3.0));
                    progress += 1;
                }
                PrimitiveEvent::Debug(line) if line.contains("Missing library") => missing += 1,
                _ => {}
            }
        }
        assert_eq!(progress, 3);
        assert_eq!(missing, 1);
    }

    #[test]
    fn arguments_follow_jvm_then_game_layout() {
        let temp = tempfile::tempdir().unwrap();
        write_forge_install(temp.path());
        let mut options = options(temp.path());
        options.server = Some(ServerAddress {
            host: "play.example.org".into(),
            port: 25570,
        });
        let (tx, _rx) = mpsc::unbounded_channel();

        let args = prepare_arguments(&options, &tx).unwrap();

        assert_eq!(args[0], "-Xms2G");
        assert_eq!(args[1], "-Xmx6G");
        assert!(args[2].starts_with("-Djava.library.path="));
        assert!(args[2].ends_with("1.12.2"));
        assert_eq!(args[3], "-Donlyus.user=Steve");
        assert_eq!(args[4], "-cp");
        assert_eq!(args[6], "net.minecraft.launchwrapper.Launch");

        let game = &args[7..];
        assert_eq!(game[0..2], ["--username".to_string(), "Steve".to_string()]);
        assert!(game.contains(&FORGE_ID.to_string()));
        assert!(game.contains(&"1.12".to_string()));
        assert!(!game.contains(&"--width".to_string()));
        assert!(game.contains(&"--tweakClass".to_string()));
        assert_eq!(
            game[game.len() - 4..],
            [
                "--server".to_string(),
                "play.example.org".to_string(),
                "--port".to_string(),
                "25570".to_string()
            ]
        );
    }

    #[test]
    fn missing_version_metadata_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = prepare_arguments(&options(temp.path()), &tx).unwrap_err();

        assert!(matches!(err, LauncherError::VersionMetadataMissing(_)));
    }

    #[test]
    fn stderr_diagnostics_are_recognised() {
        assert_eq!(
            detect_launch_diagnostic("java.lang.UnsatisfiedLinkError: no lwjgl64 in java.library.path"),
            Some(LaunchDiagnostic::NativesNotLoaded)
        );
        assert_eq!(detect_launch_diagnostic("[main/INFO]: Setting user: Steve"), None);
    }

    #[test]
    fn natives_lead_the_library_search_path() {
        let natives = Path::new("/opt/onlyus/natives/1.12.2");
        let (var, value) = native_library_env(natives);

        assert!(["PATH", "DYLD_LIBRARY_PATH", "LD_LIBRARY_PATH"].contains(&var));
        let first = std::env::split_paths(&value).next().unwrap();
        assert_eq!(first, PathBuf::from(safe_path_str(natives)));
    }

    #[test]
    fn logged_command_masks_identity_token() {
        let args = vec![
            "-Xmx6G".to_string(),
            "-Donlyus.user=Steve".to_string(),
            "-Donlyus.token=s3cr3t-session".to_string(),
            "--gameDir".to_string(),
            "/games/Minecraft Vanilla".to_string(),
        ];

        let line = command_line_for_logs(Path::new("/usr/bin/java"), &args);

        assert!(!line.contains("s3cr3t-session"));
        assert_eq!(
            line,
            "/usr/bin/java -Xmx6G -Donlyus.user=Steve -Donlyus.token=*** --gameDir \"/games/Minecraft Vanilla\""
        );
        assert_eq!(redact_secret("-Donlyus.token="), "-Donlyus.token=");
    }
}
