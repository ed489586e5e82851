// ─── OnlyUs Launcher Core ───
// Runtime provisioning and launch orchestration for the OnlyUs profiles.
//
// Architecture:
//   core/
//     profile/    Server profiles + catalog
//     config      launcher_config.json settings
//     paths       Base dir + runtime bundle lookup
//     provision/  Runtime bundle install, natives, companion plugin
//     version/    Version JSON + inheritance + OS rules
//     maven/      Artifact coordinates
//     launch/     Parameters, supervisor, Java process primitive
//     java/       Java availability probe
//     auth/       Offline account profile
//     state/      Global application state

pub mod archive;
pub mod auth;
pub mod config;
pub mod error;
pub mod java;
pub mod launch;
pub mod maven;
pub mod paths;
pub mod profile;
pub mod provision;
pub mod state;
pub mod version;
