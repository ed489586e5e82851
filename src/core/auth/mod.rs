use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Offline-mode servers derive player UUIDs from this prefix plus the name.
const OFFLINE_PLAYER_PREFIX: &str = "OfflinePlayer:";

/// Identity handed to the game through its `${auth_*}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchAccountProfile {
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl LaunchAccountProfile {
    /// Offline identity: name-derived UUID, throwaway access token. The real
    /// session token travels separately as a JVM property.
    pub fn offline(username: &str) -> Self {
        let username = username.trim().to_string();
        Self {
            uuid: offline_uuid(&username),
            access_token: uuid::Uuid::new_v4().simple().to_string(),
            username,
            user_type: "legacy".into(),
        }
    }
}

/// Name-based (v3) UUID over `OfflinePlayer:<name>`, hyphenated. Hashes the
/// bare name bytes with no namespace, matching `UUID.nameUUIDFromBytes`.
pub fn offline_uuid(username: &str) -> String {
    let name = format!("{}{}", OFFLINE_PLAYER_PREFIX, username);
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&Md5::digest(name.as_bytes()));
    uuid::Builder::from_md5_bytes(digest)
        .into_uuid()
        .hyphenated()
        .to_string()
}
