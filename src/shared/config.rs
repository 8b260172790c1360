//! Application configuration. Paths, directory policy, CLI identity.

use crate::domain::CollaborationTools;
use crate::usecases::DirectoryPolicy;
use serde::Deserialize;

/// Default seats per group when creation does not specify one.
pub const DEFAULT_MAX_MEMBERS: u32 = 6;

/// Default invitation lifetime: one week.
pub const DEFAULT_INVITATION_TTL_HOURS: u64 = 168;

/// Longest accepted invitation lifetime (one school year).
pub const MAX_INVITATION_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub data_dir: Option<String>,

    /// Snapshot file. Defaults to `<data_dir>/directory.json`. Read from WG_HUB_SNAPSHOT_PATH.
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Student the CLI acts as. When unset the CLI asks. Read from WG_HUB_STUDENT_ID.
    #[serde(default)]
    pub student_id: Option<String>,

    /// Read from WG_HUB_INVITATION_TTL_HOURS.
    #[serde(default)]
    pub invitation_ttl_hours: Option<u64>,

    /// Read from WG_HUB_DEFAULT_MAX_MEMBERS.
    #[serde(default)]
    pub default_max_members: Option<u32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Collaboration-tool policy for new groups
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub tools_chat: Option<bool>,

    #[serde(default)]
    pub tools_video_calls: Option<bool>,

    #[serde(default)]
    pub tools_file_sharing: Option<bool>,

    #[serde(default)]
    pub tools_whiteboard: Option<bool>,

    #[serde(default)]
    pub tools_task_board: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("WG_HUB"));
        if let Ok(path) = std::env::var("WG_HUB_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn snapshot_path_or_default(&self) -> String {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| format!("{}/directory.json", self.data_dir_or_default()))
    }

    /// Returns invitation lifetime in hours. Defaults to 168 if unset or zero.
    pub fn invitation_ttl_hours_or_default(&self) -> u64 {
        self.invitation_ttl_hours
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_INVITATION_TTL_HOURS)
    }

    /// Returns default group capacity. Defaults to 6 if unset or zero.
    pub fn default_max_members_or_default(&self) -> u32 {
        self.default_max_members
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_MEMBERS)
    }

    /// Tools enabled on new groups. Chat and file sharing are on unless disabled.
    pub fn collaboration_tools(&self) -> CollaborationTools {
        CollaborationTools {
            chat: self.tools_chat.unwrap_or(true),
            video_calls: self.tools_video_calls.unwrap_or(false),
            file_sharing: self.tools_file_sharing.unwrap_or(true),
            whiteboard: self.tools_whiteboard.unwrap_or(false),
            task_board: self.tools_task_board.unwrap_or(false),
        }
    }

    pub fn directory_policy(&self) -> DirectoryPolicy {
        let ttl_hours = self
            .invitation_ttl_hours_or_default()
            .min(MAX_INVITATION_TTL_HOURS) as i64;
        DirectoryPolicy {
            default_max_members: self.default_max_members_or_default(),
            invitation_ttl: chrono::Duration::hours(ttl_hours),
            tools: self.collaboration_tools(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_directory_policy() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.snapshot_path_or_default(), "./data/directory.json");
        assert_eq!(cfg.directory_policy(), DirectoryPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig {
            data_dir: Some("/tmp/wg".to_string()),
            invitation_ttl_hours: Some(24),
            default_max_members: Some(0),
            tools_whiteboard: Some(true),
            tools_chat: Some(false),
            ..AppConfig::default()
        };
        let policy = cfg.directory_policy();
        assert_eq!(cfg.snapshot_path_or_default(), "/tmp/wg/directory.json");
        assert_eq!(policy.invitation_ttl, chrono::Duration::hours(24));
        assert_eq!(policy.default_max_members, DEFAULT_MAX_MEMBERS);
        assert!(policy.tools.whiteboard);
        assert!(!policy.tools.chat);
    }
}
