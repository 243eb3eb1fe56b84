use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "phg_agent_roster";
pub const DEFAULT_DB_PATH: &str = "agent_roster.db";
pub const CONFIG_FILE: &str = "dashboard_config.json";

/// Ordered header-discovery rules for CRM exports.
/// Scanning is left to right over the header row; the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRules {
    /// Exact (lower-cased, trimmed) header names for the agent column.
    #[serde(default = "default_agent_headers")]
    pub agent_headers: Vec<String>,
    /// Substrings that mark the amount column.
    #[serde(default = "default_amount_keywords")]
    pub amount_keywords: Vec<String>,
    /// Upper-case substrings that mark sub-header / footer rows in the
    /// agent column. Such rows are skipped.
    #[serde(default = "default_skip_markers")]
    pub skip_markers: Vec<String>,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            agent_headers:   default_agent_headers(),
            amount_keywords: default_amount_keywords(),
            skip_markers:    default_skip_markers(),
        }
    }
}

fn default_agent_headers() -> Vec<String> {
    ["agent", "agent initials", "initials", "name"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_amount_keywords() -> Vec<String> {
    ["collected", "total", "sales", "amount"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_skip_markers() -> Vec<String> {
    ["AGENT", "TOTAL"].into_iter().map(String::from).collect()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Key the roster blob is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub columns: ColumnRules,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            db_path:     default_db_path(),
            columns:     ColumnRules::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from `{data_dir}/dashboard_config.json`.
    /// In tests, use DashboardConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        if std::path::Path::new(&path).exists() {
            Self::load(data_dir)
        } else {
            log::info!("No {path}; using built-in configuration");
            Ok(Self::default())
        }
    }
}
