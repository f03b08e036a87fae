//! PVSS Configuration
//!
//! Shared configuration crate for all PVSS components.
//!
//! Handles loading configuration from:
//! 1. PVSS_CONFIG env var (explicit path)
//! 2. ./pvss.toml (current directory)
//! 3. ~/.pvss/pvss.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use pvss_committee::MemberId;
use pvss_group::GroupParams;

/// Global config instance for convenience access
pub static GLOBAL_CONFIG: OnceLock<PvssConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "pvss.toml";
const CONFIG_DIR_NAME: &str = ".pvss";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_COMMITTEE_SIZE: usize = 10;
const DEFAULT_MEMBER_LABEL_PREFIX: &str = "member";

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PvssConfig {
    #[serde(default)]
    pub committee: CommitteeConfig,
    #[serde(default)]
    pub group: GroupConfig,
}

/// Committee configuration
///
/// When `members` is empty, `size` identities are derived from
/// `"{label_prefix}-{i}"` labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeConfig {
    #[serde(default = "default_committee_size")]
    pub size: usize,
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
    /// Explicit member identities (hex), in index order
    #[serde(default)]
    pub members: Vec<String>,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_COMMITTEE_SIZE,
            label_prefix: DEFAULT_MEMBER_LABEL_PREFIX.into(),
            members: Vec::new(),
        }
    }
}

fn default_committee_size() -> usize {
    DEFAULT_COMMITTEE_SIZE
}

fn default_label_prefix() -> String {
    DEFAULT_MEMBER_LABEL_PREFIX.into()
}

/// Group parameters (decimal or 0x-hex); all unset selects the built-in
/// 1536-bit MODP group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub modulus: Option<String>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        if let Ok(parsed) = v.parse() {
            *field = parsed;
        }
    }
}

/// Set Option<String> from env var if present
fn env_option_string(key: &str, field: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        *field = Some(v);
    }
}

/// Set a list from a comma-separated env var if present
fn env_list(key: &str, field: &mut Vec<String>) {
    if let Ok(v) = env::var(key) {
        *field = split_list(&v);
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// Implementation
// ============================================================================

impl PvssConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check PVSS_CONFIG env var
        if let Ok(path) = env::var("PVSS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check ./pvss.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.pvss/pvss.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Committee
        env_parse("PVSS_COMMITTEE_SIZE", &mut self.committee.size);
        env_parse("PVSS_MEMBER_LABEL_PREFIX", &mut self.committee.label_prefix);
        env_list("PVSS_COMMITTEE_MEMBERS", &mut self.committee.members);

        // Group
        env_option_string("PVSS_GROUP_MODULUS", &mut self.group.modulus);
        env_option_string("PVSS_GROUP_GENERATOR", &mut self.group.generator);
        env_option_string("PVSS_GROUP_ORDER", &mut self.group.order);
    }

    /// Committee identities in index order
    pub fn committee_ids(&self) -> Result<Vec<MemberId>> {
        if self.committee.members.is_empty() {
            if self.committee.size == 0 {
                bail!("Committee size must be at least 1");
            }
            return Ok((0..self.committee.size)
                .map(|i| {
                    let label = format!("{}-{}", self.committee.label_prefix, i);
                    MemberId::derive(label.as_bytes())
                })
                .collect());
        }

        if self.committee.members.len() != self.committee.size {
            log::warn!(
                "committee.size = {} ignored, {} explicit members configured",
                self.committee.size,
                self.committee.members.len()
            );
        }

        self.committee
            .members
            .iter()
            .map(|m| {
                m.parse::<MemberId>()
                    .with_context(|| format!("Invalid committee member id: {}", m))
            })
            .collect()
    }

    /// Group parameters for client-side key derivation
    pub fn group_params(&self) -> Result<GroupParams> {
        match (&self.group.modulus, &self.group.generator, &self.group.order) {
            (None, None, None) => Ok(GroupParams::modp_1536()),
            (Some(p), Some(g), Some(q)) => {
                GroupParams::from_literals(p, g, q).context("Invalid group parameters in config")
            }
            _ => bail!("group.modulus, group.generator and group.order must be set together"),
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        let mut sample = Self::default();
        let params = GroupParams::modp_1536();
        sample.group = GroupConfig {
            modulus: Some(format!("{:#x}", params.modulus())),
            generator: Some(params.generator().to_string()),
            order: Some(format!("{:#x}", params.order())),
        };
        toml::to_string_pretty(&sample).unwrap_or_default()
    }

    /// Get the global config instance, initializing it if necessary.
    ///
    /// Falls back to defaults if loading fails.
    pub fn global() -> &'static PvssConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Try to get the global config instance.
    ///
    /// Returns `None` if config hasn't been initialized yet.
    pub fn try_global() -> Option<&'static PvssConfig> {
        GLOBAL_CONFIG.get()
    }

    /// Initialize the global config with a specific instance.
    ///
    /// Returns `Err(config)` if already initialized.
    pub fn set_global(config: PvssConfig) -> Result<(), PvssConfig> {
        GLOBAL_CONFIG.set(config)
    }
}

/// Shorthand for `PvssConfig::global()`.
#[inline]
pub fn global_config() -> &'static PvssConfig {
    PvssConfig::global()
}

// ============================================================================
// Tests
// ============================================================================
