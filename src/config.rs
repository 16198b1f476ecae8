//! Application settings.
//!
//! Settings are layered with `figment`, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory, or an explicit file
//! 3. `DUPESCAN_*` environment variables (e.g. `DUPESCAN_HASH_THREADS=4`)
//! 4. command-line flags
//!
//! ```toml
//! hash_threads = 4
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! on_collision = "rename"
//! use_trash = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::{CollisionPolicy, DeleteConfig, MoveConfig};
use crate::engine::EngineConfig;
use crate::scanner::WalkerConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of hashing threads.
    pub hash_threads: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from every root.
    pub ignore_patterns: Vec<String>,
    /// Name collision handling for moves.
    pub on_collision: CollisionPolicy,
    /// Delete to the system trash instead of permanently.
    pub use_trash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hash_threads: 1,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            on_collision: CollisionPolicy::Skip,
            use_trash: false,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_collision: Option<CollisionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_trash: Option<bool>,
}

impl Settings {
    /// Default config file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment without extracting it.
    ///
    /// `config_file` replaces the default location when given.
    #[must_use]
    pub fn figment(config_file: Option<&Path>, overrides: &SettingsOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_file.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => log::debug!("No config directory available"),
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    /// Load and validate settings.
    ///
    /// A missing config file is not an error. An explicit `config_file`
    /// that does not exist is.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML, wrongly typed values, or an
    /// invalid thread count.
    pub fn load(config_file: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        if let Some(path) = config_file {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let settings: Settings = Self::figment(config_file, overrides)
            .extract()
            .context("Failed to load configuration")?;
        settings.validate()?;
        log::debug!("Effective settings: {:?}", settings);
        Ok(settings)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if `hash_threads` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.hash_threads == 0 {
            anyhow::bail!("hash_threads must be at least 1");
        }
        Ok(())
    }

    /// Walker filters.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.skip_hidden, self.ignore_patterns.clone())
    }

    /// Engine configuration without a cancel token.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_walker_config(self.walker_config())
            .with_hash_threads(self.hash_threads)
    }

    /// Delete configuration.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        DeleteConfig {
            use_trash: self.use_trash,
        }
    }

    /// Move configuration.
    #[must_use]
    pub fn move_config(&self) -> MoveConfig {
        MoveConfig::default().with_collision_policy(self.on_collision)
    }
}
