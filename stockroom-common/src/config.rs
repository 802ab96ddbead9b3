//! Configuration loading and root folder resolution
//!
//! Bootstrap settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unparsable TOML file never aborts startup: a warning is
//! logged and the remaining tiers apply.

use crate::auth::UserEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "STOCKROOM_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "stockroom.db";

/// Photo directory name inside the root folder
pub const UPLOADS_DIR: &str = "uploads";

/// Client session file name inside the client data folder
pub const SESSION_FILE: &str = "session.json";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database and the uploads directory
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// API bind address
    #[serde(default)]
    pub host: Option<String>,

    /// API port
    #[serde(default)]
    pub port: Option<u16>,

    /// Shared secret required in the `x-api-key` header (empty disables)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum request body size for photo uploads
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Base URL the client talks to
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Client logins
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file for `module_name`, falling back to defaults
    ///
    /// Never fails; problems are logged.
    pub fn load_for_module(module_name: &str) -> Self {
        let Some(path) = config_file_path(module_name) else {
            debug!("No config file found for {}, using defaults", module_name);
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} (continuing with defaults)", e);
                Self::default()
            }
        }
    }
}

/// Locate the config file for a module
///
/// Candidates, first existing wins:
/// - `<config dir>/stockroom/<module_name>.toml`
/// - `<config dir>/stockroom/config.toml`
/// - `/etc/stockroom/config.toml` (Unix)
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        let dir = dir.join("stockroom");
        candidates.push(dir.join(format!("{}.toml", module_name)));
        candidates.push(dir.join("config.toml"));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/stockroom/config.toml"));
    }

    candidates.into_iter().find(|p| p.is_file())
}

/// Built-in defaults
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub api_url: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("stockroom"))
            .unwrap_or_else(|| PathBuf::from("./stockroom_data"));

        Self {
            root_folder,
            host: "0.0.0.0".to_string(),
            port: 3333,
            max_upload_bytes: 10 * 1024 * 1024,
            api_url: "http://localhost:3333".to_string(),
            log_level: default_log_level(),
        }
    }
}

/// Root folder resolution
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<Option<PathBuf>>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line override
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an already-loaded TOML config instead of reading the file again
    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = Some(config.root_folder.clone());
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        let toml_root = match &self.toml_root {
            Some(root) => root.clone(),
            None => TomlConfig::load_for_module(&self.module_name).root_folder,
        };
        if let Some(path) = toml_root {
            return path;
        }

        // Priority 4: Compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Paths under a resolved root folder
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root folder (and parents) if missing. Idempotent.
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }
}

/// Pick the first configured value: CLI/env, then TOML, then default
///
/// Logs when a lower tier is shadowed so misconfiguration is visible.
pub fn first_configured<T: Clone>(name: &str, cli: Option<T>, toml: Option<T>, default: T) -> T {
    match (cli, toml) {
        (Some(value), Some(_)) => {
            debug!("{} set on command line/environment and in TOML; using command line", name);
            value
        }
        (Some(value), None) => value,
        (None, Some(value)) => value,
        (None, None) => default,
    }
}
