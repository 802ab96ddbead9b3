//! Client configuration resolution
//!
//! **Priority:** command line / environment → TOML → compiled default

use std::path::PathBuf;
use stockroom_common::auth::CredentialTable;
use stockroom_common::config::{
    first_configured, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};

use crate::session::SessionStore;

pub const MODULE_NAME: &str = "stockroom-cli";

/// Fully resolved client settings
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Folder holding the session file
    pub root_folder: PathBuf,
    pub api_url: String,
    /// Shared secret sent as `x-api-key`; may be empty
    pub api_key: String,
    pub log_level: String,
    pub credentials: CredentialTable,
}

impl ClientSettings {
    pub fn resolve(
        root_folder: Option<PathBuf>,
        api_url: Option<String>,
        api_key: Option<String>,
        log_level: Option<String>,
        toml: &TomlConfig,
    ) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(root_folder)
            .with_toml(toml)
            .resolve();

        Self {
            root_folder,
            api_url: first_configured("api_url", api_url, toml.api_url.clone(), defaults.api_url),
            api_key: first_configured(
                "api_key",
                api_key.filter(|k| !k.trim().is_empty()),
                toml.api_key.clone(),
                String::new(),
            ),
            log_level: first_configured(
                "log_level",
                log_level,
                Some(toml.logging.level.clone()),
                defaults.log_level,
            ),
            credentials: CredentialTable::new(toml.users.clone()),
        }
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(RootFolderInitializer::new(self.root_folder.clone()).session_path())
    }
}
