use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{Result, YkError};

/// Name of the profile folder created under the platform location
pub const PROFILE_FOLDER: &str = "YKPen";

/// Default database file name inside the profile folder
pub const DATABASE_FILE: &str = "YKPen_database.db";

/// Name of the configuration file inside the profile folder
pub const CONFIG_FILE: &str = "config.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the database and this configuration
    pub profile_dir: PathBuf,

    /// Database file name, relative to `profile_dir`
    pub database_file: String,

    /// Directory the file dialogs start in
    pub dialog_dir: PathBuf,

    /// Default editor command
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            database_file: DATABASE_FILE.to_string(),
            dialog_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            editor_command: None,
        }
    }
}

/// Per-OS profile location: `%LOCALAPPDATA%\YKPen`, `~/.YKPen` or `~/.config/YKPen`
pub fn default_profile_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(windows) {
        dirs::data_local_dir()
            .unwrap_or(home)
            .join(PROFILE_FOLDER)
    } else if cfg!(target_os = "macos") {
        home.join(format!(".{}", PROFILE_FOLDER))
    } else {
        home.join(".config").join(PROFILE_FOLDER)
    }
}

impl Config {
    /// Builds a configuration rooted at `profile_dir`, reading its config file if present
    pub fn load(profile_dir: Option<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let config_path = config_file.map(Path::to_path_buf).unwrap_or_else(|| {
            profile_dir
                .clone()
                .unwrap_or_else(default_profile_dir)
                .join(CONFIG_FILE)
        });

        let mut config = if config_path.exists() {
            debug!("Reading configuration from {}", config_path.display());
            let raw = fs::read_to_string(&config_path)?;
            serde_json::from_str::<Config>(&raw).map_err(|e| YkError::ConfigError {
                message: format!("{}: {}", config_path.display(), e),
            })?
        } else {
            Config::default()
        };

        // The command line wins over whatever the file says
        if let Some(dir) = profile_dir {
            config.profile_dir = dir;
        }
        Ok(config)
    }

    /// Writes the configuration to `<profile_dir>/config.json`
    pub fn save(&self) -> Result<PathBuf> {
        self.ensure_profile_dir()?;
        let path = self.profile_dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration written to {}", path.display());
        Ok(path)
    }

    /// Creates the profile directory when it does not exist yet
    pub fn ensure_profile_dir(&self) -> Result<()> {
        if !self.profile_dir.exists() {
            debug!(
                "Profile directory does not exist, creating: {}",
                self.profile_dir.display()
            );
            fs::create_dir_all(&self.profile_dir).map_err(|_| YkError::DirectoryError {
                path: self.profile_dir.clone(),
            })?;
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.profile_dir.join(&self.database_file)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t -W".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
