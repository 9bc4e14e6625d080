use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Shell configuration, read from `~/.msh/config.yaml` when present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Prompt printed before each line is read
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub plugins: PluginConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory searched for `<name><DLL_SUFFIX>` libraries
    #[serde(default = "default_plugin_dir")]
    pub dir: PathBuf,

    /// Plugins loaded before the first prompt
    #[serde(default)]
    pub autoload: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Keep line history in the interactive editor
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum history entries kept in memory and on disk
    #[serde(default = "default_max_history")]
    pub max_entries: usize,

    /// History file; `~/.msh/history` when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_max_history() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            plugins: PluginConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            dir: default_plugin_dir(),
            autoload: Vec::new(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_history(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.yaml"))
    }

    /// History file to use, falling back to `~/.msh/history`
    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history.file {
            Some(file) => Ok(file.clone()),
            None => Ok(Self::home_dir()?.join("history")),
        }
    }

    fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home.join(".msh"))
    }
}
