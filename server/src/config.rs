use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::console::formatter::OutputMode;
use crate::engine::validation::{self, Limits};

/// Top-level configuration, loaded from concordo.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub limits: LimitsSection,
    pub console: ConsoleSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the data files.
    pub data_dir: PathBuf,
    pub users_file: String,
    pub servers_file: String,
    /// Save after every state-changing command. When off, state is only
    /// written on exit.
    pub autosave: bool,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            users_file: "users.txt".into(),
            servers_file: "servers.txt".into(),
            autosave: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_message_length: usize,
    pub max_name_length: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_message_length: validation::MAX_MESSAGE_LENGTH,
            max_name_length: validation::MAX_NAME_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleSection {
    pub output: OutputMode,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive used when RUST_LOG is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CONCORDO_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CONCORDO_AUTOSAVE")
            && let Ok(on) = v.parse()
        {
            self.storage.autosave = on;
        }
        if let Ok(v) = std::env::var("CONCORDO_OUTPUT")
            && let Some(mode) = OutputMode::parse(&v)
        {
            self.console.output = mode;
        }
        if let Ok(v) = std::env::var("CONCORDO_LOG") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("CONCORDO_MAX_MESSAGE_LENGTH")
            && let Ok(len) = v.parse()
        {
            self.limits.max_message_length = len;
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_message_length: self.limits.max_message_length,
            max_name_length: self.limits.max_name_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch environment variables must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 5] = [
        "CONCORDO_DATA_DIR",
        "CONCORDO_AUTOSAVE",
        "CONCORDO_OUTPUT",
        "CONCORDO_LOG",
        "CONCORDO_MAX_MESSAGE_LENGTH",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _lock = ENV_LOCK.lock().unwrap();
        let originals: Vec<_> = KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for key in KEYS {
            // SAFETY: serialized by ENV_LOCK
            unsafe {
                std::env::remove_var(key);
            }
        }
        for (k, v) in vars {
            // SAFETY: serialized by ENV_LOCK
            unsafe {
                std::env::set_var(k, v);
            }
        }

        f();

        for (k, v) in originals {
            // SAFETY: serialized by ENV_LOCK
            unsafe {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("."));
        assert_eq!(config.storage.users_file, "users.txt");
        assert_eq!(config.storage.servers_file, "servers.txt");
        assert!(config.storage.autosave);
        assert_eq!(config.console.output, OutputMode::Text);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [storage]
            data_dir = "/var/lib/concordo"
            autosave = false

            [console]
            output = "json"

            [limits]
            max_message_length = 280
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/concordo"));
        assert!(!config.storage.autosave);
        assert_eq!(config.storage.users_file, "users.txt");
        assert_eq!(config.console.output, OutputMode::Json);
        assert_eq!(config.limits().max_message_length, 280);
        assert_eq!(config.limits().max_name_length, validation::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AppConfig::from_toml("[console]\noutput = \"xml\"").is_err());
        assert!(AppConfig::from_toml("storage = 3").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        with_env(&[], || {
            let config = AppConfig::load(Path::new("/nonexistent/concordo.toml")).unwrap();
            assert!(config.storage.autosave);
            assert_eq!(config.console.output, OutputMode::Text);
        });
    }

    #[test]
    fn test_env_overrides() {
        with_env(
            &[
                ("CONCORDO_DATA_DIR", "/tmp/concordo"),
                ("CONCORDO_AUTOSAVE", "false"),
                ("CONCORDO_OUTPUT", "json"),
                ("CONCORDO_LOG", "debug"),
                ("CONCORDO_MAX_MESSAGE_LENGTH", "42"),
            ],
            || {
                let config = AppConfig::load(Path::new("/nonexistent/concordo.toml")).unwrap();
                assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/concordo"));
                assert!(!config.storage.autosave);
                assert_eq!(config.console.output, OutputMode::Json);
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.limits().max_message_length, 42);
            },
        );
    }

    #[test]
    fn test_unparseable_env_values_are_ignored() {
        with_env(
            &[
                ("CONCORDO_AUTOSAVE", "maybe"),
                ("CONCORDO_OUTPUT", "xml"),
                ("CONCORDO_MAX_MESSAGE_LENGTH", "lots"),
            ],
            || {
                let config = AppConfig::load(Path::new("/nonexistent/concordo.toml")).unwrap();
                assert!(config.storage.autosave);
                assert_eq!(config.console.output, OutputMode::Text);
                assert_eq!(
                    config.limits().max_message_length,
                    validation::MAX_MESSAGE_LENGTH
                );
            },
        );
    }
}
