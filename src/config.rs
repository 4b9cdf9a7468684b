use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::driver::OpenOptions;

/// Config files probed in order; the first one that exists is used.
pub const CONFIG_PATHS: [&str; 2] = ["/etc/sqlinspect/sqlinspect.toml", "./sqlinspect.toml"];

pub const ENV_PREFIX: &str = "SQLINSPECT";

/// Runtime settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_history")]
    pub history: bool,
}

fn default_log_level() -> String { "warn".to_string() }
const fn default_history() -> bool { true }

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            read_only: false,
            log_level: default_log_level(),
            history: default_history(),
        }
    }
}

impl Settings {
    /// Load settings with priority: ENV > config file > defaults.
    /// Command-line flags are applied on top by the caller.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&CONFIG_PATHS, None)
    }

    /// Same as [`Settings::load`] with explicit file candidates. `env`
    /// replaces the process environment when given.
    pub fn load_from<P: AsRef<Path>>(
        paths: &[P],
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. First config file that exists
        if let Some(path) = paths.iter().map(AsRef::as_ref).find(|p| p.exists()) {
            builder = builder.add_source(File::from(path));
        }

        // 2. SQLINSPECT_* environment variables
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = EnvFilter::try_new(&self.log_level) {
            return Err(ConfigError::Message(format!("invalid log_level '{}': {err}", self.log_level)));
        }
        Ok(())
    }

    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            read_only: self.read_only,
            create: !self.read_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_files() -> [&'static str; 1] {
        ["/nonexistent/sqlinspect.toml"]
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(&no_files(), Some(HashMap::new())).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.open_options(), OpenOptions::default());
    }

    #[test]
    fn test_file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "database = \"/tmp/app.db\"\nlog_level = \"info\"\nread_only = true").unwrap();

        let env = HashMap::from([("SQLINSPECT_LOG_LEVEL".to_string(), "debug".to_string())]);
        let settings = Settings::load_from(&[file.path()], Some(env)).unwrap();

        assert_eq!(settings.database, Some(PathBuf::from("/tmp/app.db")));
        assert_eq!(settings.log_level, "debug");
        assert!(settings.read_only);
        assert!(!settings.open_options().create);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let env = HashMap::from([("SQLINSPECT_LOG_LEVEL".to_string(), "sqlite_inspector=loud".to_string())]);
        assert!(Settings::load_from(&no_files(), Some(env)).is_err());
    }
}
