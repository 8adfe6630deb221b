use anyhow::{Context, bail};
use eduscan_session::AuthConfig;
use eduscan_ui::UiConfig;
use eduscan_upload::UploadConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen IP address (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Key-value file backing the session gate (`~` is expanded)
    #[serde(default = "default_state_file")]
    pub state_file: String,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub uploads: UploadConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per line instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            state_file: default_state_file(),
            auth: AuthConfig::default(),
            uploads: UploadConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("EDUSCAN_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("EDUSCAN_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid EDUSCAN_PORT '{}', using {}", val, self.port),
            }
        }

        if let Ok(val) = std::env::var("EDUSCAN_STATE_FILE") {
            self.state_file = val;
        }

        // Account
        if let Ok(val) = std::env::var("EDUSCAN_AUTH_EMAIL") {
            self.auth.email = val;
        }

        if let Ok(val) = std::env::var("EDUSCAN_AUTH_PASSWORD") {
            self.auth.password = val;
        }

        if let Ok(val) = std::env::var("EDUSCAN_LOGIN_DELAY_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            self.auth.login_delay_ms = ms;
        }

        // Upload simulator
        if let Ok(val) = std::env::var("EDUSCAN_MAX_FILE_SIZE_BYTES")
            && let Ok(bytes) = val.parse::<u64>()
        {
            self.uploads.intake.max_file_size_bytes = bytes;
        }

        if let Ok(val) = std::env::var("EDUSCAN_TICK_INTERVAL_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            self.uploads.pipeline.tick_interval_ms = ms;
        }

        if let Ok(val) = std::env::var("EDUSCAN_PROCESSING_DELAY_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            self.uploads.pipeline.processing_delay_ms = ms;
        }

        // UI
        if let Ok(val) = std::env::var("EDUSCAN_REFRESH_INTERVAL")
            && let Ok(secs) = val.parse::<u64>()
        {
            self.ui.refresh_interval = secs;
        }

        // Logging settings
        if let Ok(val) = std::env::var("EDUSCAN_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("EDUSCAN_LOG_JSON")
            && let Ok(json) = val.parse::<bool>()
        {
            self.logging.json = json;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.socket_addr()?;

        if self.state_file.trim().is_empty() {
            bail!("state_file must not be empty");
        }
        if self.auth.email.is_empty() || self.auth.password.is_empty() {
            bail!("auth.email and auth.password must be set");
        }
        if self.auth.key_prefix.is_empty() {
            bail!("auth.key_prefix must not be empty");
        }
        if self.uploads.intake.allowed_extensions.is_empty()
            && self.uploads.intake.allowed_mime_types.is_empty()
        {
            bail!("uploads.intake must allow at least one extension or MIME type");
        }
        self.uploads
            .pipeline
            .validate()
            .map_err(|e| anyhow::anyhow!("uploads.pipeline: {}", e))?;

        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// `state_file` with `~` and env vars expanded
    pub fn state_path(&self) -> anyhow::Result<PathBuf> {
        let expanded = shellexpand::full(&self.state_file)
            .with_context(|| format!("Cannot expand state_file '{}'", self.state_file))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_state_file() -> String {
    "~/.eduscan/state.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_VARS: &[&str] = &[
        "EDUSCAN_HOST",
        "EDUSCAN_PORT",
        "EDUSCAN_STATE_FILE",
        "EDUSCAN_AUTH_EMAIL",
        "EDUSCAN_LOGIN_DELAY_MS",
        "EDUSCAN_LOG_LEVEL",
        "EDUSCAN_LOG_JSON",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.state_file, "~/.eduscan/state.json");
        assert_eq!(config.auth.email, "teacher@eduscan.ai");
        assert_eq!(config.auth.login_delay_ms, 1000);
        assert_eq!(config.uploads.pipeline.tick_interval_ms, 200);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_config() {
        let file = write_config(
            ".yaml",
            "port: 9000\nauth:\n  login_delay_ms: 0\nuploads:\n  pipeline:\n    processing_delay_ms: 500\n",
        );
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.auth.login_delay_ms, 0);
        assert_eq!(config.auth.password, "demo123");
        assert_eq!(config.uploads.pipeline.processing_delay_ms, 500);
        assert_eq!(config.uploads.pipeline.tick_interval_ms, 200);
    }

    #[test]
    fn test_toml_config() {
        let file = write_config(
            ".toml",
            "host = \"0.0.0.0\"\nstate_file = \"/tmp/eduscan.json\"\n\n[logging]\nlevel = \"debug\"\njson = true\n",
        );
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.state_path().unwrap(), PathBuf::from("/tmp/eduscan.json"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let file = write_config(".yaml", "port: [not, a, number]\n");
        assert!(ServerConfig::from_file(file.path()).is_err());
        assert!(ServerConfig::from_file("/definitely/not/here.yaml").is_err());
    }

    #[test]
    fn test_state_path_expands_home() {
        let config = ServerConfig::default();
        let path = config.state_path().unwrap();
        assert!(path.ends_with(".eduscan/state.json"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.host = "not a host".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.uploads.pipeline.max_increment = 0.0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.auth.key_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        unsafe {
            std::env::set_var("EDUSCAN_PORT", "9100");
            std::env::set_var("EDUSCAN_AUTH_EMAIL", "head@school.test");
            std::env::set_var("EDUSCAN_LOGIN_DELAY_MS", "5");
            std::env::set_var("EDUSCAN_LOG_JSON", "true");
        }

        let file = write_config(".yaml", "port: 9000\n");
        let mut config = ServerConfig::from_file(file.path()).unwrap();
        config.merge_env();
        clear_env();

        assert_eq!(config.port, 9100);
        assert_eq!(config.auth.email, "head@school.test");
        assert_eq!(config.auth.login_delay_ms, 5);
        assert!(config.logging.json);
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        clear_env();
        unsafe {
            std::env::set_var("EDUSCAN_PORT", "not-a-port");
            std::env::set_var("EDUSCAN_LOGIN_DELAY_MS", "soon");
        }

        let mut config = ServerConfig::default();
        config.merge_env();
        clear_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.login_delay_ms, 1000);
    }
}
