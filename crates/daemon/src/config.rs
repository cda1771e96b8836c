//! Configuration management for the Starlight daemon
//!
//! Sources, later ones winning: built-in defaults, an optional TOML or YAML
//! file, then `STARLIGHT__SECTION__KEY` environment variables.

use crate::{DaemonError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use starlight_core::validation::validators::validate_url;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Proxy server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty disables CORS, `*` allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds (0 disables it)
    pub request_timeout_secs: u64,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    /// Upstream timeout in seconds (0 disables it)
    pub timeout_secs: u64,
}

/// Session CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Origin of a running proxy server; public auth commands go through it
    ///
    /// The proxy does not relay the backend's `Set-Cookie`, so a login made
    /// this way carries no refresh cookie. Once the access token expires the
    /// session ends instead of refreshing.
    #[serde(default)]
    pub proxy_origin: Option<String>,
    /// Where the session is persisted; defaults to the platform data dir
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "starlight=info,tower_http=info,warn".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from defaults, the optional file at `path`, and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed, or if the
    /// result fails validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Like [`Self::load`], reading variables from `env`
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("server.cors_origins", defaults.server.cors_origins)?
            .set_default(
                "server.request_timeout_secs",
                defaults.server.request_timeout_secs,
            )?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Self = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(DaemonError::InvalidConfig(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(DaemonError::InvalidConfig(
                "server.port must be non-zero".to_string(),
            ));
        }
        check_url(&self.backend.base_url, "backend.base_url")?;
        if let Some(origin) = &self.client.proxy_origin {
            check_url(origin, "client.proxy_origin")?;
        }
        Ok(())
    }

    /// `host:port` the proxy server binds to; the host may be a name
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.server.request_timeout_secs)
    }

    pub fn backend_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.backend.timeout_secs)
    }
}

/// Environment source: `STARLIGHT__SERVER__PORT=8000`, comma-separated lists
pub fn environment() -> Environment {
    Environment::with_prefix("STARLIGHT")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

fn check_url(url: &str, field: &str) -> Result<()> {
    validate_url(url, field).map_err(|e| DaemonError::InvalidConfig(e.to_string()))
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, env(&[])).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.backend.base_url, "http://localhost:8080");
        assert!(settings.server.cors_origins.is_empty());
        assert!(settings.client.proxy_origin.is_none());
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = config_file(
            r#"
            [server]
            port = 8000
            request_timeout_secs = 0

            [backend]
            base_url = "https://api.starlighterp.com"

            [client]
            proxy_origin = "http://localhost:8000"
            "#,
        );

        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.request_timeout(), None);
        assert_eq!(settings.backend.base_url, "https://api.starlighterp.com");
        assert_eq!(
            settings.client.proxy_origin.as_deref(),
            Some("http://localhost:8000")
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = config_file("[server]\nport = 8000\n");

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("STARLIGHT__SERVER__PORT", "9000"),
                ("STARLIGHT__SERVER__CORS_ORIGINS", "http://a.test,http://b.test"),
                ("STARLIGHT__LOGGING__JSON", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(settings.logging.json);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let result = Settings::load_with_env(None, env(&[("STARLIGHT__SERVER__PORT", "0")]));
        assert!(matches!(result, Err(DaemonError::InvalidConfig(_))));

        let result = Settings::load_with_env(
            None,
            env(&[("STARLIGHT__BACKEND__BASE_URL", "not a url")]),
        );
        assert!(matches!(result, Err(DaemonError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result =
            Settings::load_with_env(Some(Path::new("/nonexistent/starlight.toml")), env(&[]));
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }
}
