//! Process configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `JEWELCASE__SECTION__KEY` environment variables. The conventional
//! `PRISMIC_ENDPOINT`, `PRISMIC_ACCESS_TOKEN` and `PORT` variables win over
//! everything else.

use std::{collections::HashMap, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Prefix for structured environment overrides.
pub const ENV_PREFIX: &str = "JEWELCASE";

/// Environment variable holding the CMS endpoint.
pub const ENDPOINT_VAR: &str = "PRISMIC_ENDPOINT";

/// Environment variable holding the CMS access token.
pub const ACCESS_TOKEN_VAR: &str = "PRISMIC_ACCESS_TOKEN";

/// Environment variable holding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Largest page size the CMS accepts for a single query.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main configuration structure for Jewelcase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Content API settings.
    #[serde(default)]
    pub cms: CmsConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Site-wide presentation settings.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Content API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    #[serde(default)]
    pub endpoint: String,

    /// Access token sent with every query.
    #[serde(default)]
    pub access_token: String,

    /// Timeout for a single upstream request, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Page size used when reading every document of a type.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for a whole route, in seconds.
    #[serde(default = "default_route_timeout_secs")]
    pub route_timeout_secs: u64,

    /// Directory served under `/static`.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

/// Site-wide presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Fallback title when the metadata document has none.
    #[serde(default = "default_title")]
    pub title: String,

    /// Value of the `lang` attribute on every page.
    #[serde(default = "default_lang")]
    pub lang: String,
}

// Default value functions
fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_route_timeout_secs() -> u64 {
    30
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_title() -> String {
    "Jewelcase".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: String::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

// The access token stays out of logs.
impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route_timeout_secs: default_route_timeout_secs(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            lang: default_lang(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, std::env::vars().collect())
    }

    /// Load configuration from an optional TOML file and the given environment.
    ///
    /// A missing file is not an error; the environment alone may carry every
    /// required value.
    pub fn load_from(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                tracing::debug!(path = %path.display(), "reading configuration file");
            }
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .set_override_option("cms.endpoint", env.get(ENDPOINT_VAR).cloned())?
            .set_override_option("cms.access_token", env.get(ACCESS_TOKEN_VAR).cloned())?
            .set_override_option("server.port", env.get(PORT_VAR).cloned())?
            .build()?;

        let config: Config = settings.try_deserialize().map_err(|e| {
            CoreError::config_with_source("failed to deserialize configuration", e)
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        let endpoint = self.cms.endpoint.trim();
        if endpoint.is_empty() {
            return Err(CoreError::config(format!(
                "cms.endpoint is required (set {ENDPOINT_VAR})"
            )));
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(CoreError::config(format!(
                "cms.endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }

        if self.cms.access_token.trim().is_empty() {
            return Err(CoreError::config(format!(
                "cms.access_token is required (set {ACCESS_TOKEN_VAR})"
            )));
        }

        if self.cms.page_size == 0 || self.cms.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::config(format!(
                "cms.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        if self.cms.fetch_timeout_secs == 0 || self.server.route_timeout_secs == 0 {
            return Err(CoreError::config("timeouts must be at least one second"));
        }

        if self.cms.fetch_timeout_secs > self.server.route_timeout_secs {
            tracing::warn!(
                fetch = self.cms.fetch_timeout_secs,
                route = self.server.route_timeout_secs,
                "cms.fetch_timeout_secs exceeds server.route_timeout_secs"
            );
        }

        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Timeout for a single upstream request.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.cms.fetch_timeout_secs)
    }

    /// Deadline for a whole route.
    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.server.route_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn required_env() -> HashMap<String, String> {
        env(&[
            (ENDPOINT_VAR, "https://jewels.cdn.prismic.io/api/v2"),
            (ACCESS_TOKEN_VAR, "secret"),
        ])
    }

    #[test]
    fn test_load_from_environment_only() {
        let config = Config::load_from(None, required_env()).expect("load config");

        assert_eq!(config.cms.endpoint, "https://jewels.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token, "secret");
        assert_eq!(config.cms.fetch_timeout_secs, 10);
        assert_eq!(config.cms.page_size, 100);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.public_dir, "public");
        assert_eq!(config.site.lang, "en");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("jewelcase.toml");
        let content = r#"
[cms]
endpoint = "https://file.cdn.prismic.io/api/v2"
access_token = "from-file"
fetch_timeout_secs = 3
page_size = 50

[server]
host = "127.0.0.1"
port = 8080
route_timeout_secs = 12

[site]
title = "Maison"
lang = "fr"
"#;
        std::fs::write(&config_path, content).expect("write");

        let config = Config::load_from(Some(&config_path), HashMap::new()).expect("load config");

        assert_eq!(config.cms.endpoint, "https://file.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token, "from-file");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(config.cms.page_size, 50);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.route_timeout(), Duration::from_secs(12));
        assert_eq!(config.site.title, "Maison");
        assert_eq!(config.site.lang, "fr");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("jewelcase.toml");
        std::fs::write(
            &config_path,
            r#"
[cms]
endpoint = "https://file.cdn.prismic.io/api/v2"
access_token = "from-file"

[server]
port = 8080
"#,
        )
        .expect("write");

        let mut vars = required_env();
        vars.insert(PORT_VAR.to_string(), "9000".to_string());
        vars.insert("JEWELCASE__SITE__TITLE".to_string(), "Atelier".to_string());

        let config = Config::load_from(Some(&config_path), vars).expect("load config");

        assert_eq!(config.cms.endpoint, "https://jewels.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token, "secret");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.site.title, "Atelier");
    }

    #[test]
    fn test_structured_environment_variables() {
        let vars = env(&[
            ("JEWELCASE__CMS__ENDPOINT", "http://localhost:4000/api/v2"),
            ("JEWELCASE__CMS__ACCESS_TOKEN", "tok"),
            ("JEWELCASE__SERVER__ROUTE_TIMEOUT_SECS", "5"),
        ]);

        let config = Config::load_from(None, vars).expect("load config");
        assert_eq!(config.cms.endpoint, "http://localhost:4000/api/v2");
        assert_eq!(config.route_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = Config::load_from(Some(Path::new("/nonexistent/jewelcase.toml")), required_env());
        assert!(config.is_ok());
    }

    #[test]
    fn test_missing_endpoint_fails() {
        let result = Config::load_from(None, env(&[(ACCESS_TOKEN_VAR, "secret")]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cms.endpoint is required"));
    }

    #[test]
    fn test_missing_access_token_fails() {
        let result = Config::load_from(
            None,
            env(&[(ENDPOINT_VAR, "https://jewels.cdn.prismic.io/api/v2")]),
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cms.access_token is required"));
    }

    #[test]
    fn test_non_http_endpoint_fails() {
        let result = Config::load_from(
            None,
            env(&[(ENDPOINT_VAR, "jewels.prismic.io"), (ACCESS_TOKEN_VAR, "secret")]),
        );
        assert!(result.unwrap_err().to_string().contains("http(s) URL"));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut vars = required_env();
        vars.insert("JEWELCASE__CMS__PAGE_SIZE".to_string(), "500".to_string());
        let result = Config::load_from(None, vars);
        assert!(result.unwrap_err().to_string().contains("page_size"));
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = Config::load_from(None, required_env()).expect("load config");
        let debug = format!("{:?}", config.cms);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }
}
