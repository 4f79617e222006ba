use crate::error::{to_env_var, ConfigError};
use chatrelay::catalog::CATALOG_TTL;
use chatrelay::providers::{base::HistoryMode, http::OCR_ENDPOINT};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Any of these being set means real upstream credentials are configured
pub const PROVIDER_KEY_VARS: [&str; 4] = [
    "OPENAI_API_KEY",
    "TOGETHER_API_KEY",
    "ANTHROPIC_API_KEY",
    "GROQ_API_KEY",
];

/// Whether chat requests reach upstream models or get a canned reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Mock,
    Live,
}

impl ProviderMode {
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let has_key = PROVIDER_KEY_VARS
            .iter()
            .any(|var| lookup(var).is_some_and(|value| !value.is_empty()));
        if has_key {
            ProviderMode::Live
        } else {
            ProviderMode::Mock
        }
    }

    pub fn from_env() -> Self {
        Self::detect(|var| std::env::var(var).ok())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    #[default]
    Auto,
    Live,
    Mock,
}

impl ModeSetting {
    pub fn resolve(self, detect: impl FnOnce() -> ProviderMode) -> ProviderMode {
        match self {
            ModeSetting::Auto => detect(),
            ModeSetting::Live => ProviderMode::Live,
            ModeSetting::Mock => ProviderMode::Mock,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub mode: ModeSetting,
    #[serde(default)]
    pub history: HistoryMode,
    #[serde(default = "default_ocr_endpoint")]
    pub ocr_endpoint: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            mode: ModeSetting::default(),
            history: HistoryMode::default(),
            ocr_endpoint: default_ocr_endpoint(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_catalog_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            url: None,
            ttl_secs: default_catalog_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default, rename = "type")]
    pub kind: StoreKind,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StoreSettings {
    /// Directory for the file store. Without `store.dir` the user's data
    /// directory is used; if the platform has none, `store.dir` is required.
    pub fn resolved_dir(&self) -> Result<PathBuf, ConfigError> {
        self.dir
            .clone()
            .or_else(default_store_dir)
            .ok_or_else(|| ConfigError::MissingEnvVar {
                env_var: to_env_var("store.dir"),
            })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("store.type", "memory")?
            .add_source(
                Environment::with_prefix("CHATRELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `name`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("chatrelay").join("chats"))
}

fn default_ocr_endpoint() -> String {
    OCR_ENDPOINT.to_string()
}

fn default_catalog_ttl_secs() -> u64 {
    CATALOG_TTL.as_secs()
}
