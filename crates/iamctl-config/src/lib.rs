//! Shared configuration for iamctl.
//!
//! TOML profiles, per-service endpoint resolution, and the credential
//! chain (service env vars, generic env vars, keyring, plaintext) that
//! produces an `iamctl_api::Credentials` for each IBM Cloud service.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use iamctl_api::service::IAM_HOST;
use iamctl_api::{Credentials, Service};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name for stored API keys.
pub const KEYRING_SERVICE: &str = "iamctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials for {service} (profile '{profile}'): {reason}")]
    NoCredentials {
        service: String,
        profile: String,
        reason: String,
    },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named IBM Cloud account profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Region for regional services (Schematics), e.g. "us-south".
    pub region: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// IAM host used for the API-key token exchange.
    pub iam_url: Option<String>,

    /// Endpoint overrides keyed by service name (`schematics = "https://..."`).
    #[serde(default)]
    pub endpoints: HashMap<String, String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "iamctl", "iamctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("iamctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// `IAMCTL_` variables override file values; nested keys use `__`
/// (`IAMCTL_DEFAULTS__OUTPUT=yaml`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IAMCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret storage ──────────────────────────────────────────────────

/// Where API keys live outside the config file.
pub trait SecretStore {
    fn api_key(&self, profile: &str) -> Option<String>;
}

/// The operating system keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(profile: &str) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{profile}/api-key"))
    }

    /// Store `api_key` for `profile`.
    pub fn set_api_key(profile: &str, api_key: &str) -> Result<(), ConfigError> {
        Self::entry(profile)?.set_password(api_key)?;
        Ok(())
    }
}

impl SecretStore for KeyringStore {
    fn api_key(&self, profile: &str) -> Option<String> {
        Self::entry(profile).and_then(|e| e.get_password()).ok()
    }
}

/// A store that never has anything (tests, `--no-keyring` style setups).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecrets;

impl SecretStore for NoSecrets {
    fn api_key(&self, _profile: &str) -> Option<String> {
        None
    }
}

/// Read a process environment variable, treating empty as unset.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ── Per-service resolution ──────────────────────────────────────────

/// How a service authenticates, from `<PREFIX>_AUTH_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthType {
    Iam,
    BearerToken,
    NoAuth,
}

/// Resolves endpoints and credentials for one profile.
///
/// Every service reads its own `<SERVICE>_*` variables first
/// (`IAM_IDENTITY_APIKEY`, `SCHEMATICS_URL`, ...), then the profile.
pub struct Resolver<'a> {
    profile_name: &'a str,
    profile: &'a Profile,
    region: Option<&'a str>,
    env: &'a dyn Fn(&str) -> Option<String>,
    secrets: &'a dyn SecretStore,
}

impl<'a> Resolver<'a> {
    /// Resolver over the process environment and the system keyring.
    pub fn new(profile_name: &'a str, profile: &'a Profile) -> Self {
        Self {
            profile_name,
            profile,
            region: profile.region.as_deref(),
            env: &process_env,
            secrets: &KeyringStore,
        }
    }

    /// Region override (the `--region` flag).
    pub fn with_region(mut self, region: Option<&'a str>) -> Self {
        if region.is_some() {
            self.region = region;
        }
        self
    }

    pub fn with_env(mut self, env: &'a dyn Fn(&str) -> Option<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_secrets(mut self, secrets: &'a dyn SecretStore) -> Self {
        self.secrets = secrets;
        self
    }

    fn var(&self, service: Service, suffix: &str) -> Option<String> {
        (self.env)(&format!("{}_{suffix}", service.env_prefix()))
    }

    /// Base URL of `service`: `<PREFIX>_URL`, then the profile's
    /// `endpoints` table, then the public (regional) endpoint.
    pub fn endpoint(&self, service: Service) -> String {
        self.var(service, "URL")
            .or_else(|| self.profile.endpoints.get(service.as_ref()).cloned())
            .unwrap_or_else(|| service.default_url(self.region))
    }

    /// IAM host for the token exchange.
    pub fn auth_url(&self, service: Service) -> String {
        self.var(service, "AUTH_URL")
            .or_else(|| self.profile.iam_url.clone())
            .unwrap_or_else(|| IAM_HOST.to_owned())
    }

    fn auth_type(&self, service: Service) -> Result<AuthType, ConfigError> {
        let Some(raw) = self.var(service, "AUTH_TYPE") else {
            return Ok(AuthType::Iam);
        };
        match raw.to_ascii_lowercase().as_str() {
            "iam" => Ok(AuthType::Iam),
            "bearertoken" => Ok(AuthType::BearerToken),
            "noauth" => Ok(AuthType::NoAuth),
            other => Err(ConfigError::Validation {
                field: format!("{}_AUTH_TYPE", service.env_prefix()),
                reason: format!("expected 'iam', 'bearerToken' or 'noAuth', got '{other}'"),
            }),
        }
    }

    /// API key chain: service variables, the profile's `api_key_env`,
    /// `IC_API_KEY` / `IBMCLOUD_API_KEY`, the keyring, then plaintext.
    pub fn api_key(&self, service: Service) -> Result<SecretString, ConfigError> {
        let from_env = self
            .var(service, "APIKEY")
            .or_else(|| self.var(service, "API_KEY"))
            .or_else(|| {
                self.profile
                    .api_key_env
                    .as_deref()
                    .and_then(|name| (self.env)(name))
            })
            .or_else(|| (self.env)("IC_API_KEY"))
            .or_else(|| (self.env)("IBMCLOUD_API_KEY"));

        if let Some(key) = from_env {
            return Ok(SecretString::from(key));
        }

        if let Some(key) = self.secrets.api_key(self.profile_name) {
            debug!(profile = self.profile_name, "API key from keyring");
            return Ok(SecretString::from(key));
        }

        if let Some(ref key) = self.profile.api_key {
            return Ok(SecretString::from(key.clone()));
        }

        Err(ConfigError::NoCredentials {
            service: service.to_string(),
            profile: self.profile_name.into(),
            reason: format!(
                "set {}_APIKEY or IBMCLOUD_API_KEY, or run `iamctl config set-key`",
                service.env_prefix()
            ),
        })
    }

    /// Credentials for `service`, ready for an `Authenticator`.
    pub fn credentials(&self, service: Service) -> Result<Credentials, ConfigError> {
        match self.auth_type(service)? {
            AuthType::NoAuth => Ok(Credentials::NoAuth),
            AuthType::BearerToken => self
                .var(service, "BEARER_TOKEN")
                .map(|token| Credentials::BearerToken(SecretString::from(token)))
                .ok_or_else(|| ConfigError::NoCredentials {
                    service: service.to_string(),
                    profile: self.profile_name.into(),
                    reason: format!("{}_BEARER_TOKEN is not set", service.env_prefix()),
                }),
            AuthType::Iam => {
                let api_key = self.api_key(service)?;
                let auth_url = self.auth_url(service);
                Credentials::iam(api_key, &auth_url).map_err(|e| ConfigError::Validation {
                    field: format!("{}_AUTH_URL", service.env_prefix()),
                    reason: e.to_string(),
                })
            }
        }
    }
}
