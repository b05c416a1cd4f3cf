//! CLI configuration -- thin wrapper around `iamctl_config`.
//!
//! Re-exports the shared types and adds the resolution that respects
//! `GlobalOpts` overrides (--profile, --region, --insecure, --timeout).

use std::str::FromStr as _;
use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;

use iamctl_api::{Authenticator, Service, ServiceClient, TlsMode, TransportConfig};
use iamctl_config::Resolver;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use iamctl_config::{
    Config, KeyringStore, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// The active profile.
///
/// A missing default profile is not an error: everything can come from
/// the environment. A profile named with `--profile` must exist.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            available: available_profiles(config),
            name,
        }),
        None => Ok((name, Profile::default())),
    }
}

/// Output format: `--output`, then `defaults.output`, then JSON.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| <OutputFormat as ValueEnum>::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Json)
}

/// Color mode: an explicit `--color` wins over `defaults.color`.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    match global.color {
        ColorMode::Auto => {
            <ColorMode as ValueEnum>::from_str(&config.defaults.color, true).unwrap_or(ColorMode::Auto)
        }
        explicit => explicit,
    }
}

/// TLS and timeout settings. Flags override the profile, which overrides
/// the global defaults.
pub fn transport(global: &GlobalOpts, config: &Config, profile: &Profile) -> TransportConfig {
    let tls = if global.insecure || profile.insecure.unwrap_or(config.defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(config.defaults.timeout);

    TransportConfig {
        tls,
        timeout: Duration::from_secs(timeout),
    }
}

/// Build the client for `service` from config, environment and flags.
///
/// Credential problems surface here, before any request is made.
pub fn service_client(global: &GlobalOpts, service: Service) -> Result<ServiceClient, CliError> {
    let config = load_config()?;
    let (profile_name, profile) = active_profile(global, &config)?;

    let resolver = Resolver::new(&profile_name, &profile).with_region(global.region.as_deref());
    let endpoint = resolver.endpoint(service);
    let credentials = resolver.credentials(service)?;

    debug!(
        %service,
        profile = %profile_name,
        endpoint = %endpoint,
        auth = credentials.kind(),
        "resolved service"
    );

    let transport = transport(global, &config, &profile);
    ServiceClient::new(service, &endpoint, Authenticator::new(credentials), &transport).map_err(
        |e| CliError::Validation {
            field: format!("{}_URL", service.env_prefix()),
            reason: e.to_string(),
        },
    )
}

/// Parse a service name as used in config keys and `--service`.
pub fn parse_service(name: &str) -> Result<Service, CliError> {
    Service::from_str(name).map_err(|_| CliError::Validation {
        field: "service".into(),
        reason: format!(
            "unknown service '{name}'. Valid services: iam_access_groups, iam_identity, \
             iam_policy_management, schematics"
        ),
    })
}
