//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::commands::util::prompt_err;
use crate::config::{self, Config, KeyringStore, Profile};
use crate::error::CliError;
use crate::output::{self, OutputOpts};

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref region) = p.region {
            let _ = writeln!(out, "region = \"{region}\"");
        }
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref iam) = p.iam_url {
            let _ = writeln!(out, "iam_url = \"{iam}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if !p.endpoints.is_empty() {
            let mut services: Vec<_> = p.endpoints.iter().collect();
            services.sort();
            let _ = writeln!(out, "\n[profiles.{name}.endpoints]");
            for (service, url) in services {
                let _ = writeln!(out, "{service} = \"{url}\"");
            }
        }
    }

    out.trim_end().to_owned()
}

/// The same view as a document, for structured output formats.
fn redacted_document(cfg: &Config) -> Result<serde_json::Value, CliError> {
    let mut doc = serde_json::to_value(cfg)?;
    if let Some(profiles) = doc.get_mut("profiles").and_then(serde_json::Value::as_object_mut) {
        for profile in profiles.values_mut() {
            if let Some(key) = profile.get_mut("api_key").filter(|k| !k.is_null()) {
                *key = serde_json::Value::String("****".into());
            }
        }
    }
    Ok(doc)
}

/// Apply `key = value` to a profile.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    if let Some(service) = key.strip_prefix("endpoints.") {
        let service = config::parse_service(service)?;
        profile.endpoints.insert(service.to_string(), value);
        return Ok(());
    }

    match key {
        "region" => profile.region = Some(value),
        "api_key" | "api-key" => profile.api_key = Some(value),
        "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
        "iam_url" | "iam-url" => profile.iam_url = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: region, api_key, api_key_env, \
                     iam_url, ca_cert, insecure, timeout, endpoints.<service>"
                ),
            });
        }
    }
    Ok(())
}

/// Prompt for an API key, rejecting empty input.
fn prompt_api_key() -> Result<String, CliError> {
    let key = rpassword::prompt_password("IBM Cloud API key: ").map_err(prompt_err)?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key.trim().to_owned())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts, out: OutputOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("iamctl configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let region: String = Input::new()
                .with_prompt("Region (Schematics)")
                .default("us-south".into())
                .interact_text()
                .map_err(prompt_err)?;

            let choices = &[
                "Store an API key in the system keyring (recommended)",
                "Read the API key from an environment variable",
                "Save an API key to the config file (plaintext)",
            ];
            let selection = Select::new()
                .with_prompt("API key source")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                region: Some(region),
                ..Profile::default()
            };
            match selection {
                0 => {
                    let key = prompt_api_key()?;
                    KeyringStore::set_api_key(&profile_name, &key)?;
                    eprintln!("   API key stored in system keyring");
                }
                1 => {
                    let var: String = Input::new()
                        .with_prompt("Environment variable")
                        .default("IBMCLOUD_API_KEY".into())
                        .interact_text()
                        .map_err(prompt_err)?;
                    profile.api_key_env = Some(var);
                }
                _ => profile.api_key = Some(prompt_api_key()?),
            }

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Try it: iamctl info iam_access_group -P account_id=<account>");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let rendered = match out.format {
                OutputFormat::Table => format_config_redacted(&cfg),
                format => output::render_document(format, &redacted_document(&cfg)?)?,
            };
            output::print_output(&rendered, out.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: iamctl config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_value(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let key = prompt_api_key()?;
            KeyringStore::set_api_key(&profile_name, &key)?;
            eprintln!("API key for profile '{profile_name}' stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keys_are_validated_service_names() {
        let mut profile = Profile::default();
        set_profile_value(&mut profile, "endpoints.schematics", "https://x".into())
            .expect("known service");
        assert_eq!(
            profile.endpoints.get("schematics").map(String::as_str),
            Some("https://x")
        );

        assert!(set_profile_value(&mut profile, "endpoints.nope", "https://y".into()).is_err());
    }

    #[test]
    fn typed_keys_reject_bad_values() {
        let mut profile = Profile::default();
        assert!(set_profile_value(&mut profile, "timeout", "soon".into()).is_err());
        set_profile_value(&mut profile, "timeout", "90".into()).expect("number");
        assert_eq!(profile.timeout, Some(90));
        assert!(set_profile_value(&mut profile, "colour", "x".into()).is_err());
    }

    #[test]
    fn api_keys_are_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "work".into(),
            Profile {
                api_key: Some("secret".into()),
                region: Some("eu-de".into()),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("api_key = \"****\""));
        assert!(!text.contains("secret"));

        let doc = redacted_document(&cfg).expect("serializable");
        assert_eq!(doc["profiles"]["work"]["api_key"], "****");
        assert_eq!(doc["profiles"]["work"]["region"], "eu-de");
    }
}
