//! Clap derive structures for the `iamctl` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// iamctl -- declarative, idempotent IBM Cloud IAM and Schematics management
#[derive(Debug, Parser)]
#[command(
    name = "iamctl",
    version,
    about = "Reconcile IBM Cloud IAM and Schematics resources",
    long_about = "Drives IBM Cloud IAM and Schematics resources toward a desired state.\n\n\
        Each `apply` probes the resource, then creates, updates or deletes it\n\
        with at most one write, forwarding ETags as If-Match preconditions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "IAMCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Region for regional services (Schematics)
    #[arg(long, short = 'r', env = "IAMCTL_REGION", global = true)]
    pub region: Option<String>,

    /// Output format [default: from config, else json]
    #[arg(long, short = 'o', env = "IAMCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "IAMCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: from config, else 30]
    #[arg(long, env = "IAMCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Human-readable table
    Table,
}

impl OutputFormat {
    /// Formats that carry a machine-readable result document.
    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Table)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drive one resource to the desired state
    #[command(alias = "a")]
    Apply(ApplyArgs),

    /// Look up one resource by id, or list all resources of a type
    #[command(alias = "get")]
    Info(InfoArgs),

    /// List the resource types iamctl manages
    #[command(alias = "res")]
    Resources(ResourcesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared parameter arguments ───────────────────────────────────────

/// Resource parameters, from a file and/or repeated `-P name=value`.
#[derive(Debug, Default, Args)]
pub struct ParamArgs {
    /// Parameter as NAME=VALUE (a string; JSON when it starts with { [ or ")
    /// or NAME:=JSON for booleans and numbers, e.g. -P committed:=true
    #[arg(long = "param", short = 'P', value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// JSON or YAML file with a mapping of parameters
    #[arg(long, short = 'f', value_name = "FILE")]
    pub params_file: Option<PathBuf>,
}

// ── Apply / Info ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    /// The resource must exist with the given attributes
    Present,
    /// The resource must not exist
    Absent,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Resource type, e.g. iam_access_group (see `iamctl resources`)
    pub resource: String,

    /// Desired state [default: present]
    #[arg(long, short = 's')]
    pub state: Option<StateArg>,

    /// ETag to send as If-Match instead of the one read by the probe
    #[arg(long, value_name = "ETAG")]
    pub if_match: Option<String>,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Resource type, e.g. iam_policy (see `iamctl resources`)
    pub resource: String,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    /// Show the parameters of one resource type
    pub resource: Option<String>,

    /// Only list types of this service (iam_access_groups, iam_identity, ...)
    #[arg(long)]
    pub service: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a profile value (region, iam_url, endpoints.<service>, ...)
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },

    /// Store the API key of the active profile in the system keyring
    SetKey,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
