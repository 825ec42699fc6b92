//! Command line interface and layered configuration.
//!
//! [`Cli`] doubles as the run configuration. Values are merged with
//! `ortho_config` in the order defaults, configuration file, `CRUDCHECK_*`
//! environment variables, then flags given on the command line.

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_FIXTURE_DIR, DEFAULT_SCHEMA_DIR};
use crate::model::{Client, Entity, Resource};
use crate::request::RequestConfig;
use camino::Utf8PathBuf;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use miette::Diagnostic;
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoError, OrthoMergeExt, OrthoResult,
    sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

mod parsing;

use parsing::{check_timeout, parse_base_url, parse_timeout};

const CONFIG_ENV_VAR: &str = "CRUDCHECK_CONFIG_PATH";
const ENV_PREFIX: &str = "CRUDCHECK_";

/// Fields that may be overridden from the command line.
const OVERRIDABLE_FIELDS: [&str; 5] = [
    "base_url",
    "fixture_dir",
    "schema_dir",
    "timeout_secs",
    "verbose",
];

/// Failures raised while assembling the run configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configured base URL is unusable.
    #[error("invalid base URL: {reason}")]
    #[diagnostic(
        code(crudcheck::config::base_url),
        help("set --base-url or CRUDCHECK_BASE_URL to an absolute http(s) URL")
    )]
    BaseUrl {
        /// Why the URL was rejected.
        reason: String,
    },
    /// The configured timeout is out of range.
    #[error("invalid timeout: {reason}")]
    #[diagnostic(code(crudcheck::config::timeout))]
    Timeout {
        /// Why the timeout was rejected.
        reason: String,
    },
    /// Layer discovery or merging failed.
    #[error("failed to merge configuration layers")]
    #[diagnostic(code(crudcheck::config::merge))]
    Merge(#[source] Arc<OrthoError>),
}

/// Behaviour-driven CRUD checks against a mock REST API.
#[derive(Debug, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(author, version, about, long_about = None, subcommand_required = true)]
#[ortho_config(prefix = "CRUDCHECK")]
pub struct Cli {
    /// Base URL of the mock API.
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    #[ortho_config(default = DEFAULT_BASE_URL.to_owned())]
    pub base_url: String,

    /// Directory holding the default entity fixtures.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_FIXTURE_DIR)]
    #[ortho_config(default = Utf8PathBuf::from(DEFAULT_FIXTURE_DIR))]
    pub fixture_dir: Utf8PathBuf,

    /// Directory holding the JSON Schema documents.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SCHEMA_DIR)]
    #[ortho_config(default = Utf8PathBuf::from(DEFAULT_SCHEMA_DIR))]
    pub schema_dir: Utf8PathBuf,

    /// Bound each request to this many seconds.
    ///
    /// When omitted the HTTP agent's own defaults apply.
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Operation to perform.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            fixture_dir: Utf8PathBuf::from(DEFAULT_FIXTURE_DIR),
            schema_dir: Utf8PathBuf::from(DEFAULT_SCHEMA_DIR),
            timeout_secs: None,
            verbose: false,
            command: None,
        }
    }
}

impl Cli {
    /// Validate the merged values and build request settings from them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseUrl`] when the base URL does not parse as
    /// an absolute http(s) URL, or [`ConfigError::Timeout`] for an
    /// out-of-range timeout.
    pub fn request_config(&self) -> Result<RequestConfig, ConfigError> {
        let base_url =
            parse_base_url(&self.base_url).map_err(|reason| ConfigError::BaseUrl { reason })?;
        let timeout = self
            .timeout_secs
            .map(check_timeout)
            .transpose()
            .map_err(|reason| ConfigError::Timeout { reason })?
            .map(Duration::from_secs);
        Ok(RequestConfig::new(base_url)
            .with_fixture_dir(self.fixture_dir.clone())
            .with_schema_dir(self.schema_dir.clone())
            .with_timeout(timeout))
    }
}

/// Collection addressed by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// The `clients` collection.
    Clients,
    /// The `resources` collection.
    Resources,
}

impl Kind {
    /// Schema applied to a single record of this kind.
    #[must_use]
    pub const fn item_schema(self) -> &'static str {
        match self {
            Self::Clients => Client::SCHEMA,
            Self::Resources => Resource::SCHEMA,
        }
    }

    /// Schema applied to a listing of this kind.
    #[must_use]
    pub const fn list_schema(self) -> &'static str {
        match self {
            Self::Clients => Client::LIST_SCHEMA,
            Self::Resources => Resource::LIST_SCHEMA,
        }
    }
}

/// Arguments accepted by the `seed` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SeedArgs {
    /// Collection to seed.
    #[arg(value_enum)]
    pub kind: Kind,

    /// Minimum number of matching records required.
    #[arg(long = "at-least", value_name = "N")]
    pub at_least: usize,

    /// Count only active records (resources only).
    #[arg(long)]
    #[serde(default)]
    pub active: bool,
}

/// Arguments accepted by the `validate` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ValidateArgs {
    /// Collection to fetch.
    #[arg(value_enum)]
    pub kind: Kind,

    /// Validate this record instead of the whole listing.
    pub id: Option<String>,

    /// Schema file name inside the schema directory.
    ///
    /// Defaults to the item or list schema for the collection.
    #[arg(long, value_name = "NAME")]
    pub schema: Option<String>,
}

impl ValidateArgs {
    /// Schema to apply, falling back to the collection default.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        match (&self.schema, &self.id) {
            (Some(name), _) => name,
            (None, Some(_)) => self.kind.item_schema(),
            (None, None) => self.kind.list_schema(),
        }
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Print every record in a collection as pretty JSON.
    List {
        /// Collection to list.
        #[arg(value_enum)]
        kind: Kind,
    },

    /// Print one record; any status other than 200 is an error.
    Get {
        /// Collection to read from.
        #[arg(value_enum)]
        kind: Kind,
        /// Record id.
        id: String,
    },

    /// Create default records until enough exist.
    Seed(SeedArgs),

    /// Delete every record in a collection.
    Purge {
        /// Collection to empty.
        #[arg(value_enum)]
        kind: Kind,
    },

    /// Check a listing or record against a JSON Schema.
    Validate(ValidateArgs),
}

/// Parse arguments, keeping the matches needed for configuration merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails, including `--help` and
/// `--version` requests.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    let cli = Cli::from_arg_matches(&matches).map_err(|err| err.with_cmd(&command))?;
    Ok((cli, matches))
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder("crudcheck")
        .env_var(CONFIG_ENV_VAR)
        .build()
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let mut map = match sanitize_value(cli)? {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };
    map.retain(|field, _| {
        OVERRIDABLE_FIELDS.contains(&field.as_str())
            && matches.value_source(field) == Some(ValueSource::CommandLine)
    });
    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// # Errors
///
/// Returns [`ConfigError::Merge`] if discovery, extraction or merging
/// fails.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> Result<Cli, ConfigError> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let mut file_layers = config_discovery().compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        composer.push_layer(layer);
    }

    let env_provider = Env::prefixed(ENV_PREFIX)
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(serde_json::Value::Object(map)) if map.is_empty() => {}
        Ok(value) => composer.push_cli(value),
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition
        .into_merge_result(Cli::merge_from_layers)
        .map_err(ConfigError::Merge)?;
    merged.command = command;
    Ok(merged)
}
