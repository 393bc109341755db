use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::utils::cypher_escaping::is_plain_identifier;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Naming and nesting limits applied to every build.
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[validate(schema(function = "validate_alias_prefixes"))]
pub struct BuilderConfig {
    /// Base name for node and relationship aliases (`this`, `this0`, ...)
    #[validate(custom(function = "validate_prefix"))]
    pub alias_prefix: String,

    /// Base name for intermediate variables (`var1`, `var2`, ...)
    #[validate(custom(function = "validate_prefix"))]
    pub variable_prefix: String,

    /// Prefix for bound parameter names (`param0`, `param1`, ...)
    #[validate(custom(function = "validate_prefix"))]
    pub param_prefix: String,

    /// Maximum nesting of CALL / EXISTS subqueries
    #[validate(range(
        min = 1,
        max = 64,
        message = "Max subquery depth must be between 1 and 64"
    ))]
    pub max_subquery_depth: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            alias_prefix: "this".to_string(),
            variable_prefix: "var".to_string(),
            param_prefix: "param".to_string(),
            max_subquery_depth: 32,
        }
    }
}

impl BuilderConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            alias_prefix: env::var("CYPHER_BUILDER_ALIAS_PREFIX")
                .unwrap_or(defaults.alias_prefix),
            variable_prefix: env::var("CYPHER_BUILDER_VARIABLE_PREFIX")
                .unwrap_or(defaults.variable_prefix),
            param_prefix: env::var("CYPHER_BUILDER_PARAM_PREFIX")
                .unwrap_or(defaults.param_prefix),
            max_subquery_depth: parse_env_var("CYPHER_BUILDER_MAX_SUBQUERY_DEPTH", "32")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(alias_prefix) = cli.alias_prefix {
            config.alias_prefix = alias_prefix;
        }
        if let Some(variable_prefix) = cli.variable_prefix {
            config.variable_prefix = variable_prefix;
        }
        if let Some(param_prefix) = cli.param_prefix {
            config.param_prefix = param_prefix;
        }
        if let Some(depth) = cli.max_subquery_depth {
            config.max_subquery_depth = depth;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides on top of an environment or file configuration
    pub fn merge_cli(&mut self, cli: &CliConfig) -> Result<(), ConfigError> {
        if let Some(alias_prefix) = &cli.alias_prefix {
            self.alias_prefix = alias_prefix.clone();
        }
        if let Some(variable_prefix) = &cli.variable_prefix {
            self.variable_prefix = variable_prefix.clone();
        }
        if let Some(param_prefix) = &cli.param_prefix {
            self.param_prefix = param_prefix.clone();
        }
        if let Some(depth) = cli.max_subquery_depth {
            self.max_subquery_depth = depth;
        }
        self.validate()?;
        Ok(())
    }
}

/// CLI overrides (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub alias_prefix: Option<String>,
    pub variable_prefix: Option<String>,
    pub param_prefix: Option<String>,
    pub max_subquery_depth: Option<usize>,
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if is_plain_identifier(prefix) {
        Ok(())
    } else {
        let mut err = ValidationError::new("prefix");
        err.message = Some("prefix must be a non-empty plain identifier".into());
        Err(err)
    }
}

/// `<prefix><digits>` is how later aliases are numbered.
fn extends_with_digits(prefix: &str, base: &str) -> bool {
    prefix
        .strip_prefix(base)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Aliases and variables share one counter, so neither prefix may be the
/// other followed by digits (`n` / `n0` would both render `n0`).
fn validate_alias_prefixes(config: &BuilderConfig) -> Result<(), ValidationError> {
    let alias = config.alias_prefix.as_str();
    let variable = config.variable_prefix.as_str();
    if extends_with_digits(alias, variable) || extends_with_digits(variable, alias) {
        let mut err = ValidationError::new("prefix_collision");
        err.message = Some(
            format!(
                "alias prefix '{}' and variable prefix '{}' can produce the same alias",
                alias, variable
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
