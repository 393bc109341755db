use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cypher_builder::build_plan::{render_plan, BuildPlan};
use cypher_builder::config;

/// Cypher Builder - render a declarative build plan to parameterized Cypher
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Build plan file (.json, .yaml or .yml); reads JSON from stdin when omitted
    plan: Option<PathBuf>,

    /// YAML configuration file (environment variables are used otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base name for node and relationship aliases
    #[arg(long)]
    alias_prefix: Option<String>,

    /// Base name for intermediate variables
    #[arg(long)]
    variable_prefix: Option<String>,

    /// Prefix for bound parameter names
    #[arg(long)]
    param_prefix: Option<String>,

    /// Maximum nesting of CALL / EXISTS subqueries
    #[arg(long)]
    max_subquery_depth: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            alias_prefix: cli.alias_prefix.clone(),
            variable_prefix: cli.variable_prefix.clone(),
            param_prefix: cli.param_prefix.clone(),
            max_subquery_depth: cli.max_subquery_depth,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<config::BuilderConfig> {
    let mut builder_config = match &cli.config {
        Some(path) => config::BuilderConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => config::BuilderConfig::from_env().context("Invalid environment configuration")?,
    };
    builder_config.merge_cli(&cli.into())?;
    Ok(builder_config)
}

fn load_plan(path: Option<&PathBuf>) -> anyhow::Result<BuildPlan> {
    match path {
        Some(path) => BuildPlan::from_file(path)
            .with_context(|| format!("Failed to load plan {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read plan from stdin")?;
            Ok(BuildPlan::from_json_str(&content)?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the rendered result
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let builder_config = load_config(&cli)?;
    log::info!(
        "rendering with prefixes alias={} variable={} param={}",
        builder_config.alias_prefix,
        builder_config.variable_prefix,
        builder_config.param_prefix
    );

    let plan = load_plan(cli.plan.as_ref())?;
    let result = render_plan(&plan, &builder_config)?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}
