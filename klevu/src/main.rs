mod config;
mod observability;
mod services;

use clap::{Args, Parser, Subcommand};
use config::Config;
use integration::account::ApiKeys;
use integration::cache_key::{CacheKeyResolver, website_fallback_key};
use scope::{AreaCode, InMemoryScopeRegistry, ScopeResolver};
use services::Services;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "klevu", about = "Klevu integration configuration service")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, default_value = "klevu.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the web API and the admin listener
    Serve,
    /// Print the scope a request would resolve to
    ResolveScope(ResolveScopeArgs),
    /// Print the account feature cache key of a scope and its fallback
    CacheKey(CacheKeyArgs),
    /// Check API keys against the account lookup
    CheckKeys(CheckKeysArgs),
}

#[derive(Args)]
struct ResolveScopeArgs {
    #[arg(long, default_value = "frontend")]
    area: AreaCode,
    /// Request parameter as key=value, may be repeated
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
    /// Code of the ambient store
    #[arg(long)]
    store: Option<String>,
    /// Code of the ambient website
    #[arg(long)]
    website: Option<String>,
    /// Pin a scope by code, e.g. `stores:en`
    #[arg(long, value_parser = parse_pin)]
    pin: Option<(String, String)>,
}

#[derive(Args)]
struct CacheKeyArgs {
    #[arg(long)]
    scope_id: u32,
    #[arg(long)]
    scope_type: String,
}

#[derive(Args)]
struct CheckKeysArgs {
    #[arg(long)]
    api_key: String,
    #[arg(long)]
    auth_key: String,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s}"))
}

fn parse_pin(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(scope_type, code)| (scope_type.to_string(), code.to_string()))
        .ok_or_else(|| format!("expected scope_type:code, got {s}"))
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid stores config: {0}")]
    Stores(#[from] scope::config::ValidationError),
    #[error(transparent)]
    Scope(#[from] scope::ScopeError),
    #[error(transparent)]
    CacheKey(#[from] integration::cache_key::CacheKeyError),
    #[error(transparent)]
    Integration(#[from] integration::IntegrationError),
    #[error(transparent)]
    Observability(#[from] observability::ObservabilityError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_file(&cli.config)?;

    match cli.command {
        CliCommand::Serve => serve(config),
        CliCommand::ResolveScope(args) => resolve_scope(&config, args),
        CliCommand::CacheKey(args) => cache_key(&config, args),
        CliCommand::CheckKeys(args) => check_keys(&config, args),
    }
}

fn serve(config: Config) -> Result<(), CliError> {
    let _sentry = observability::init_logging(&config.logging);
    if let Some(metrics) = &config.metrics {
        observability::init_metrics(metrics)?;
    }

    let services = Services::from_config(&config)?;
    tracing::info!(
        stores = services.registry.stores().len(),
        single_store_mode = services.registry.is_single_store_mode(),
        "Starting integration service"
    );

    let registry = services.registry.clone();
    let is_ready = move || !registry.stores().is_empty();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(integration::api::run(
        &config.integration,
        services.api_state(),
        is_ready,
    ))?;
    Ok(())
}

fn resolve_scope(config: &Config, args: ResolveScopeArgs) -> Result<(), CliError> {
    let mut registry = InMemoryScopeRegistry::from_config(&config.stores)?;
    if let Some(code) = &args.store {
        registry = registry.with_current_store(code)?;
    }
    if let Some(code) = &args.website {
        registry = registry.with_current_website(code)?;
    }

    let params: HashMap<String, String> = args.params.into_iter().collect();
    let mut resolver = ScopeResolver::new(Arc::new(registry), args.area, Arc::new(params));
    if let Some((scope_type, code)) = &args.pin {
        resolver.set_current_scope_by_code(code, scope_type)?;
    }

    println!("{}", resolver.get_current_scope()?);
    Ok(())
}

fn cache_key(config: &Config, args: CacheKeyArgs) -> Result<(), CliError> {
    let registry = InMemoryScopeRegistry::from_config(&config.stores)?;
    let key =
        CacheKeyResolver::new(Arc::new(registry)).derive_key(args.scope_id, &args.scope_type)?;

    println!("{key}");
    if let Some(fallback) = website_fallback_key(&key) {
        println!("{fallback}");
    }
    Ok(())
}

fn check_keys(config: &Config, args: CheckKeysArgs) -> Result<(), CliError> {
    let _sentry = observability::init_logging(&config.logging);
    let services = Services::from_config(config)?;
    let keys = ApiKeys::new(args.api_key, args.auth_key);

    let runtime = tokio::runtime::Runtime::new()?;
    let account = runtime.block_on(services.integration.check_api_keys(&keys))?;

    println!(
        "{} ({}): active={}, platform={}",
        account.company_name.as_deref().unwrap_or("unknown company"),
        account.email.as_deref().unwrap_or("no email"),
        account.active,
        account.platform,
    );
    Ok(())
}
