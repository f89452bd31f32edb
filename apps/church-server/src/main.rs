use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use congregation::{config::CongregationConfig, Congregation};
use mimalloc::MiMalloc;
use modkit_db::{redact_credentials_in_dsn, ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Church App Server - members and events API
#[derive(Parser)]
#[command(name = "church-server")]
#[command(about = "Church App Server - members and events API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Church App Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Final DSN: relative SQLite paths resolved against the home directory.
fn resolve_dsn(db_config: &DatabaseConfig, home_dir: &Path) -> Result<String> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    DbHandle::detect(raw)?;
    if raw.starts_with("sqlite://") {
        absolutize_sqlite_dsn(raw, home_dir)
    } else {
        Ok(raw.to_string())
    }
}

fn connect_opts(db_config: &DatabaseConfig) -> ConnectOpts {
    ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    }
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    let mut ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_sec = config.server.timeout_sec;
    }
    Ok(ingress)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let home_dir = PathBuf::from(&config.server.home_dir);
    let db_config = config.database_or_default();
    let dsn = resolve_dsn(&db_config, &home_dir)?;

    tracing::info!("Connecting to database: {}", redact_credentials_in_dsn(Some(&dsn)));
    let db = DbHandle::connect(&dsn, connect_opts(&db_config))
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    Congregation::migrate(&db).await?;

    tracing::info!("Initializing modules...");
    let congregation_cfg: CongregationConfig = config.module_config("congregation")?;
    let congregation = Congregation::init(&db, congregation_cfg)?;

    let ingress = ApiIngress::new(ingress_config(&config)?).with_openapi(Congregation::openapi());
    let router = ingress.build_router(congregation.register_rest(axum::Router::new()));
    let addr = ingress.bind_addr(&config.server.host, config.server.port)?;

    ingress
        .serve(addr, router, api_ingress::shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Church App Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let home_dir = PathBuf::from(&config.server.home_dir);
    let dsn = resolve_dsn(&config.database_or_default(), &home_dir)?;
    // Same loaders as `run`: absent sections default, present ones must parse.
    let _: CongregationConfig = config.module_config("congregation")?;
    let ingress = ApiIngress::new(ingress_config(&config)?);
    let addr = ingress.bind_addr(&config.server.host, config.server.port)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {}", redact_credentials_in_dsn(Some(&dsn)));
    println!("Listen address: {addr}");
    println!("{}", config.to_yaml()?);
    Ok(())
}
