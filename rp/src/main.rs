use std::fs;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use routepick::chat::ChatService;
use routepick::cli::{Cli, Command, OutputFormat, PlanArgs, format_course, get_log_path};
use routepick::config::{Config, RegistryConfig};
use routepick::llm::create_client;
use routepick::pipeline::Pipeline;
use routepick::prompts::PromptLoader;
use routepick::registry::TaskRegistry;
use routepick::server::{self, AppState};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't initialized yet, so nothing here can log
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level comes from the config file before the full load
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "RoutePick loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => cmd_serve(&config, bind).await,
        Command::Plan(args) => cmd_plan(&config, &args).await,
    }
}

/// Wire every client and serve HTTP
async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    debug!(?bind, "cmd_serve: called");
    config.validate()?;

    let registry = Arc::new(TaskRegistry::spawn(&config.registry));
    let pipeline = Arc::new(Pipeline::from_config(config, registry.clone())?);

    let llm = create_client(&config.llm).context("Failed to create LLM client for chat")?;
    let prompts = Arc::new(PromptLoader::new(&config.planner.prompt_dir));
    let chat = Arc::new(ChatService::new(llm, prompts, config.llm.max_tokens));
    let maps_api_key = config.maps.get_api_key()?;

    let state = AppState::new(pipeline, registry.clone(), chat, maps_api_key)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    println!("RoutePick listening on http://{}", bind);
    let served = server::serve(&bind, state).await;
    let _ = registry.shutdown().await;
    served
}

/// Plan one course in the foreground
async fn cmd_plan(config: &Config, args: &PlanArgs) -> Result<()> {
    debug!(theme = %args.theme, location = %args.location, "cmd_plan: called");
    let registry = TaskRegistry::spawn(&RegistryConfig {
        ttl_secs: 0,
        sweep_interval_secs: 0,
    });
    let pipeline = Pipeline::from_config(config, Arc::new(registry))?;

    let course = pipeline
        .run(args.to_trip_request().into_pipeline_input())
        .await
        .context("Planning failed")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&course)?),
        OutputFormat::Text => print!("{}", format_course(&course)),
    }
    Ok(())
}
