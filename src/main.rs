use anyhow::Context;
use prism::cli::init::{self, InitConfig, InitResult};
use prism::cli::output::Output;
use prism::cli::{Cli, Commands};
use prism::utils::toml_config::{ConfigManager, PrismConfig, DEFAULT_CONFIG_FILE};
use prism::Orchestrator;
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Commands::Init { path, force } = &cli.command {
        init_tracing(&cli, "info");
        let result = init::run(
            InitConfig {
                path: path.clone(),
                force: *force,
            },
            &output,
        );
        return Ok(match result {
            InitResult::Success => ExitCode::SUCCESS,
            InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
        });
    }

    let manager = match load_config(&cli) {
        Ok(manager) => manager,
        Err(e) => {
            output.error(&format!("{:#}", e));
            output.hint("Run `prism init` to write a default prism.toml");
            return Ok(ExitCode::FAILURE);
        }
    };
    let config = manager.config();
    init_tracing(&cli, &config.logging.level);

    match cli.command {
        Commands::Config { validate } => {
            let source = manager
                .config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_string());
            if validate {
                output.success(&format!("configuration is valid ({})", source));
            } else {
                output.header("Configuration");
                output.kv("source", &source);
                output.newline();
                print!("{}", toml::to_string_pretty(config.as_ref())?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            query,
            ceiling,
            json,
            stream,
        } => {
            let mut orchestrator = Orchestrator::from_config(&config)
                .context("failed to set up search and LLM providers")?;

            let printer = if stream {
                let (tx, mut rx) = mpsc::unbounded_channel();
                orchestrator = orchestrator.with_events(tx);
                let events = Output {
                    colored: output.colored,
                };
                Some(tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        events.event(&event);
                    }
                }))
            } else {
                None
            };

            let ceiling = ceiling.unwrap_or(config.search.ceiling);
            let report = orchestrator.run(&query, ceiling).await;

            // Closes the event channel so the printer drains and stops
            drop(orchestrator);
            if let Some(printer) = printer {
                printer.await?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output.report(&report);
            }

            Ok(if report.is_done() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ConfigManager> {
    let manager = match cli.config.as_deref() {
        Some(path) => ConfigManager::new(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => ConfigManager::new(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("failed to load {}", DEFAULT_CONFIG_FILE))?,
        None => ConfigManager::from_config(PrismConfig::load_or_default(None)?),
    };
    Ok(manager)
}

/// RUST_LOG wins, then --verbose, then the configured level. Logs go to
/// stderr so `--json` output stays clean.
fn init_tracing(cli: &Cli, configured_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("prism=debug,info")
        } else {
            EnvFilter::new(configured_level)
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            cli.json_logs
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.json_logs).then(|| {
                fmt::layer()
                    .with_ansi(!cli.no_color)
                    .with_writer(std::io::stderr)
            }),
        )
        .init();
}
