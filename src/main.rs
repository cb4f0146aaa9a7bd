use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipwright::application::CancellationToken;
use shipwright::config;
use shipwright::domain::entities::ExecutionResult;
use shipwright::domain::ports::DeployEventSink;
use shipwright::error::{ShipwrightError, ShipwrightResult};
use shipwright::infrastructure::{ConsoleEventSink, JsonEventSink};
use shipwright::presentation::factory::{apply_cli_overrides, create_orchestrator};
use shipwright::presentation::output::{create_renderer, error_json, format_error, OutputFormat};
use shipwright::presentation::{Cli, ColorWhen, Commands, DeployArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("interrupt received, stopping before the next step");
        handler_token.cancel();
    })
    .context("failed to install Ctrl-C handler")?;

    let success = match &cli.command {
        Commands::Deploy(args) => deploy(&cli, args, cancel),
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "shipwright=warn",
        1 => "shipwright=info",
        2 => "shipwright=debug",
        _ => "shipwright=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn use_color(when: Option<ColorWhen>) -> bool {
    match when {
        Some(ColorWhen::Always) => true,
        Some(ColorWhen::Never) => false,
        Some(ColorWhen::Auto) | None => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

/// Run one deployment and report it; returns whether it succeeded
fn deploy(cli: &Cli, args: &DeployArgs, cancel: CancellationToken) -> bool {
    let format = OutputFormat::from_flag(cli.json);
    let color = use_color(cli.color);
    let events: Arc<dyn DeployEventSink> = match format {
        OutputFormat::Json => Arc::new(JsonEventSink::stdout()),
        OutputFormat::Text => Arc::new(ConsoleEventSink::stderr(color, cli.verbose)),
    };

    let outcome = run_deploy(args, format, events, cancel).and_then(|result| {
        let renderer = create_renderer(format, color, true, cli.verbose);
        println!("{}", renderer.render(&result));
        result.ensure_success()
    });

    match outcome {
        Ok(()) => true,
        Err(err) => {
            report_error(&err, format);
            false
        }
    }
}

fn run_deploy(
    args: &DeployArgs,
    format: OutputFormat,
    events: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
) -> ShipwrightResult<ExecutionResult> {
    let project_root = Path::new(".");
    let (settings, warnings) = config::load_or_default(project_root)?;
    for warning in &warnings {
        match format {
            OutputFormat::Text => eprintln!("warning: {}", warning),
            OutputFormat::Json => tracing::warn!("{}", warning),
        }
    }
    let settings = apply_cli_overrides(settings, args);

    let orchestrator = create_orchestrator(&settings, args.dry_run, project_root, events, cancel);
    orchestrator.run(&args.service, &args.config)
}

fn report_error(err: &ShipwrightError, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", error_json(err));
    }
    eprintln!("{}", format_error(err));
}
