use anyhow::Result;
use clap::Parser;
use tracing::Instrument;

use flowctl::cli::commands::{self, CommandContext};
use flowctl::cli::Cli;
use flowctl::config::FlowctlConfig;
use flowctl::engine::{EngineClient, EngineError};
use flowctl::telemetry::{create_operation_span, generate_correlation_id, init_telemetry};

fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("❌ {error}");
        if let Some(engine_error) = error.downcast_ref::<EngineError>() {
            if let Some(hint) = engine_error.hint() {
                eprintln!("   💡 {hint}");
            }
        } else {
            for cause in error.chain().skip(1) {
                eprintln!("   caused by: {cause}");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    FlowctlConfig::load_env_file()?;
    let mut config = FlowctlConfig::load()?;
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    if let Some(base_url) = &cli.base_url {
        config.engine.base_url = base_url.clone();
    }
    init_telemetry(&config.observability)?;

    let client = EngineClient::from_config(&config)?;
    let ctx = CommandContext::new(client, config.credential());

    let correlation_id = generate_correlation_id();
    let span = create_operation_span(
        commands::operation_name(&cli.command),
        None,
        Some(&correlation_id),
    );

    tokio::runtime::Runtime::new()?
        .block_on(async { commands::execute(&cli.command, &ctx).await }.instrument(span))
}
