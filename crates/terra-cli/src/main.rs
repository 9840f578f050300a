use clap::Parser;
use terra_cli::cli::{BackfillCommands, Cli, Commands};
use terra_cli::commands;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Hello from terra-cli! Running with profile: {}", cli.profile);

    match &cli.command {
        Some(Commands::Import {
            fixture,
            build_id,
            accounts,
            opportunities,
            reps,
            config,
        }) => {
            let result = commands::import::handle(
                fixture,
                build_id,
                accounts,
                opportunities,
                reps,
                config.as_deref(),
            );
            match result {
                Ok(_) => info!("import successful"),
                Err(e) => error!("import failed: {e:?}"),
            }
        }
        Some(Commands::Generate {
            fixture,
            build_id,
            scope,
            out,
        }) => {
            let result = commands::generate::handle(fixture, build_id, (*scope).into(), out);
            match result {
                Ok(_) => info!("generate successful"),
                Err(e) => error!("generate failed: {e:?}"),
            }
        }
        Some(Commands::Execute {
            fixture,
            build_id,
            report,
            bypass_imbalance_check,
        }) => {
            let result = commands::execute::handle(fixture, build_id, report, *bypass_imbalance_check);
            match result {
                Ok(_) => info!("execute successful"),
                Err(e) => error!("execute failed: {e:?}"),
            }
        }
        Some(Commands::Backfill { command }) => {
            let result = match command {
                BackfillCommands::Enable {
                    fixture,
                    build_id,
                    rep,
                    actor,
                } => commands::backfill::enable(fixture, build_id, rep, actor),
                BackfillCommands::Disable {
                    fixture,
                    build_id,
                    rep,
                    actor,
                } => commands::backfill::disable(fixture, build_id, rep, actor),
            };
            match result {
                Ok(_) => info!("backfill command successful"),
                Err(e) => error!("backfill command failed: {e:?}"),
            }
        }
        Some(Commands::Doctor {}) => {
            if let Err(e) = commands::doctor::handle() {
                error!("doctor failed: {e:?}");
            }
        }
        Some(Commands::Completions { shell, out }) => {
            if let Err(e) = commands::completions::handle(*shell, out.as_deref()) {
                error!("completions failed: {e:?}");
            }
        }
        None => {
            info!("no subcommand given; run with --help to see available commands");
        }
    }
}
