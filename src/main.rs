use std::io::IsTerminal;
use std::time::Instant;

use anyhow::Result;
use roofs_to_postgres::{
    batch,
    cli::{Cli, Commands},
    config::RunConfig,
    schema::ALL_TABLES,
    ui::{PlainUi, UiApp},
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let use_tui = !cli.no_tui && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Run {
            input,
            db,
            dictionary,
        } => {
            let config = RunConfig {
                db: db.into_config(),
                batch: input.into_config(),
                dictionary_path: dictionary,
            };

            if use_tui {
                let mut ui = UiApp::new()?;
                match batch::run(&config, &mut ui) {
                    Ok(summary) => ui.finish(&summary.describe())?,
                    Err(err) => {
                        ui.restore()?;
                        return Err(err);
                    }
                }
            } else {
                let start = Instant::now();
                let summary = batch::run(&config, &mut PlainUi::new())?;
                println!(
                    "\n{} in {:.1}s",
                    summary.describe(),
                    start.elapsed().as_secs_f64()
                );
            }
        }

        Commands::Check { input } => {
            let config = input.into_config();

            if use_tui {
                let mut ui = UiApp::new()?;
                match batch::check(&config, &mut ui) {
                    Ok(summary) => ui.finish(&summary.describe())?,
                    Err(err) => {
                        ui.restore()?;
                        return Err(err);
                    }
                }
            } else {
                let start = Instant::now();
                let summary = batch::check(&config, &mut PlainUi::new())?;
                println!(
                    "\n{} in {:.1}s",
                    summary.describe(),
                    start.elapsed().as_secs_f64()
                );
            }
        }

        Commands::ListTables => {
            println!("Destination tables:\n");
            for table in ALL_TABLES {
                println!("{}", table.name);
                for column in table.column_names() {
                    println!("  {}", column);
                }
                println!();
            }
        }
    }

    Ok(())
}
