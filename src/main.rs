use anyhow::Result;
use clap::{Parser, Subcommand};

use punchlist::config::PunchlistConfig;
use punchlist::database::Database;

#[derive(Parser)]
#[command(name = "punchlist")]
#[command(about = "Field-service work order workflow backend")]
#[command(long_about = "Punchlist tracks field-service work orders through a \
                       submit/reject/forward/approve workflow with an append-only \
                       audit trail and webhook notifications. Run 'punchlist serve' \
                       to start the HTTP API.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Override the configured bind address
        #[arg(long, help = "Address to bind, e.g. 0.0.0.0:8080")]
        bind: Option<String>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    PunchlistConfig::load_env_file()?;
    let mut config = PunchlistConfig::load()?;
    punchlist::telemetry::init_telemetry(&config.observability)?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            punchlist::server::run(config).await
        }
        Commands::Migrate => {
            let db = Database::connect(&config.database).await?;
            sqlx::migrate!("./migrations").run(db.pool()).await?;
            tracing::info!("migrations complete");
            db.close().await;
            Ok(())
        }
    }
}
