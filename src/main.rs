use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ejare", version, about = "Rental-contract management backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve,
    /// Create the admin user (out-of-band seeding; login rows are never
    /// created through the API).
    SeedAdmin {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ejare_core::Config::from_env()?;

    match cli.command {
        Command::Serve => ejare_gateway::start(&config).await?,
        Command::SeedAdmin { username, password } => {
            let store = ejare_store::ContractStore::open(&config.database.path)?;
            let hash = ejare_auth::hash_password(&password)?;
            let id = store.create_user(&username, &hash)?;
            tracing::info!("admin user '{username}' created (id={id})");
        }
    }

    Ok(())
}
