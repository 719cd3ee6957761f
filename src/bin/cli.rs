use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use nofeed::cli::set_role;
use nofeed::logging::init_tracing;
use nofeed::store::PgUserStore;
use nofeed_config::DatabaseConfig;
use nofeed_db::init_db_pool;

#[derive(Parser)]
#[command(name = "nofeed-cli")]
#[command(about = "nofeed CLI - administrative tools for the nofeed API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a role to a user, creating the user if needed
    SetRole {
        /// Auth0 subject, e.g. "auth0|64b0c0ffee"
        auth0_user_id: String,

        /// Role name (member or superadmin)
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let pool = init_db_pool(&config)
        .await
        .context("failed to connect to database")?;
    let users = PgUserStore::new(pool);

    match cli.command {
        Commands::SetRole {
            auth0_user_id,
            role,
        } => {
            set_role(&users, &auth0_user_id, &role).await?;
            println!("{} now has role {}", auth0_user_id, role);
        }
    }

    Ok(())
}
