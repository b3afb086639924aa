//! CampusConnect CLI binary.
//!
//! This binary provides command-line access to the media store:
//! - Serve the HTTP upload and download API
//! - Apply database migrations
//! - Store, fetch, and delete media directly

use campusconnect::{AppConfig, init_logging, migrate, serve};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_media_command};

    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.config.as_deref())?;

    // Initialize tracing
    let _telemetry = init_logging(&config.logging, cli.verbose)?;

    // Execute the requested command
    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }

        Commands::Migrate => {
            let applied = migrate(&config.database).await?;
            if applied.is_empty() {
                println!("Database schema is up to date");
            } else {
                for version in applied {
                    println!("Applied {}", version);
                }
            }
        }

        Commands::Media(media_cmd) => {
            handle_media_command(media_cmd, &config).await?;
        }
    }

    Ok(())
}
