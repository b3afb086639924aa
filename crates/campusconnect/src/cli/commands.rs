//! CLI command definitions.

use campusconnect::{StorageHint, StorageKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CampusConnect - tiered media storage for campus posts, comments, and resources
#[derive(Parser, Debug)]
#[command(name = "campusconnect")]
#[command(about = "Tiered media storage for campus posts, comments, and resources", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP media server until Ctrl-C
    Serve,

    /// Apply database migrations
    Migrate,

    /// Store, fetch, and delete media directly
    #[command(subcommand)]
    Media(MediaCommands),
}

/// Media subcommands
#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Store a file and print its reference
    Put {
        /// File to store
        path: PathBuf,

        /// Expected tier: image or document
        #[arg(long, default_value = "document")]
        hint: StorageHint,

        /// MIME type, guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Retrieve a stored file
    Get {
        /// Storage kind: image, blob, or gridfs
        kind: StorageKind,

        /// Blob id
        id: String,

        /// Destination path
        #[arg(long)]
        out: PathBuf,
    },

    /// Delete a stored file
    Rm {
        /// Storage kind: image, blob, or gridfs
        kind: StorageKind,

        /// Blob id
        id: String,
    },
}
