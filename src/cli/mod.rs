//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};

/// anishelf - a small anime catalog with reviews
#[derive(Parser)]
#[command(name = "anishelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create the default config file and empty data files
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register an account without going through the web form
    Add { username: String, password: String },
}
