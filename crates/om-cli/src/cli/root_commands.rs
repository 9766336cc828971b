use clap::Subcommand;

use super::subcommands::{ReplayArgs, UserCommands};

/// Top-level commands for the `omap` CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or upgrade the database schema.
    Migrate,
    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Read JSON requests from stdin, one per line, and answer on stdout.
    Serve,
    /// Run the requests of a JSONL file in order.
    Replay(ReplayArgs),
}
