use clap::{Args, Subcommand};

/// User subcommands.
#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user that can log in.
    Add(UserAddArgs),
    /// Grant or revoke admin rights.
    SetAdmin {
        /// User ID
        user_id: String,
        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct UserAddArgs {
    /// Login email (stored lowercased)
    #[arg(long)]
    pub email: String,

    /// Plain-text password; only its salted hash is stored
    #[arg(long)]
    pub password: String,

    /// Organization the user belongs to
    #[arg(long)]
    pub organization: String,

    /// Display name
    #[arg(long, default_value = "")]
    pub full_name: String,

    /// Create the user as an organization admin
    #[arg(long)]
    pub admin: bool,
}
