use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `omap` binary.
#[derive(Debug, Parser)]
#[command(name = "omap", version, about = "Outcome mapping service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for administrative commands: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path, overriding `database.path` from config
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::UserCommands;
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["omap", "--db", "/tmp/om.db", "--verbose", "migrate"])
            .expect("cli should parse");

        assert_eq!(cli.db.as_deref(), Some("/tmp/om.db"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Migrate));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["omap", "serve", "--quiet", "--format", "raw"])
            .expect("cli should parse");

        let flags: GlobalFlags = cli.global_flags();
        assert!(flags.quiet);
        assert_eq!(flags.format, OutputFormat::Raw);
        assert!(matches!(cli.command, Commands::Serve));
    }

    #[test]
    fn user_add_parses() {
        let cli = Cli::try_parse_from([
            "omap",
            "user",
            "add",
            "--email",
            "ada@example.org",
            "--password",
            "hunter2",
            "--organization",
            "org-1",
            "--full-name",
            "Ada",
            "--admin",
        ])
        .expect("cli should parse");

        let Commands::User {
            action: UserCommands::Add(args),
        } = cli.command
        else {
            panic!("expected user add");
        };
        assert_eq!(args.email, "ada@example.org");
        assert_eq!(args.organization, "org-1");
        assert!(args.admin);
    }

    #[test]
    fn replay_requires_file() {
        assert!(Cli::try_parse_from(["omap", "replay"]).is_err());
        let cli = Cli::try_parse_from(["omap", "replay", "requests.jsonl"]).expect("cli should parse");
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.file.to_string_lossy(), "requests.jsonl");
        assert!(args.output.is_none());
    }
}
