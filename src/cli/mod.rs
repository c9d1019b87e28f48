//! CLI module for the SoftDesk API
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply pending database migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// SoftDesk API - issue tracking for project teams
#[derive(Parser)]
#[command(name = "softdesk-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending PostgreSQL migrations
    Migrate(migrate::MigrateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["softdesk-api", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_parse_migrate_with_url() {
        let cli = Cli::try_parse_from([
            "softdesk-api",
            "migrate",
            "--database-url",
            "postgres://localhost/softdesk",
        ])
        .unwrap();

        match cli.command {
            Command::Migrate(args) => {
                assert_eq!(
                    args.database_url.as_deref(),
                    Some("postgres://localhost/softdesk")
                );
                assert!(!args.revert);
            }
            Command::Serve => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_parse_migrate_revert() {
        let cli = Cli::try_parse_from(["softdesk-api", "migrate", "--revert"]).unwrap();

        match cli.command {
            Command::Migrate(args) => {
                assert!(args.revert);
                assert!(args.database_url.is_none());
            }
            Command::Serve => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["softdesk-api"]).is_err());
    }
}
