//! Database migration runner for Tally.
//!
//! Usage:
//!   migrator [up] [-n N]   - Apply pending migrations (all by default)
//!   migrator down [-n N]   - Roll back the last N migrations (1 by default)
//!   migrator status        - Show migration status
//!   migrator fresh         - Drop all tables and re-run migrations
//!   migrator refresh       - Roll back all migrations, then re-apply them
//!   migrator reset         - Roll back all migrations
//!
//! The database comes from `-u`, `DATABASE_URL`, `TALLY__DATABASE__URL` or
//! the config files, in that order.

use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tally_db::migration::Migrator;
use tally_shared::AppConfig;
use tally_shared::telemetry::init_tracing;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "migrator", about = "Schema migrations for the Tally ledger")]
struct Cli {
    /// Database URL, overriding the configured one.
    #[arg(short = 'u', long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Apply pending migrations.
    Up {
        /// Number of migrations to apply (default: all pending).
        #[arg(short, long)]
        num: Option<u32>,
    },
    /// Roll back applied migrations.
    Down {
        /// Number of migrations to roll back.
        #[arg(short, long, default_value_t = 1)]
        num: u32,
    },
    /// Show which migrations are applied.
    Status,
    /// Drop all tables, then apply every migration.
    Fresh,
    /// Roll back every migration, then apply them again.
    Refresh,
    /// Roll back every migration.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load_with_database_url(cli.database_url.as_deref())?;
    if cli.verbose {
        config.log.filter = "tally=debug,sea_orm_migration=debug,audit=info".to_string();
    }
    init_tracing(&config.log)?;

    let db = tally_db::connect(&config.database).await?;
    let command = cli.command.unwrap_or(Command::Up { num: None });

    match command {
        Command::Up { num } => Migrator::up(&db, num).await?,
        Command::Down { num } => Migrator::down(&db, Some(num)).await?,
        Command::Status => Migrator::status(&db).await?,
        Command::Fresh => Migrator::fresh(&db).await?,
        Command::Refresh => Migrator::refresh(&db).await?,
        Command::Reset => Migrator::reset(&db).await?,
    }

    info!(?command, "migration command finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_up() {
        let cli = Cli::try_parse_from(["migrator"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_down_takes_a_count() {
        let cli = Cli::try_parse_from(["migrator", "down", "-n", "3"]).unwrap();
        assert_eq!(cli.command, Some(Command::Down { num: 3 }));

        let cli = Cli::try_parse_from(["migrator", "down"]).unwrap();
        assert_eq!(cli.command, Some(Command::Down { num: 1 }));
    }

    #[test]
    fn test_up_count_and_url_flag() {
        let cli =
            Cli::try_parse_from(["migrator", "up", "--num", "2", "-u", "sqlite::memory:"]).unwrap();
        assert_eq!(cli.command, Some(Command::Up { num: Some(2) }));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_help_and_unknown_commands_are_clap_errors() {
        let help = Cli::try_parse_from(["migrator", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        assert!(Cli::try_parse_from(["migrator", "sideways"]).is_err());
    }
}
