//! bridge-tool - command-line access to Bridge account and participant logic
//!
//! Normalizes demographic assessment results, checks passwords and labels
//! against the configured rules, and inspects the account database.

use anyhow::{bail, Context, Result};
use bridge_common::config::BridgeConfig;
use bridge_common::db::{init_database, SqliteAccountStore};
use bridge_tool::logging::logging_subscriber;
use bridge_tool::{check_labels, check_password, lookup_account, normalize_demographics, render_errors, LookupKey};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "bridge-tool", version, about = "Bridge account and participant tool")]
struct Cli {
    /// Path to config TOML (overrides BRIDGE_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or open the account database
    InitDb,
    /// Convert an assessment result document ("-" for stdin) to canonical demographics
    Demographics { input: PathBuf },
    /// Check a password against the configured policy
    CheckPassword {
        #[arg(long, env = "BRIDGE_PASSWORD")]
        password: Option<String>,
    },
    /// Validate a JSON array of labels ("-" for stdin)
    CheckLabels { input: PathBuf },
    /// Find an account by one of its unique keys
    Lookup {
        #[arg(long)]
        app_id: String,
        #[command(flatten)]
        key: LookupKey,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing before config loading so resolution is logged
    let (subscriber, log_control) = logging_subscriber(std::io::stderr);
    subscriber.init();

    let config = BridgeConfig::resolve(cli.config.as_deref())?;
    log_control.apply_config_level(&config.log_level)?;

    debug!("Starting bridge-tool v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::InitDb => {
            init_database(&config.database_path).await?;
            info!("✓ Account database ready at {}", config.database_path.display());
        }
        Command::Demographics { input } => {
            println!("{}", normalize_demographics(&read_input(&input)?)?);
        }
        Command::CheckPassword { password } => {
            let errors = check_password(&config.password_policy, password.as_deref());
            if errors.has_errors() {
                bail!("{}", render_errors(&errors));
            }
            println!("Password satisfies policy");
        }
        Command::CheckLabels { input } => {
            let errors = check_labels(&read_input(&input)?)?;
            if errors.has_errors() {
                bail!("{}", render_errors(&errors));
            }
            println!("Labels are valid");
        }
        Command::Lookup { app_id, key } => {
            let pool = init_database(&config.database_path).await?;
            let store = SqliteAccountStore::new(pool);
            match lookup_account(&store, &app_id, &key).await? {
                Some(account) => println!("{}", serde_json::to_string_pretty(&account)?),
                None => bail!("No account found"),
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
