//! # Access Gate (`ecu-gate`)
//!
//! Registers users and, on a successful login, hands the terminal over to
//! the catalog with a fresh token.
//!
//! ```bash
//! ecu-gate init
//! ecu-gate register --name "Victor" --email v@example.com --login victor
//! ecu-gate login victor
//! ```
//!
//! Passwords are prompted without echo on a terminal, or read as one line
//! from stdin otherwise. Whatever follows the password on stdin is left for
//! the catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ecu_catalog::config::{self, Config, DEFAULT_CONFIG_PATH};
use ecu_catalog::gate::{self, Gate, Registration};
use ecu_catalog::logging;
use ecu_catalog::store::SqliteStore;

/// Access gate for the ECU catalog.
#[derive(Parser)]
#[command(name = "ecu-gate", version, about = "Log in and launch the ECU catalog")]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create both databases. Safe to run more than once.
    Init,

    /// Register a new user.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        login: String,
    },

    /// Check credentials and launch the catalog.
    Login {
        login: String,

        /// Print the display name and token instead of launching the catalog.
        #[arg(long)]
        no_launch: bool,
    },
}

fn read_password(prompt: &str) -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        return rpassword::prompt_password(prompt).context("Failed to read password");
    }
    read_stdin_line().context("Failed to read password from stdin")
}

/// Read one line from stdin without consuming anything past the newline,
/// so the rest of the input is left for the catalog.
#[cfg(unix)]
fn read_stdin_line() -> io::Result<String> {
    use std::io::Read;
    use std::os::fd::AsFd;

    let mut stdin = std::fs::File::from(io::stdin().as_fd().try_clone_to_owned()?);
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    while stdin.read(&mut byte)? == 1 && byte[0] != b'\n' {
        line.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&line)
        .trim_end_matches('\r')
        .to_string())
}

#[cfg(not(unix))]
fn read_stdin_line() -> io::Result<String> {
    use std::io::BufRead;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn catalog_bin(cfg: &Config) -> Result<PathBuf> {
    match &cfg.gate.catalog_bin {
        Some(path) => Ok(path.clone()),
        None => gate::default_catalog_bin().context("Failed to locate ecu-catalog"),
    }
}

/// The config path to hand to the catalog, if there is a file to hand over.
fn forwarded_config(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        Some(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
    } else {
        None
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            Gate::open(&cfg.gate.users_db).await?;
            SqliteStore::open(&cfg.db.path).await?;
            println!("Databases initialized successfully.");
        }
        Commands::Register {
            name,
            email,
            address,
            login,
        } => {
            let password = read_password("Password: ")?;
            let gate = Gate::open(&cfg.gate.users_db).await?;
            gate.register(&Registration {
                name,
                email,
                address,
                login,
                password,
            })
            .await?;
            println!("User registered successfully.");
        }
        Commands::Login { login, no_launch } => {
            let password = read_password("Password: ")?;
            let gate = Gate::open(&cfg.gate.users_db).await?;
            let account = gate.authenticate(&login, &password).await?;
            let token = gate::issue_token();

            if no_launch {
                println!("{} {}", account.name, token);
                return Ok(());
            }

            let bin = catalog_bin(&cfg)?;
            println!("Welcome, {}. Opening catalog...", account.name);
            io::stdout().flush()?;
            gate::launch_catalog(
                &bin,
                &account.name,
                &token,
                forwarded_config(&cli.config).as_deref(),
            )?;
        }
    }

    Ok(())
}
