//! # ECU Catalog (`ecu-catalog`)
//!
//! The catalog process. It is launched by `ecu-gate` after a successful
//! login and takes exactly two positional arguments:
//!
//! ```bash
//! ecu-catalog <username> <token>
//! ```
//!
//! The token must be 32 characters long; anything else refuses to start.
//! The database location comes from the file named by `ECU_CATALOG_CONFIG`
//! (default `./config/ecu.toml`).
//!
//! Once running, commands are read from stdin, one per line:
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Show records matching the active search |
//! | `search [-p PART] [-m MODEL] [-f MAKER]` | Filter by substrings |
//! | `clear` | Drop the active search |
//! | `select <id>` | Select a record for `edit`/`delete` |
//! | `add <part> <model> <maker>` | Add a record |
//! | `edit <part> <model> <maker>` | Rewrite the selected record |
//! | `delete` | Delete the selected record |
//! | `import <file.csv>` | Import records |
//! | `export <file.csv> [--with-id]` | Export every record |
//! | `count` | Number of records |
//! | `logout` | Leave |

use std::io::{self, BufRead, Write};

use ecu_catalog::app::{format_records, App, Reply};
use ecu_catalog::config;
use ecu_catalog::logging;
use ecu_catalog::reconcile::ExportMode;
use ecu_catalog::session::Session;
use ecu_catalog::store::SqliteStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let session = match Session::from_args(std::env::args().skip(1)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config_path = config::catalog_config_path();
    let cfg = config::load_or_default(&config_path)?;
    let store = SqliteStore::open(&cfg.db.path).await?;
    tracing::info!(
        user = %session.username,
        db = %cfg.db.path.display(),
        "catalog started"
    );

    let mut app = App::new(
        session.username.clone(),
        Box::new(store),
        ExportMode::from_include_id(cfg.export.include_id),
    );

    println!("Welcome, {}!", app.user());
    run_loop(&mut app).await?;
    println!("Goodbye, {}.", app.user());
    Ok(())
}

async fn run_loop(app: &mut App) -> anyhow::Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let mut stdin = io::stdin().lock();
    let mut buf = Vec::new();

    loop {
        if interactive {
            print!("ecu> ");
            io::stdout().flush()?;
        }

        buf.clear();
        if stdin.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // Undecodable bytes only spoil this one line.
        let line = String::from_utf8_lossy(&buf);

        let command = match App::parse(line.trim_end_matches(['\r', '\n'])) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(text) => {
                println!("{}", text.trim_end());
                continue;
            }
        };

        match app.dispatch(command).await {
            Ok(Reply::Logout) => break,
            Ok(Reply::Message(text)) => println!("{}", text),
            Ok(Reply::Records(records)) => println!("{}", format_records(&records)),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }

    Ok(())
}
