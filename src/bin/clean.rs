//! # Spreadsheet cleanup (`ecu-clean`)
//!
//! One-shot transform of a raw ECU spreadsheet into an importable CSV with
//! the canonical `num_bosch,modelo_ecu,fabricante` header.
//!
//! ```bash
//! ecu-clean bosch_ecu_final.csv bosch_ecu_limpo.csv
//! ```

use clap::Parser;
use std::path::PathBuf;

use ecu_catalog::clean;
use ecu_catalog::logging;

#[derive(Parser)]
#[command(name = "ecu-clean", version, about = "Clean a raw ECU spreadsheet for import")]
struct Cli {
    /// Raw CSV input.
    input: PathBuf,

    /// Where to write the cleaned CSV.
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let report = clean::clean_file(&cli.input, &cli.output)?;

    println!("clean {}", cli.input.display());
    println!("  columns detected: {}", report.columns.join(", "));
    println!("  rows read: {}", report.lines_read);
    println!("  malformed dropped: {}", report.malformed);
    println!("  incomplete dropped: {}", report.incomplete);
    println!("  duplicates dropped: {}", report.duplicates);
    println!("  valid rows: {}", report.written);
    println!("saved {}", cli.output.display());
    Ok(())
}
