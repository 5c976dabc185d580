//! CSV import into, and export out of, the record store.
//!
//! Import is header-driven. Each field is looked up under a fixed alias
//! list; the first alias holding a non-empty value wins. The whole file is
//! parsed before anything is written, so an unreadable or malformed file
//! aborts with no partial import. After that, rows are isolated from one
//! another:
//!
//! - a row missing any field is ignored,
//! - a row whose `(part_number, model_name)` pair already exists (in the
//!   store, or earlier in the same file) is skipped,
//! - everything else is imported.
//!
//! Export writes through a temporary file in the destination directory and
//! renames it into place only once every row has been written and flushed.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::models::{EcuRecord, NewEcu};
use crate::search::SearchFilter;
use crate::store::RecordStore;

/// Canonical CSV header names, in column order.
pub const CANONICAL_HEADER: [&str; 3] = ["num_bosch", "modelo_ecu", "fabricante"];

pub const PART_NUMBER_ALIASES: &[&str] = &["num_bosch", "part_number", "NumeroBosch"];
pub const MODEL_NAME_ALIASES: &[&str] = &["modelo_ecu", "model_name", "Modelo"];
pub const MANUFACTURER_ALIASES: &[&str] = &["fabricante", "manufacturer", "Fabricante"];

/// Outcome counters for one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: u64,
    /// Rows rejected as duplicate pairs.
    pub skipped: u64,
    /// Rows missing a required field. Not counted as skipped.
    pub ignored: u64,
}

/// Whether exported files carry the `id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    #[default]
    Plain,
    WithId,
}

impl ExportMode {
    pub fn from_include_id(include_id: bool) -> Self {
        if include_id {
            ExportMode::WithId
        } else {
            ExportMode::Plain
        }
    }
}

/// Column positions of each alias present in the header, in alias order.
struct AliasColumns {
    part_number: Vec<usize>,
    model_name: Vec<usize>,
    manufacturer: Vec<usize>,
}

impl AliasColumns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let resolve = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| headers.iter().position(|h| h == *alias))
                .collect()
        };
        Self {
            part_number: resolve(PART_NUMBER_ALIASES),
            model_name: resolve(MODEL_NAME_ALIASES),
            manufacturer: resolve(MANUFACTURER_ALIASES),
        }
    }

    fn extract(&self, row: &csv::StringRecord) -> Option<NewEcu> {
        let pick = |columns: &[usize]| -> Option<&str> {
            columns
                .iter()
                .filter_map(|&i| row.get(i))
                .map(str::trim)
                .find(|v| !v.is_empty())
        };
        Some(NewEcu::new(
            pick(&self.part_number)?,
            pick(&self.model_name)?,
            pick(&self.manufacturer)?,
        ))
    }
}

/// Parse a CSV stream into candidate rows.
///
/// `None` marks a row missing a required field. Any read or decode failure
/// fails the whole parse.
pub fn parse_import<R: io::Read>(reader: R) -> Result<Vec<Option<NewEcu>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let columns = AliasColumns::from_headers(&headers);

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line + 1))?;
        rows.push(columns.extract(&record));
    }
    Ok(rows)
}

/// Feed parsed rows through the store, one insert per complete row.
///
/// Duplicate pairs are counted and skipped; any other store error aborts.
pub async fn import_rows(
    store: &dyn RecordStore,
    rows: Vec<Option<NewEcu>>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for row in rows {
        let Some(ecu) = row else {
            report.ignored += 1;
            continue;
        };
        match store.insert(&ecu).await {
            Ok(_) => report.imported += 1,
            Err(StoreError::Duplicate { .. }) => report.skipped += 1,
            Err(e) => return Err(e).context("Import aborted by storage error"),
        }
    }

    Ok(report)
}

/// Import a CSV file into `store`.
pub async fn import_file(store: &dyn RecordStore, path: &Path) -> Result<ImportReport> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = parse_import(io::BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let report = import_rows(store, rows).await?;
    tracing::info!(
        path = %path.display(),
        imported = report.imported,
        skipped = report.skipped,
        ignored = report.ignored,
        "import finished"
    );
    Ok(report)
}

/// Serialize `records` as CSV onto `writer`, header first.
pub fn write_records<W: Write>(writer: W, records: &[EcuRecord], mode: ExportMode) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    match mode {
        ExportMode::Plain => wtr.write_record(CANONICAL_HEADER)?,
        ExportMode::WithId => {
            wtr.write_record(["id", CANONICAL_HEADER[0], CANONICAL_HEADER[1], CANONICAL_HEADER[2]])?
        }
    }

    for r in records {
        match mode {
            ExportMode::Plain => {
                wtr.write_record([&r.part_number, &r.model_name, &r.manufacturer])?
            }
            ExportMode::WithId => wtr.write_record([
                r.id.to_string().as_str(),
                r.part_number.as_str(),
                r.model_name.as_str(),
                r.manufacturer.as_str(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write `path` all-or-nothing.
///
/// `write` fills a temporary file next to `path`; the file is synced and
/// renamed over `path` only if `write` succeeds. On any error the
/// temporary file is removed and `path` is left as it was.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export `records` to `path`. Returns the number of data rows written.
pub fn export_file(path: &Path, records: &[EcuRecord], mode: ExportMode) -> Result<usize> {
    write_atomic(path, |file| write_records(file, records, mode))?;
    tracing::info!(path = %path.display(), rows = records.len(), ?mode, "export finished");
    Ok(records.len())
}

/// Export every record matching `filter`, in search order.
pub async fn export_store(
    store: &dyn RecordStore,
    filter: &SearchFilter,
    path: &Path,
    mode: ExportMode,
) -> Result<usize> {
    let records = store.search(filter).await?;
    export_file(path, &records, mode)
}
